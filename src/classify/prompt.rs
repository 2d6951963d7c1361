//! Prompt rendering in the Mistral instruct format.

const TURN_START: &str = "<s>";
const INSTRUCTION_OPEN: &str = "[INST]";
const INSTRUCTION_CLOSE: &str = "[/INST]";

/// Closes an assistant turn. Also used as a stop sequence for generation.
pub const END_OF_TURN: &str = "</s>";

const SYSTEM_PROMPT: &str = r#"You are a support ticket classifier for a software company.
Given a support ticket description, classify it into a category and assign a priority level.

Categories:
- billing: payment issues, invoices, subscriptions, refunds, pricing
- technical: bugs, errors, crashes, integrations, performance, API issues
- account: login, password, access, permissions, profile settings
- general: feature requests, general questions, feedback, other

Priority levels:
- critical: system down, data loss, security breach, complete service outage
- high: major feature broken, significant business impact, many users affected
- medium: partial functionality affected, workaround available, moderate impact
- low: minor inconvenience, cosmetic issue, general question, feature request

Respond ONLY with valid JSON in this exact format (no other text):
{"category": "<category>", "priority": "<priority>"}"#;

#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub description: &'static str,
    pub expected_output: &'static str,
}

pub const FEW_SHOT_EXAMPLES: [FewShotExample; 4] = [
    FewShotExample {
        description: "I can't log into my account. My password reset email never arrives.",
        expected_output: r#"{"category": "account", "priority": "high"}"#,
    },
    FewShotExample {
        description: "The API is returning 500 errors for all requests, our entire app is down.",
        expected_output: r#"{"category": "technical", "priority": "critical"}"#,
    },
    FewShotExample {
        description: "I was charged twice for my subscription this month.",
        expected_output: r#"{"category": "billing", "priority": "high"}"#,
    },
    FewShotExample {
        description: "Can you add dark mode to the dashboard?",
        expected_output: r#"{"category": "general", "priority": "low"}"#,
    },
];

enum Turn<'a> {
    System(&'a str),
    User(&'a str),
    Assistant(&'a str),
}

fn conversation(description: &str) -> Vec<Turn<'_>> {
    let mut turns = Vec::with_capacity(FEW_SHOT_EXAMPLES.len() * 2 + 2);
    turns.push(Turn::System(SYSTEM_PROMPT));
    for example in &FEW_SHOT_EXAMPLES {
        turns.push(Turn::User(example.description));
        turns.push(Turn::Assistant(example.expected_output));
    }
    turns.push(Turn::User(description));
    turns
}

/// Renders the classification prompt for `description`.
///
/// The system block opens with its own `[INST]` and every user turn,
/// including the first, is wrapped in `[INST] … [/INST]`. Assistant turns
/// end with `</s><s>` so the next instruction starts a fresh sequence.
pub fn build_classification_prompt(description: &str) -> String {
    let mut prompt = String::from(TURN_START);

    for turn in conversation(description) {
        match turn {
            Turn::System(content) => {
                prompt.push_str(&format!("{INSTRUCTION_OPEN} {content}\n\n"));
            }
            Turn::User(content) => {
                prompt.push_str(&format!("{INSTRUCTION_OPEN} {content} {INSTRUCTION_CLOSE}"));
            }
            Turn::Assistant(content) => {
                prompt.push_str(&format!(" {content} {END_OF_TURN}{TURN_START}"));
            }
        }
    }

    prompt
}
