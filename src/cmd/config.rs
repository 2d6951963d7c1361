use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{StoredConfig, config_file_path, parse_utc_offset};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring triage.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Without an API key every ticket is classified as general/medium.");
    println!();

    apply_prompt("Hugging Face API key", &mut cfg.api_key, true)?;
    apply_prompt(
        "Model id (e.g., mistralai/Mistral-7B-Instruct-v0.2)",
        &mut cfg.model,
        false,
    )?;
    apply_prompt("Inference base URL", &mut cfg.inference_url, false)?;
    apply_prompt("Tickets file path", &mut cfg.tickets_file, false)?;
    apply_prompt("Store UTC offset (e.g., +02:00)", &mut cfg.utc_offset, false)?;

    if let Some(offset) = &cfg.utc_offset {
        parse_utc_offset(offset)?;
    }

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("API key: {}", mask_secret(&cfg.api_key));
    println!("Model: {}", display_value(&cfg.model));
    println!("Inference base URL: {}", display_value(&cfg.inference_url));
    println!("Tickets file: {}", display_value(&cfg.tickets_file));
    println!("UTC offset: {}", display_value(&cfg.utc_offset));

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(PromptAction::from_input(&input))
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars = token.chars().collect::<Vec<_>>();
            let prefix = chars[..3].iter().collect::<String>();
            let suffix = chars[chars.len() - 3..].iter().collect::<String>();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn from_input(input: &str) -> Self {
        match input.trim() {
            "" => PromptAction::Keep,
            "-" => PromptAction::Clear,
            value => PromptAction::Set(value.to_string()),
        }
    }
}
