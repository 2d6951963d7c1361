use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::classification::ClassificationResult;
use crate::domain::ticket::{Category, Priority};

// First `{`, then everything up to the first `}`. A value containing `}` would
// cut the object short; the fixed enums never do.
static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{[^}]+\}").unwrap());

/// Pulls a classification out of free-form model output.
///
/// Returns `None` when there is no JSON object, it does not parse, or either
/// field is missing or outside the known values.
pub fn parse_classification(raw: &str) -> Option<ClassificationResult> {
    let object = JSON_OBJECT.find(raw)?;
    let data: Value = serde_json::from_str(object.as_str()).ok()?;

    let category = Category::parse(string_field(&data, "category"))?;
    let priority = Priority::parse(string_field(&data, "priority"))?;

    Some(ClassificationResult { category, priority })
}

fn string_field<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_surrounding_noise() {
        let result =
            parse_classification(r#"noise {"category":"BILLING","priority":"High"} trailing"#);
        assert_eq!(
            result,
            Some(ClassificationResult {
                category: Category::Billing,
                priority: Priority::High,
            })
        );
    }

    #[test]
    fn trims_values_and_spans_newlines() {
        let raw = "Sure:\n{\n  \"category\": \" account \",\n  \"priority\": \"critical\"\n}";
        assert_eq!(
            parse_classification(raw),
            Some(ClassificationResult {
                category: Category::Account,
                priority: Priority::Critical,
            })
        );
    }

    #[test]
    fn takes_the_first_object() {
        let raw = r#"{"category": "technical", "priority": "low"} {"category": "billing", "priority": "high"}"#;
        assert_eq!(
            parse_classification(raw).map(|result| result.category),
            Some(Category::Technical)
        );
    }

    #[test]
    fn rejects_empty_and_braceless_text() {
        assert_eq!(parse_classification(""), None);
        assert_eq!(parse_classification("category: billing, priority: high"), None);
        assert_eq!(parse_classification("{}"), None);
    }

    #[test]
    fn rejects_invalid_json() {
        assert_eq!(parse_classification("{category: billing}"), None);
        assert_eq!(parse_classification(r#"{"category": "billing", "priority": }"#), None);
    }

    #[test]
    fn rejects_missing_keys() {
        assert_eq!(parse_classification(r#"{"category": "billing"}"#), None);
        assert_eq!(parse_classification(r#"{"priority": "low"}"#), None);
        assert_eq!(parse_classification(r#"{"label": "billing"}"#), None);
    }

    #[test]
    fn rejects_values_outside_the_enumerations() {
        assert_eq!(
            parse_classification(r#"{"category": "sales", "priority": "high"}"#),
            None
        );
        assert_eq!(
            parse_classification(r#"{"category": "billing", "priority": "urgent"}"#),
            None
        );
        assert_eq!(
            parse_classification(r#"{"category": 3, "priority": "high"}"#),
            None
        );
    }

    #[test]
    fn nested_objects_truncate_the_match() {
        let raw = r#"{"result": {"category": "billing", "priority": "high"}}"#;
        assert_eq!(parse_classification(raw), None);
    }
}
