use serde::Serialize;

use crate::domain::ticket::{Category, Priority};
use crate::error::{AppError, AppResult};

const DESCRIPTION_MIN_CHARS: usize = 10;

/// A description that is long enough to be worth classifying.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    description: String,
}

impl ClassificationRequest {
    pub fn new(description: &str) -> AppResult<Self> {
        let description = description.trim();
        if description.chars().count() < DESCRIPTION_MIN_CHARS {
            return Err(AppError::Validation(format!(
                "description must be at least {DESCRIPTION_MIN_CHARS} characters"
            )));
        }
        Ok(Self {
            description: description.to_string(),
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub category: Category,
    pub priority: Priority,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self {
            category: Category::General,
            priority: Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResponse {
    pub suggested_category: Category,
    pub suggested_priority: Priority,
}

impl From<ClassificationResult> for ClassificationResponse {
    fn from(result: ClassificationResult) -> Self {
        Self {
            suggested_category: result.category,
            suggested_priority: result.priority,
        }
    }
}
