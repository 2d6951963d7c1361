use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Billing,
    Technical,
    Account,
    General,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Billing,
        Category::Technical,
        Category::Account,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "billing",
            Category::Technical => "technical",
            Category::Account => "account",
            Category::General => "general",
        }
    }

    /// Case-insensitive, whitespace-tolerant lookup.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "billing" => Some(Category::Billing),
            "technical" => Some(Category::Technical),
            "account" => Some(Category::Account),
            "general" => Some(Category::General),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Resolved,
        Status::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Resolved => "resolved",
            Status::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "open" => Some(Status::Open),
            "in_progress" => Some(Status::InProgress),
            "resolved" => Some(Status::Resolved),
            "closed" => Some(Status::Closed),
            _ => None,
        }
    }
}

fn invalid_choice(field: &str, valid: impl Iterator<Item = &'static str>) -> AppError {
    let valid = valid.collect::<Vec<_>>().join(", ");
    AppError::Validation(format!("Invalid {field}. Must be one of: {valid}"))
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(value: &str) -> AppResult<Self> {
        Category::parse(value)
            .ok_or_else(|| invalid_choice("category", Category::ALL.iter().map(|c| c.as_str())))
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(value: &str) -> AppResult<Self> {
        Priority::parse(value)
            .ok_or_else(|| invalid_choice("priority", Priority::ALL.iter().map(|p| p.as_str())))
    }
}

impl FromStr for Status {
    type Err = AppError;

    fn from_str(value: &str) -> AppResult<Self> {
        Status::parse(value)
            .ok_or_else(|| invalid_choice("status", Status::ALL.iter().map(|s| s.as_str())))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
}

impl NewTicket {
    pub fn validate(&self) -> AppResult<()> {
        validate_title(&self.title)?;
        validate_description(&self.description)
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

impl TicketPatch {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }

    pub fn apply(self, ticket: &mut TicketRecord) {
        if let Some(title) = self.title {
            ticket.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            ticket.description = description.trim().to_string();
        }
        if let Some(category) = self.category {
            ticket.category = category;
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
    }
}

/// Exact-match filters plus a case-insensitive search over title and description.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub search: Option<String>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &TicketRecord) -> bool {
        if self.category.is_some_and(|category| category != ticket.category) {
            return false;
        }
        if self.priority.is_some_and(|priority| priority != ticket.priority) {
            return false;
        }
        if self.status.is_some_and(|status| status != ticket.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                ticket.title.to_lowercase().contains(&term)
                    || ticket.description.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> AppResult<()> {
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    Ok(())
}
