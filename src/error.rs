use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("ticket store error: {0}")]
    TicketStore(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Ways a single call to the inference endpoint can fail.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference credential not configured")]
    Unconfigured,
    #[error("inference request timed out")]
    Timeout,
    #[error("inference endpoint responded with {status}: {body}")]
    Http { status: u16, body: String },
    #[error("inference request failed: {0}")]
    Transport(String),
}

/// Why a classification fell back to the default result.
#[derive(Debug, Error)]
pub enum ClassificationFailure {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("unparseable model response: {excerpt}")]
    Unparseable { excerpt: String },
}

/// Truncates to at most `limit` characters without splitting a code point.
pub fn excerpt(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}
