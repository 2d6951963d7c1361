use async_trait::async_trait;

use crate::error::InferenceError;

/// An opaque text-completion endpoint.
#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// Returns only the newly generated text for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError>;
}
