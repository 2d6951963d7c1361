use crate::domain::classification::{ClassificationRequest, ClassificationResponse};
use crate::error::AppResult;
use crate::services::LanguageModelService;
use crate::workflow::classify::suggest_classification;

/// Only a too-short description is an error; model failures yield the default suggestion.
pub async fn run(
    model: &dyn LanguageModelService,
    description: &str,
) -> AppResult<ClassificationResponse> {
    let request = ClassificationRequest::new(description)?;
    let result = suggest_classification(model, &request).await;
    Ok(result.into())
}
