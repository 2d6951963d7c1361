use tracing::{error, info, warn};

use crate::classify::{build_classification_prompt, parse_classification};
use crate::domain::classification::{ClassificationRequest, ClassificationResult};
use crate::error::{ClassificationFailure, InferenceError, excerpt};
use crate::services::LanguageModelService;

const LOG_EXCERPT_CHARS: usize = 200;

/// Suggests a category and priority for the request.
///
/// Never fails: every inference or parsing problem is logged and replaced by
/// [`ClassificationResult::default`].
pub async fn suggest_classification(
    model: &dyn LanguageModelService,
    request: &ClassificationRequest,
) -> ClassificationResult {
    match classify(model, request).await {
        Ok(result) => {
            info!(
                category = %result.category,
                priority = %result.priority,
                "model classified ticket"
            );
            result
        }
        Err(failure) => {
            log_failure(&failure);
            ClassificationResult::default()
        }
    }
}

async fn classify(
    model: &dyn LanguageModelService,
    request: &ClassificationRequest,
) -> Result<ClassificationResult, ClassificationFailure> {
    let prompt = build_classification_prompt(request.description());
    let generated = model.generate(&prompt).await?;
    parse_classification(&generated).ok_or_else(|| ClassificationFailure::Unparseable {
        excerpt: excerpt(&generated, LOG_EXCERPT_CHARS),
    })
}

fn log_failure(failure: &ClassificationFailure) {
    match failure {
        ClassificationFailure::Inference(InferenceError::Unconfigured) => {
            warn!("inference API key not set, returning default classification");
        }
        ClassificationFailure::Inference(InferenceError::Timeout) => {
            error!("inference request timed out");
        }
        ClassificationFailure::Inference(InferenceError::Http { status, body }) => {
            error!(status, body = %body, "inference endpoint returned an error");
        }
        ClassificationFailure::Inference(InferenceError::Transport(reason)) => {
            error!(reason = %reason, "inference request failed");
        }
        ClassificationFailure::Unparseable { excerpt } => {
            warn!(generated = %excerpt, "model returned an unparseable response");
        }
    }
}
