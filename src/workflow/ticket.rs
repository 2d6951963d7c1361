use tracing::debug;

use crate::context::AppContext;
use crate::domain::classification::{ClassificationRequest, ClassificationResult};
use crate::domain::ticket::{Category, NewTicket, Priority, Status, TicketRecord};
use crate::error::AppResult;
use crate::workflow::classify::suggest_classification;

/// A ticket as submitted; missing category or priority is filled from the model's suggestion.
#[derive(Debug, Clone)]
pub struct TicketIntake {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

pub async fn open_ticket(ctx: &AppContext, intake: TicketIntake) -> AppResult<TicketRecord> {
    let suggestion = match (intake.category, intake.priority) {
        (Some(category), Some(priority)) => ClassificationResult { category, priority },
        _ => suggest_for(ctx, &intake.description).await,
    };

    ctx.tickets
        .create(NewTicket {
            title: intake.title,
            description: intake.description,
            category: intake.category.unwrap_or(suggestion.category),
            priority: intake.priority.unwrap_or(suggestion.priority),
            status: intake.status.unwrap_or(Status::Open),
        })
        .await
}

async fn suggest_for(ctx: &AppContext, description: &str) -> ClassificationResult {
    match ClassificationRequest::new(description) {
        Ok(request) => suggest_classification(ctx.language_model.as_ref(), &request).await,
        Err(err) => {
            debug!(error = %err, "description too short to classify, using defaults");
            ClassificationResult::default()
        }
    }
}
