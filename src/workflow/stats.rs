use crate::domain::stats::StatsSummary;
use crate::domain::ticket::Status;
use crate::error::AppResult;
use crate::services::TicketStore;

/// Builds the summary from the store's grouped counts.
pub async fn collect_stats(store: &dyn TicketStore) -> AppResult<StatsSummary> {
    let total = store.count().await?;
    let open = store.count_with_status(Status::Open).await?;
    let daily = store.count_by_day().await?;
    let priorities = store.count_by_priority().await?;
    let categories = store.count_by_category().await?;

    Ok(StatsSummary::from_counts(
        total,
        open,
        daily.into_iter().map(|(_, count)| count),
        priorities,
        categories,
    ))
}
