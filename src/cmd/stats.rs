use crate::context::AppContext;
use crate::domain::stats::StatsSummary;
use crate::error::AppResult;
use crate::workflow::stats::collect_stats;

pub async fn run(ctx: &AppContext) -> AppResult<StatsSummary> {
    collect_stats(ctx.tickets.as_ref()).await
}
