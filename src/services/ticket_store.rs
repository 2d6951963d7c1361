use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::ticket::{
    Category, NewTicket, Priority, Status, TicketFilter, TicketPatch, TicketRecord,
};
use crate::error::AppResult;

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create(&self, ticket: NewTicket) -> AppResult<TicketRecord>;
    async fn get(&self, id: u64) -> AppResult<Option<TicketRecord>>;
    async fn update(&self, id: u64, patch: TicketPatch) -> AppResult<TicketRecord>;
    /// Newest first.
    async fn list(&self, filter: &TicketFilter) -> AppResult<Vec<TicketRecord>>;

    async fn count(&self) -> AppResult<u64>;
    async fn count_with_status(&self, status: Status) -> AppResult<u64>;
    /// Tickets per calendar day in the store's configured offset.
    async fn count_by_day(&self) -> AppResult<Vec<(NaiveDate, u64)>>;
    async fn count_by_priority(&self) -> AppResult<Vec<(Priority, u64)>>;
    async fn count_by_category(&self) -> AppResult<Vec<(Category, u64)>>;
}
