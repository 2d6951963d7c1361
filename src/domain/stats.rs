//! Summary statistics over a ticket collection.
//!
//! The per-dimension counts can come either from [`summarize`] folding over
//! materialized records, or from a store that already grouped them; both
//! routes end in [`StatsSummary::from_counts`].

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use crate::domain::ticket::{Category, Priority, Status, TicketRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub avg_tickets_per_day: f64,
    pub priority_breakdown: BTreeMap<Priority, u64>,
    pub category_breakdown: BTreeMap<Category, u64>,
}

impl StatsSummary {
    /// Breakdowns are seeded with every enum member so absent keys surface as zero.
    pub fn from_counts(
        total_tickets: u64,
        open_tickets: u64,
        daily_counts: impl IntoIterator<Item = u64>,
        priority_counts: impl IntoIterator<Item = (Priority, u64)>,
        category_counts: impl IntoIterator<Item = (Category, u64)>,
    ) -> Self {
        Self {
            total_tickets,
            open_tickets,
            avg_tickets_per_day: average_per_day(daily_counts),
            priority_breakdown: seeded(&Priority::ALL, priority_counts),
            category_breakdown: seeded(&Category::ALL, category_counts),
        }
    }
}

/// Folds the records into a summary; calendar days are taken in `offset`.
pub fn summarize(tickets: &[TicketRecord], offset: FixedOffset) -> StatsSummary {
    let open_tickets = tickets
        .iter()
        .filter(|ticket| ticket.status == Status::Open)
        .count() as u64;

    StatsSummary::from_counts(
        tickets.len() as u64,
        open_tickets,
        count_by_day(tickets, offset).into_values(),
        count_by(tickets, |ticket| ticket.priority),
        count_by(tickets, |ticket| ticket.category),
    )
}

pub fn count_by_day(tickets: &[TicketRecord], offset: FixedOffset) -> BTreeMap<NaiveDate, u64> {
    count_by(tickets, |ticket| {
        ticket.created_at.with_timezone(&offset).date_naive()
    })
}

pub fn count_by<K, F>(tickets: &[TicketRecord], key: F) -> BTreeMap<K, u64>
where
    K: Ord,
    F: Fn(&TicketRecord) -> K,
{
    let mut counts = BTreeMap::new();
    for ticket in tickets {
        *counts.entry(key(ticket)).or_insert(0) += 1;
    }
    counts
}

/// Mean of the per-day counts rounded to one decimal; `0.0` when there are no days.
pub fn average_per_day(daily_counts: impl IntoIterator<Item = u64>) -> f64 {
    let (days, total) = daily_counts
        .into_iter()
        .fold((0u64, 0u64), |(days, total), count| (days + 1, total + count));
    if days == 0 {
        return 0.0;
    }
    let average = total as f64 / days as f64;
    format!("{average:.1}").parse().unwrap_or(average)
}

fn seeded<K: Ord + Copy>(
    members: &[K],
    counts: impl IntoIterator<Item = (K, u64)>,
) -> BTreeMap<K, u64> {
    let mut breakdown: BTreeMap<K, u64> = members.iter().map(|member| (*member, 0)).collect();
    for (key, count) in counts {
        breakdown.insert(key, count);
    }
    breakdown
}
