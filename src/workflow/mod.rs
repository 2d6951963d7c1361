pub mod classify;
pub mod stats;
pub mod ticket;
