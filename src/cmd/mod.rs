pub mod classify;
pub mod config;
pub mod stats;
pub mod ticket;
