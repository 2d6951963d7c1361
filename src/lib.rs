//! Support ticket triage: model-suggested category and priority with a
//! fail-open fallback, plus volume statistics over the ticket store.

pub mod classify;
pub mod cmd;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;
pub mod workflow;
