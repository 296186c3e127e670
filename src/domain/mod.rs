//! Core domain types and logic.

pub mod alert;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod optimization;
pub mod quote;
pub mod risk;
