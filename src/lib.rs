//! algotrade: synthetic trading-insights console.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], and the Tokio-hosted session in
//! [`runtime`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
pub mod runtime;
