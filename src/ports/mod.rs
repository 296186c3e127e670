//! Port traits the domain and runtime depend on.

pub mod alert_port;
pub mod clock_port;
pub mod config_port;
pub mod optimizer_port;
