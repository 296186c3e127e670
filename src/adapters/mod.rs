//! Concrete adapter implementations for ports.

pub mod clock;
pub mod file_config_adapter;
#[cfg(feature = "gemini")]
pub mod gemini_optimizer;
pub mod text_dashboard;
