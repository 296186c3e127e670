//! Domain error types.

use std::fmt;

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found while validating one form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message attached to `field`, if that field was rejected.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when nothing was pushed, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), AlgoTradeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AlgoTradeError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// Top-level error type for algotrade.
#[derive(Debug, thiserror::Error)]
pub enum AlgoTradeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("an optimization request is already pending")]
    RequestPending,

    #[error("optimizer error: {reason}")]
    Optimizer { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlgoTradeError {
    pub fn optimizer(reason: impl Into<String>) -> Self {
        Self::Optimizer {
            reason: reason.into(),
        }
    }

    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&AlgoTradeError> for std::process::ExitCode {
    fn from(err: &AlgoTradeError) -> Self {
        let code: u8 = match err {
            AlgoTradeError::Io(_) => 1,
            AlgoTradeError::ConfigParse { .. }
            | AlgoTradeError::ConfigMissing { .. }
            | AlgoTradeError::ConfigInvalid { .. } => 2,
            AlgoTradeError::Validation(_) => 3,
            AlgoTradeError::RequestPending | AlgoTradeError::Optimizer { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
