//! Notification sink port trait.

use crate::domain::alert::AlertSeverity;

/// Anything that can surface a user-visible notification.
pub trait AlertPort: Send + Sync {
    fn record_alert(&self, title: &str, description: &str, severity: AlertSeverity);
}
