//! System alerts and the bounded, newest-first alert log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_MAX_ALERTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    #[default]
    Normal,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemAlert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub created_at: DateTime<Utc>,
}

impl SystemAlert {
    pub fn is_destructive(&self) -> bool {
        self.severity == AlertSeverity::Destructive
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertLog {
    alerts: VecDeque<SystemAlert>,
    capacity: usize,
    max_ms: i64,
    seq: u32,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        AlertLog {
            alerts: VecDeque::with_capacity(capacity.clamp(1, DEFAULT_MAX_ALERTS)),
            capacity: capacity.max(1),
            max_ms: i64::MIN,
            seq: 0,
        }
    }

    /// Prepends a new alert and drops whatever falls past `capacity`.
    pub fn record(
        &mut self,
        title: &str,
        description: &str,
        severity: AlertSeverity,
        created_at: DateTime<Utc>,
    ) -> &SystemAlert {
        let alert = SystemAlert {
            id: self.next_id(created_at.timestamp_millis()),
            title: title.to_string(),
            description: description.to_string(),
            severity,
            created_at,
        };
        self.alerts.push_front(alert);
        self.alerts.truncate(self.capacity);
        &self.alerts[0]
    }

    // Ids are the creation millisecond. An alert stamped at or before the
    // newest millisecond seen so far takes that millisecond plus a suffix.
    fn next_id(&mut self, ms: i64) -> String {
        if ms > self.max_ms {
            self.max_ms = ms;
            self.seq = 0;
            ms.to_string()
        } else {
            self.seq += 1;
            format!("{}-{}", self.max_ms, self.seq)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemAlert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn newest(&self) -> Option<&SystemAlert> {
        self.alerts.front()
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ALERTS)
    }
}
