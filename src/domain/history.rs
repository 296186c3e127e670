//! Rolling profit/loss history used for charting.

use serde::Serialize;

pub const ONE_HOUR_MS: i64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitLossPoint {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub value: f64,
}

/// Time-ordered P/L samples that never reach further back than `window_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitLossHistory {
    points: Vec<ProfitLossPoint>,
    window_ms: i64,
}

impl ProfitLossHistory {
    pub fn new(window_ms: i64) -> Self {
        ProfitLossHistory {
            points: Vec::new(),
            window_ms,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Appends a sample at `now_ms` and evicts everything older than the window.
    ///
    /// A clock that steps backwards is pinned to the last stored timestamp so the
    /// sequence stays non-decreasing.
    pub fn record(&mut self, now_ms: i64, value: f64) {
        let timestamp = match self.points.last() {
            Some(last) if last.timestamp > now_ms => last.timestamp,
            _ => now_ms,
        };
        self.points.push(ProfitLossPoint { timestamp, value });
        self.retain_window(now_ms);
    }

    pub fn retain_window(&mut self, now_ms: i64) {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        self.points.retain(|p| p.timestamp >= cutoff);
    }

    pub fn points(&self) -> &[ProfitLossPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&ProfitLossPoint> {
        self.points.last()
    }
}

impl Default for ProfitLossHistory {
    fn default() -> Self {
        Self::new(ONE_HOUR_MS)
    }
}
