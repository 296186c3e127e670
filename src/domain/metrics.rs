//! Aggregate performance metrics and their per-tick drift.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub net_profit_loss: f64,
    /// Percentage in `[0, 100]`.
    pub win_rate: f64,
    pub avg_trade_duration: String,
    pub total_trades: u64,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        PerformanceMetrics {
            net_profit_loss: 1250.75,
            win_rate: 65.7,
            avg_trade_duration: "2h 15m".to_string(),
            total_trades: 152,
        }
    }
}

/// Bias and scale applied on each metrics tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftParams {
    pub pnl_bias: f64,
    pub pnl_scale: f64,
    pub win_rate_bias: f64,
    pub win_rate_scale: f64,
}

impl Default for DriftParams {
    fn default() -> Self {
        DriftParams {
            pnl_bias: 0.45,
            pnl_scale: 200.0,
            win_rate_bias: 0.48,
            win_rate_scale: 0.1,
        }
    }
}

/// Random inputs for one metrics tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsDraw {
    /// Uniform in `[0, 1)`.
    pub pnl: f64,
    /// Uniform in `[0, 1)`.
    pub win_rate: f64,
    /// Whole seconds in `[1, 59]`.
    pub duration_secs: u32,
}

/// Which fields a tick had to leave at their previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriftOutcome {
    pub pnl_rejected: bool,
    pub win_rate_rejected: bool,
}

impl PerformanceMetrics {
    pub fn apply_tick(&mut self, draw: MetricsDraw, params: &DriftParams) -> DriftOutcome {
        let mut outcome = DriftOutcome::default();

        let pnl = self.net_profit_loss + (draw.pnl - params.pnl_bias) * params.pnl_scale;
        if pnl.is_finite() {
            self.net_profit_loss = pnl;
        } else {
            outcome.pnl_rejected = true;
        }

        self.total_trades += 1;

        let win_rate =
            self.win_rate + (draw.win_rate - params.win_rate_bias) * params.win_rate_scale;
        if win_rate.is_finite() {
            self.win_rate = win_rate.clamp(0.0, 100.0);
        } else {
            outcome.win_rate_rejected = true;
        }

        self.avg_trade_duration = format!("{}s", draw.duration_secs);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn draw(pnl: f64, win_rate: f64) -> MetricsDraw {
        MetricsDraw {
            pnl,
            win_rate,
            duration_secs: 17,
        }
    }

    #[test]
    fn default_matches_seed_values() {
        let m = PerformanceMetrics::default();
        assert_eq!(m.net_profit_loss, 1250.75);
        assert_eq!(m.win_rate, 65.7);
        assert_eq!(m.avg_trade_duration, "2h 15m");
        assert_eq!(m.total_trades, 152);
    }

    #[test]
    fn pnl_moves_by_biased_scaled_draw() {
        let mut m = PerformanceMetrics::default();
        m.apply_tick(draw(0.95, 0.48), &DriftParams::default());
        assert_relative_eq!(m.net_profit_loss, 1250.75 + 100.0, epsilon = 1e-9);

        let mut m = PerformanceMetrics::default();
        m.apply_tick(draw(0.0, 0.48), &DriftParams::default());
        assert_relative_eq!(m.net_profit_loss, 1250.75 - 90.0, epsilon = 1e-9);
    }

    #[test]
    fn win_rate_drift_and_trade_count() {
        let mut m = PerformanceMetrics::default();
        m.apply_tick(draw(0.45, 0.98), &DriftParams::default());
        assert_relative_eq!(m.win_rate, 65.75, epsilon = 1e-9);
        assert_eq!(m.total_trades, 153);
        assert_eq!(m.avg_trade_duration, "17s");
    }

    #[test]
    fn win_rate_clamped_at_bounds() {
        let params = DriftParams {
            win_rate_scale: 1_000.0,
            ..DriftParams::default()
        };
        let mut m = PerformanceMetrics::default();
        m.apply_tick(draw(0.5, 0.99), &params);
        assert_eq!(m.win_rate, 100.0);
        m.apply_tick(draw(0.5, 0.0), &params);
        assert_eq!(m.win_rate, 0.0);
    }

    #[test]
    fn non_finite_pnl_is_rejected_but_trades_still_count() {
        let params = DriftParams {
            pnl_scale: f64::INFINITY,
            ..DriftParams::default()
        };
        let mut m = PerformanceMetrics::default();
        let outcome = m.apply_tick(draw(0.9, 0.5), &params);
        assert!(outcome.pnl_rejected);
        assert!(!outcome.win_rate_rejected);
        assert_eq!(m.net_profit_loss, 1250.75);
        assert_eq!(m.total_trades, 153);
    }

    #[test]
    fn non_finite_win_rate_is_rejected() {
        let params = DriftParams {
            win_rate_scale: f64::NAN,
            ..DriftParams::default()
        };
        let mut m = PerformanceMetrics::default();
        let outcome = m.apply_tick(draw(0.5, 0.5), &params);
        assert!(outcome.win_rate_rejected);
        assert_eq!(m.win_rate, 65.7);
    }
}
