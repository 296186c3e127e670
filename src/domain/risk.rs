//! Risk-management settings and their field bounds.

use serde::Serialize;

use super::error::{AlgoTradeError, ValidationErrors};

pub const STOP_LOSS_RANGE: (f64, f64) = (0.1, 50.0);
pub const TAKE_PROFIT_RANGE: (f64, f64) = (0.1, 100.0);
pub const MIN_POSITION_SIZE_USD: f64 = 100.0;
pub const LEVERAGE_RANGE: (u32, u32) = (1, 100);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSettings {
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
    pub max_position_size_usd: f64,
    pub leverage: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        RiskSettings {
            stop_loss_percent: 2.0,
            take_profit_percent: 5.0,
            max_position_size_usd: 10_000.0,
            leverage: 1,
        }
    }
}

fn within(value: f64, (lo, hi): (f64, f64)) -> bool {
    value >= lo && value <= hi
}

impl RiskSettings {
    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), AlgoTradeError> {
        let mut errors = ValidationErrors::new();

        if !within(self.stop_loss_percent, STOP_LOSS_RANGE) {
            errors.push(
                "stop_loss_percent",
                if self.stop_loss_percent > STOP_LOSS_RANGE.1 {
                    "Must be <= 50"
                } else {
                    "Must be > 0"
                },
            );
        }
        if !within(self.take_profit_percent, TAKE_PROFIT_RANGE) {
            errors.push(
                "take_profit_percent",
                if self.take_profit_percent > TAKE_PROFIT_RANGE.1 {
                    "Must be <= 100"
                } else {
                    "Must be > 0"
                },
            );
        }
        if !(self.max_position_size_usd >= MIN_POSITION_SIZE_USD
            && self.max_position_size_usd.is_finite())
        {
            errors.push("max_position_size_usd", "Must be >= 100");
        }
        if self.leverage < LEVERAGE_RANGE.0 || self.leverage > LEVERAGE_RANGE.1 {
            errors.push("leverage", "Must be between 1 and 100");
        }

        errors.into_result()
    }
}
