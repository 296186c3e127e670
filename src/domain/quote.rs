//! Simulated instrument quotes and the price random walk.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub id: String,
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: String,
    /// Epoch milliseconds of the last tick that touched this quote.
    pub last_updated: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Up => "Up",
            Trend::Down => "Down",
            Trend::Neutral => "Neutral",
        }
    }
}

impl Quote {
    pub fn new(
        id: &str,
        ticker: &str,
        price: f64,
        change: f64,
        change_percent: f64,
        volume: &str,
        now_ms: i64,
    ) -> Self {
        Quote {
            id: id.to_string(),
            ticker: ticker.to_string(),
            price,
            change,
            change_percent,
            volume: volume.to_string(),
            last_updated: now_ms,
        }
    }

    pub fn trend(&self) -> Trend {
        if self.change > 0.0 {
            Trend::Up
        } else if self.change < 0.0 {
            Trend::Down
        } else {
            Trend::Neutral
        }
    }

    /// Moves the price by `draw * price * volatility`, floored at `price_floor`.
    ///
    /// `draw` is expected in `[-0.5, 0.5)`. Returns `false` and leaves the quote
    /// untouched if the step would produce a non-finite value.
    pub fn apply_walk(
        &mut self,
        draw: f64,
        volatility: f64,
        price_floor: f64,
        now_ms: i64,
    ) -> bool {
        let previous = self.price;
        let delta = draw * (previous * volatility);
        let price = (previous + delta).max(price_floor);
        let change = price - previous;
        let change_percent = (change / previous) * 100.0;

        if !(price.is_finite() && change.is_finite() && change_percent.is_finite()) {
            return false;
        }

        self.price = price;
        self.change = change;
        self.change_percent = change_percent;
        self.last_updated = now_ms;
        true
    }
}

/// The fixed instrument roster every session starts from.
pub fn seed_roster(now_ms: i64) -> Vec<Quote> {
    vec![
        Quote::new("1", "AAPL", 170.34, 1.22, 0.72, "98.7M", now_ms),
        Quote::new("2", "MSFT", 420.55, -0.89, -0.21, "76.5M", now_ms),
        Quote::new("3", "GOOGL", 175.12, 2.50, 1.45, "65.3M", now_ms),
        Quote::new("4", "AMZN", 180.67, -1.15, -0.63, "55.1M", now_ms),
        Quote::new("5", "NVDA", 900.20, 10.45, 1.18, "120.2M", now_ms),
    ]
}
