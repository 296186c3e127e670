//! Synthetic market and performance simulation engine.
//!
//! The engine owns every piece of simulated state and exposes the only
//! operations allowed to mutate it. Scheduling lives in
//! [`crate::runtime::session`]; this module is synchronous and deterministic
//! given its random source and clock.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;

use super::alert::{AlertLog, AlertSeverity, DEFAULT_MAX_ALERTS, SystemAlert};
use super::history::{ONE_HOUR_MS, ProfitLossHistory, ProfitLossPoint};
use super::metrics::{DriftParams, MetricsDraw, PerformanceMetrics};
use super::quote::{Quote, seed_roster};
use crate::ports::clock_port::Clock;

pub const INITIALIZED_TITLE: &str = "System Initialized";
pub const INITIALIZED_DESCRIPTION: &str = "AlgoTrade Insights is online and operational.";
pub const CONNECTIVITY_WARNING_TITLE: &str = "Backend Warning";
pub const CONNECTIVITY_WARNING_DESCRIPTION: &str =
    "Simulated intermittent connection to the trading backend.";

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub quote_interval_ms: u64,
    pub metrics_interval_ms: u64,
    pub warning_delay_ms: u64,
    pub history_window_ms: i64,
    pub max_alerts: usize,
    pub seed: Option<u64>,
    /// Fraction of price a single quote step may move, scaled by a draw in `[-0.5, 0.5)`.
    pub volatility: f64,
    pub price_floor: f64,
    pub drift: DriftParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            quote_interval_ms: 3_000,
            metrics_interval_ms: 5_000,
            warning_delay_ms: 5_000,
            history_window_ms: ONE_HOUR_MS,
            max_alerts: DEFAULT_MAX_ALERTS,
            seed: None,
            volatility: 0.01,
            price_floor: 0.01,
            drift: DriftParams::default(),
        }
    }
}

/// Owned, read-only copy of engine state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub quotes: Vec<Quote>,
    pub metrics: PerformanceMetrics,
    pub history: Vec<ProfitLossPoint>,
    pub alerts: Vec<SystemAlert>,
}

pub struct SimulationEngine {
    config: SimulationConfig,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    quotes: Vec<Quote>,
    metrics: PerformanceMetrics,
    history: ProfitLossHistory,
    alerts: AlertLog,
}

impl SimulationEngine {
    /// Seeds quotes, metrics and history and records the start-up alert.
    pub fn initialize(config: SimulationConfig, clock: Arc<dyn Clock>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::initialize_with_metrics(config, clock, rng, PerformanceMetrics::default())
    }

    pub fn initialize_with_metrics(
        config: SimulationConfig,
        clock: Arc<dyn Clock>,
        rng: StdRng,
        metrics: PerformanceMetrics,
    ) -> Self {
        let now_ms = clock.now_ms();
        let mut history = ProfitLossHistory::new(config.history_window_ms);
        history.record(now_ms, metrics.net_profit_loss);

        let mut engine = SimulationEngine {
            quotes: seed_roster(now_ms),
            metrics,
            history,
            alerts: AlertLog::new(config.max_alerts),
            config,
            clock,
            rng,
        };
        engine.record_alert(INITIALIZED_TITLE, INITIALIZED_DESCRIPTION, AlertSeverity::Normal);
        engine
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Random-walks every quote independently.
    pub fn tick_quotes(&mut self) {
        let now_ms = self.clock.now_ms();
        for quote in &mut self.quotes {
            let draw = self.rng.gen_range(-0.5..0.5);
            if !quote.apply_walk(draw, self.config.volatility, self.config.price_floor, now_ms) {
                tracing::warn!(ticker = %quote.ticker, draw, "non-finite quote step discarded");
            }
        }
    }

    /// Drifts the metrics, appends a P/L sample and trims the history window.
    pub fn tick_metrics(&mut self) {
        let draw = MetricsDraw {
            pnl: self.rng.gen_range(0.0..1.0),
            win_rate: self.rng.gen_range(0.0..1.0),
            duration_secs: self.rng.gen_range(1..=59),
        };
        let outcome = self.metrics.apply_tick(draw, &self.config.drift);
        if outcome.pnl_rejected || outcome.win_rate_rejected {
            tracing::warn!(?outcome, "non-finite metrics step discarded");
        }

        let now_ms = self.clock.now_ms();
        self.history.record(now_ms, self.metrics.net_profit_loss);
    }

    pub fn record_alert(&mut self, title: &str, description: &str, severity: AlertSeverity) {
        let alert = self.alerts.record(title, description, severity, self.clock.now());
        match alert.severity {
            AlertSeverity::Normal => {
                tracing::info!(id = %alert.id, title = %alert.title, "{}", alert.description)
            }
            AlertSeverity::Destructive => {
                tracing::warn!(id = %alert.id, title = %alert.title, "{}", alert.description)
            }
        }
    }

    pub fn record_connectivity_warning(&mut self) {
        self.record_alert(
            CONNECTIVITY_WARNING_TITLE,
            CONNECTIVITY_WARNING_DESCRIPTION,
            AlertSeverity::Destructive,
        );
    }

    pub fn current_state(&self) -> EngineSnapshot {
        EngineSnapshot {
            quotes: self.quotes.clone(),
            metrics: self.metrics.clone(),
            history: self.history.points().to_vec(),
            alerts: self.alerts.iter().cloned().collect(),
        }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn history(&self) -> &ProfitLossHistory {
        &self.history
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use approx::assert_relative_eq;

    fn engine_at(start_ms: i64) -> (SimulationEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start_ms));
        let config = SimulationConfig {
            seed: Some(7),
            ..SimulationConfig::default()
        };
        (SimulationEngine::initialize(config, clock.clone()), clock)
    }

    #[test]
    fn initialize_seeds_single_history_point() {
        let (engine, _) = engine_at(1_000_000);
        let state = engine.current_state();
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].value, 1250.75);
        assert_eq!(state.history[0].timestamp, 1_000_000);
    }

    #[test]
    fn initialize_records_online_alert() {
        let (engine, _) = engine_at(0);
        let state = engine.current_state();
        assert_eq!(state.alerts.len(), 1);
        assert_eq!(state.alerts[0].title, INITIALIZED_TITLE);
        assert_eq!(state.alerts[0].severity, AlertSeverity::Normal);
    }

    #[test]
    fn tick_quotes_updates_every_quote_timestamp() {
        let (mut engine, clock) = engine_at(0);
        clock.advance_ms(3_000);
        engine.tick_quotes();
        assert!(engine.quotes().iter().all(|q| q.last_updated == 3_000));
    }

    #[test]
    fn tick_quotes_keeps_change_percent_consistent() {
        let (mut engine, _) = engine_at(0);
        let before: Vec<f64> = engine.quotes().iter().map(|q| q.price).collect();
        engine.tick_quotes();
        for (quote, prev) in engine.quotes().iter().zip(before) {
            assert!(quote.price > 0.0);
            assert_relative_eq!(quote.change, quote.price - prev, epsilon = 1e-9);
            assert_relative_eq!(quote.change_percent, quote.change / prev * 100.0, epsilon = 1e-9);
            assert!(quote.change.abs() <= prev * 0.005 + 1e-9);
        }
    }

    #[test]
    fn tick_metrics_increments_trades_and_appends_point() {
        let (mut engine, clock) = engine_at(0);
        clock.advance_ms(5_000);
        engine.tick_metrics();
        assert_eq!(engine.metrics().total_trades, 153);
        assert_eq!(engine.history().len(), 2);
        let latest = engine.history().latest().unwrap();
        assert_eq!(latest.timestamp, 5_000);
        assert_eq!(latest.value, engine.metrics().net_profit_loss);
    }

    #[test]
    fn tick_metrics_sets_second_granularity_duration() {
        let (mut engine, _) = engine_at(0);
        for _ in 0..50 {
            engine.tick_metrics();
            let d = &engine.metrics().avg_trade_duration;
            let secs: u32 = d.trim_end_matches('s').parse().unwrap();
            assert!((1..=59).contains(&secs), "duration {d}");
        }
    }

    #[test]
    fn history_drops_points_older_than_an_hour() {
        let (mut engine, clock) = engine_at(0);
        clock.advance_ms(ONE_HOUR_MS + 1);
        engine.tick_metrics();
        let state = engine.current_state();
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].timestamp, ONE_HOUR_MS + 1);
    }

    #[test]
    fn same_seed_same_walk() {
        let (mut a, _) = engine_at(0);
        let (mut b, _) = engine_at(0);
        for _ in 0..10 {
            a.tick_quotes();
            b.tick_quotes();
            a.tick_metrics();
            b.tick_metrics();
        }
        assert_eq!(a.quotes(), b.quotes());
        assert_eq!(a.metrics(), b.metrics());
    }

    #[test]
    fn snapshot_is_detached_from_engine() {
        let (mut engine, _) = engine_at(0);
        let mut snapshot = engine.current_state();
        snapshot.quotes[0].price = -1.0;
        snapshot.alerts.clear();
        engine.tick_quotes();
        assert!(engine.quotes()[0].price > 0.0);
        assert_eq!(engine.alerts().len(), 1);
    }

    #[test]
    fn connectivity_warning_is_destructive() {
        let (mut engine, _) = engine_at(0);
        engine.record_connectivity_warning();
        let newest = engine.alerts().newest().unwrap();
        assert_eq!(newest.title, CONNECTIVITY_WARNING_TITLE);
        assert!(newest.is_destructive());
    }

    #[test]
    fn alert_capacity_follows_config() {
        let clock = Arc::new(ManualClock::new(0));
        let config = SimulationConfig {
            max_alerts: 3,
            seed: Some(1),
            ..SimulationConfig::default()
        };
        let mut engine = SimulationEngine::initialize(config, clock);
        for i in 0..10 {
            engine.record_alert(&format!("n{i}"), "", AlertSeverity::Normal);
        }
        assert_eq!(engine.alerts().len(), 3);
        assert_eq!(engine.alerts().newest().unwrap().title, "n9");
    }
}
