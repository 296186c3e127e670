//! Property tests over the simulation engine's invariants.

mod common;

use algotrade::domain::alert::{AlertLog, AlertSeverity, DEFAULT_MAX_ALERTS};
use algotrade::domain::history::{ONE_HOUR_MS, ProfitLossHistory};
use algotrade::domain::metrics::{DriftParams, MetricsDraw, PerformanceMetrics};
use algotrade::domain::quote::Quote;
use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use common::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn quote_walk_keeps_price_positive_and_percent_consistent(
        draws in prop::collection::vec(-0.5f64..0.5, 1..200),
    ) {
        let mut quote = Quote::new("1", "AAPL", 170.34, 1.22, 0.72, "98.7M", START_MS);
        for draw in draws {
            let previous = quote.price;
            prop_assert!(quote.apply_walk(draw, 0.01, 0.01, START_MS));
            prop_assert!(quote.price > 0.0);
            assert_relative_eq!(quote.change, quote.price - previous, epsilon = 1e-9);
            assert_relative_eq!(
                quote.change_percent,
                quote.change / previous * 100.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn win_rate_stays_in_range(
        draws in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0, 1u32..=59), 1..300),
        start in 0.0f64..=100.0,
    ) {
        let mut metrics = PerformanceMetrics { win_rate: start, ..PerformanceMetrics::default() };
        let params = DriftParams { win_rate_scale: 50.0, ..DriftParams::default() };
        for (pnl, win_rate, duration_secs) in draws {
            metrics.apply_tick(MetricsDraw { pnl, win_rate, duration_secs }, &params);
            prop_assert!((0.0..=100.0).contains(&metrics.win_rate));
        }
    }

    #[test]
    fn trade_count_grows_by_one_per_tick(ticks in 0usize..100, seed in any::<u64>()) {
        let (mut engine, _clock) = seeded_engine(seed);
        let start = engine.metrics().total_trades;
        for _ in 0..ticks {
            engine.tick_metrics();
        }
        prop_assert_eq!(engine.metrics().total_trades, start + ticks as u64);
    }

    #[test]
    fn history_is_sorted_and_within_window(
        steps in prop::collection::vec(-10_000i64..600_000, 1..200),
    ) {
        let mut history = ProfitLossHistory::default();
        let mut now = START_MS;
        for (i, step) in steps.into_iter().enumerate() {
            now += step;
            history.record(now, i as f64);
            let points = history.points();
            prop_assert!(points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
            prop_assert!(points.iter().all(|p| p.timestamp >= now - ONE_HOUR_MS));
            prop_assert!(!points.is_empty());
        }
    }

    #[test]
    fn alert_log_is_bounded_and_newest_first(count in 1usize..80) {
        let mut log = AlertLog::new(DEFAULT_MAX_ALERTS);
        for i in 0..count {
            let at = Utc.timestamp_millis_opt(START_MS + i as i64).unwrap();
            log.record(&format!("alert {i}"), "d", AlertSeverity::Normal, at);
        }
        prop_assert_eq!(log.len(), count.min(DEFAULT_MAX_ALERTS));
        let newest = log.newest().map(|a| a.title.clone());
        prop_assert_eq!(newest, Some(format!("alert {}", count - 1)));
        let times: Vec<_> = log.iter().map(|a| a.created_at).collect();
        prop_assert!(times.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn thousand_quote_ticks_stay_bounded() {
    let (mut engine, clock) = seeded_engine(42);
    for _ in 0..1_000 {
        clock.advance_ms(3_000);
        engine.tick_quotes();
    }
    let aapl = engine.quotes().iter().find(|q| q.ticker == "AAPL").unwrap();
    assert!(aapl.price > 0.0);
    assert!(aapl.price <= 170.34 * 1.005f64.powi(1_000));
    assert!(aapl.price >= 170.34 * 0.995f64.powi(1_000));
}

#[test]
fn initialize_yields_single_seed_point() {
    let (engine, _clock) = seeded_engine(1);
    let points = engine.history().points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].timestamp, START_MS);
    assert_relative_eq!(points[0].value, 1250.75);
    assert_eq!(engine.alerts().len(), 1);
    assert_eq!(engine.quotes().len(), 5);
}

#[test]
fn same_seed_replays_identically() {
    let (mut a, _) = seeded_engine(99);
    let (mut b, _) = seeded_engine(99);
    for _ in 0..25 {
        a.tick_quotes();
        a.tick_metrics();
        b.tick_quotes();
        b.tick_metrics();
    }
    assert_eq!(a.current_state(), b.current_state());
}

#[test]
fn metrics_ticks_slide_history_window() {
    let (mut engine, clock) = seeded_engine(5);
    for _ in 0..800 {
        clock.advance_ms(5_000);
        engine.tick_metrics();
    }
    // 3_600_000 / 5_000 = 720 intervals, inclusive of the cutoff point.
    assert_eq!(engine.history().len(), 721);
    let latest = engine.history().latest().unwrap();
    assert_relative_eq!(latest.value, engine.metrics().net_profit_loss);
}
