#![allow(dead_code)]

use algotrade::adapters::clock::ManualClock;
use algotrade::domain::alert::AlertSeverity;
use algotrade::domain::engine::{SimulationConfig, SimulationEngine};
use algotrade::domain::error::AlgoTradeError;
use algotrade::domain::optimization::{
    OptimizationForm, OptimizationRequest, OptimizationResult, SAMPLE_MARKET_DATA,
};
use algotrade::ports::alert_port::AlertPort;
use algotrade::ports::optimizer_port::OptimizerPort;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

pub const START_MS: i64 = 1_700_000_000_000;

pub fn seeded_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed: Some(seed),
        ..SimulationConfig::default()
    }
}

pub fn seeded_engine(seed: u64) -> (SimulationEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    let engine = SimulationEngine::initialize(seeded_config(seed), clock.clone());
    (engine, clock)
}

pub fn valid_form() -> OptimizationForm {
    OptimizationForm {
        market_data: SAMPLE_MARKET_DATA.to_string(),
        algorithm_type: "moving-average-crossover".to_string(),
        risk_tolerance: "medium".to_string(),
    }
}

pub fn sample_result(tag: &str) -> OptimizationResult {
    OptimizationResult {
        optimal_parameters: format!("{tag}: short MA 10, long MA 50"),
        backtesting_results: "Sharpe 1.4, max drawdown 8%".to_string(),
        analysis_summary: "Trend-following suits the current regime.".to_string(),
    }
}

enum Behavior {
    Succeed(OptimizationResult),
    Fail(String),
    Gated(Arc<Notify>, OptimizationResult),
    Scripted(Mutex<VecDeque<Result<OptimizationResult, String>>>),
}

/// Scripted optimizer that counts its calls.
pub struct MockOptimizer {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockOptimizer {
    pub fn succeeding(result: OptimizationResult) -> Self {
        Self {
            behavior: Behavior::Succeed(result),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            behavior: Behavior::Fail(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Blocks each call until `gate` is notified, then succeeds.
    pub fn gated(gate: Arc<Notify>, result: OptimizationResult) -> Self {
        Self {
            behavior: Behavior::Gated(gate, result),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the scripted outcomes in order, then fails.
    pub fn scripted(outcomes: Vec<Result<OptimizationResult, String>>) -> Self {
        Self {
            behavior: Behavior::Scripted(Mutex::new(outcomes.into())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OptimizerPort for MockOptimizer {
    async fn optimize(
        &self,
        _request: &OptimizationRequest,
    ) -> Result<OptimizationResult, AlgoTradeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(result) => Ok(result.clone()),
            Behavior::Fail(reason) => Err(AlgoTradeError::optimizer(reason.clone())),
            Behavior::Gated(gate, result) => {
                gate.notified().await;
                Ok(result.clone())
            }
            Behavior::Scripted(outcomes) => {
                let next = outcomes.lock().pop_front();
                match next {
                    Some(Ok(result)) => Ok(result),
                    Some(Err(reason)) => Err(AlgoTradeError::optimizer(reason)),
                    None => Err(AlgoTradeError::optimizer("script exhausted")),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAlert {
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub alerts: Mutex<Vec<RecordedAlert>>,
}

impl RecordingAlerts {
    pub fn recorded(&self) -> Vec<RecordedAlert> {
        self.alerts.lock().clone()
    }
}

impl AlertPort for RecordingAlerts {
    fn record_alert(&self, title: &str, description: &str, severity: AlertSeverity) {
        self.alerts.lock().push(RecordedAlert {
            title: title.to_string(),
            description: description.to_string(),
            severity,
        });
    }
}
