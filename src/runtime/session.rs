//! A running simulation: the engine plus the tasks that tick it.
//!
//! All mutation goes through one write lock, taken once per tick, so readers
//! never observe half of a tick. The quote and metrics timers and the one-shot
//! connectivity warning are spawned on the current Tokio runtime and aborted
//! together by [`SimulationSession::shutdown`] or on drop.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::domain::alert::AlertSeverity;
use crate::domain::engine::{EngineSnapshot, SimulationConfig, SimulationEngine};
use crate::domain::error::AlgoTradeError;
use crate::domain::risk::RiskSettings;
use crate::ports::alert_port::AlertPort;
use crate::ports::clock_port::Clock;

pub const RISK_SAVED_TITLE: &str = "Settings Saved (Simulated)";
pub const RISK_SAVED_DESCRIPTION: &str = "Risk management parameters have been updated.";

/// Cloneable access to a session's state for collaborators.
#[derive(Clone)]
pub struct EngineHandle {
    engine: Arc<RwLock<SimulationEngine>>,
    risk: Arc<RwLock<RiskSettings>>,
}

impl EngineHandle {
    pub fn snapshot(&self) -> EngineSnapshot {
        self.engine.read().current_state()
    }

    pub fn record_alert(&self, title: &str, description: &str, severity: AlertSeverity) {
        self.engine.write().record_alert(title, description, severity);
    }

    pub fn risk_settings(&self) -> RiskSettings {
        *self.risk.read()
    }

    /// Stores validated settings and confirms with an alert.
    pub fn save_risk_settings(&self, settings: RiskSettings) -> Result<(), AlgoTradeError> {
        settings.validate()?;
        tracing::info!(?settings, "risk settings saved");
        *self.risk.write() = settings;
        self.record_alert(RISK_SAVED_TITLE, RISK_SAVED_DESCRIPTION, AlertSeverity::Normal);
        Ok(())
    }
}

impl AlertPort for EngineHandle {
    fn record_alert(&self, title: &str, description: &str, severity: AlertSeverity) {
        EngineHandle::record_alert(self, title, description, severity);
    }
}

pub struct SimulationSession {
    handle: EngineHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl SimulationSession {
    /// Initializes an engine and starts its timers. Must be called from
    /// within a Tokio runtime.
    pub fn start(config: SimulationConfig, clock: Arc<dyn Clock>) -> Self {
        let engine = SimulationEngine::initialize(config, clock);
        Self::start_with(engine, RiskSettings::default())
    }

    pub fn start_with(engine: SimulationEngine, risk: RiskSettings) -> Self {
        let config = engine.config().clone();
        let handle = EngineHandle {
            engine: Arc::new(RwLock::new(engine)),
            risk: Arc::new(RwLock::new(risk)),
        };

        let tasks = vec![
            spawn_repeating(
                handle.engine.clone(),
                Duration::from_millis(config.quote_interval_ms),
                SimulationEngine::tick_quotes,
            ),
            spawn_repeating(
                handle.engine.clone(),
                Duration::from_millis(config.metrics_interval_ms),
                SimulationEngine::tick_metrics,
            ),
            spawn_delayed(
                handle.engine.clone(),
                Duration::from_millis(config.warning_delay_ms),
                SimulationEngine::record_connectivity_warning,
            ),
        ];

        tracing::info!(
            quote_interval_ms = config.quote_interval_ms,
            metrics_interval_ms = config.metrics_interval_ms,
            "simulation session started"
        );
        Self { handle, tasks }
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.handle.snapshot()
    }

    pub fn record_alert(&self, title: &str, description: &str, severity: AlertSeverity) {
        self.handle.record_alert(title, description, severity);
    }

    pub fn save_risk_settings(&self, settings: RiskSettings) -> Result<(), AlgoTradeError> {
        self.handle.save_risk_settings(settings)
    }

    pub fn risk_settings(&self) -> RiskSettings {
        self.handle.risk_settings()
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Stops both timers and cancels the warning if it has not fired yet.
    /// State stays readable afterwards.
    pub fn shutdown(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        tracing::info!("simulation session stopped");
    }
}

impl Drop for SimulationSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// First firing is one full period after start.
fn spawn_repeating(
    engine: Arc<RwLock<SimulationEngine>>,
    period: Duration,
    tick: fn(&mut SimulationEngine),
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            tick(&mut engine.write());
        }
    })
}

fn spawn_delayed(
    engine: Arc<RwLock<SimulationEngine>>,
    delay: Duration,
    effect: fn(&mut SimulationEngine),
) -> JoinHandle<()> {
    tokio::spawn(async move {
        time::sleep(delay).await;
        effect(&mut engine.write());
    })
}
