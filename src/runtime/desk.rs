//! Coordinates parameter-optimization requests.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::alert::AlertSeverity;
use crate::domain::error::AlgoTradeError;
use crate::domain::optimization::{OptimizationForm, OptimizationResult};
use crate::ports::alert_port::AlertPort;
use crate::ports::optimizer_port::OptimizerPort;

pub const COMPLETE_TITLE: &str = "Optimization Complete";
pub const COMPLETE_DESCRIPTION: &str = "AI has generated new parameter recommendations.";
pub const FAILED_TITLE: &str = "Optimization Failed";
pub const FAILED_DESCRIPTION: &str = "An error occurred while optimizing parameters.";

/// Holds at most one in-flight request and the last successful result.
pub struct OptimizationDesk {
    optimizer: Arc<dyn OptimizerPort>,
    alerts: Arc<dyn AlertPort>,
    pending: AtomicBool,
    latest: Mutex<Option<OptimizationResult>>,
}

struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard(flag))
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl OptimizationDesk {
    pub fn new(optimizer: Arc<dyn OptimizerPort>, alerts: Arc<dyn AlertPort>) -> Self {
        Self {
            optimizer,
            alerts,
            pending: AtomicBool::new(false),
            latest: Mutex::new(None),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn latest(&self) -> Option<OptimizationResult> {
        self.latest.lock().clone()
    }

    /// Validates `form`, then makes exactly one optimizer call.
    ///
    /// Invalid input never reaches the optimizer. A second submission while one
    /// is in flight is rejected with [`AlgoTradeError::RequestPending`]. On
    /// failure the previous result is kept.
    pub async fn submit(
        &self,
        form: &OptimizationForm,
    ) -> Result<OptimizationResult, AlgoTradeError> {
        let request = form.validate()?;
        let _pending =
            PendingGuard::acquire(&self.pending).ok_or(AlgoTradeError::RequestPending)?;

        tracing::info!(
            algorithm = %request.algorithm_type(),
            risk = %request.risk_tolerance(),
            "optimization requested"
        );

        match self.optimizer.optimize(&request).await {
            Ok(result) => {
                tracing::info!("optimization completed");
                *self.latest.lock() = Some(result.clone());
                self.alerts
                    .record_alert(COMPLETE_TITLE, COMPLETE_DESCRIPTION, AlertSeverity::Normal);
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "optimization failed");
                self.alerts
                    .record_alert(FAILED_TITLE, FAILED_DESCRIPTION, AlertSeverity::Destructive);
                Err(e)
            }
        }
    }
}
