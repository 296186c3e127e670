//! Parameter-optimization port trait.

use async_trait::async_trait;

use crate::domain::error::AlgoTradeError;
use crate::domain::optimization::{OptimizationRequest, OptimizationResult};

/// A stateless request/response service that suggests algorithm parameters.
///
/// Implementations receive requests that have already passed validation and
/// must not retry on failure.
#[async_trait]
pub trait OptimizerPort: Send + Sync {
    async fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResult, AlgoTradeError>;
}
