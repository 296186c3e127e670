//! Parameter-optimization request and result types.
//!
//! Raw form input arrives as an [`OptimizationForm`]; the only way to obtain an
//! [`OptimizationRequest`] is [`OptimizationForm::validate`], so nothing that
//! talks to the optimizer can see unvalidated input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{AlgoTradeError, ValidationErrors};

pub const MIN_MARKET_DATA_CHARS: usize = 50;

/// Sample market data used when the caller supplies none.
pub const SAMPLE_MARKET_DATA: &str = "Recent AAPL prices: 170.10, 170.15, 170.05, 170.20, 170.25. Volume: 1.2M shares.
Recent MSFT prices: 420.50, 420.60, 420.40, 420.70, 420.75. Volume: 800K shares.
Market sentiment: Neutral. VIX: 15. Key economic indicators: CPI 0.3% MoM, Unemployment 3.8%.
Correlations: AAPL-MSFT: 0.65, AAPL-SPY: 0.80.
Moving Averages (AAPL, 20-day): 168.50. Volatility (AAPL, 30-day historical): 25%.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmType {
    MovingAverageCrossover,
    VolatilityBreakout,
    RsiDivergence,
    MeanReversion,
}

impl AlgorithmType {
    pub const ALL: [AlgorithmType; 4] = [
        AlgorithmType::MovingAverageCrossover,
        AlgorithmType::VolatilityBreakout,
        AlgorithmType::RsiDivergence,
        AlgorithmType::MeanReversion,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AlgorithmType::MovingAverageCrossover => "moving-average-crossover",
            AlgorithmType::VolatilityBreakout => "volatility-breakout",
            AlgorithmType::RsiDivergence => "rsi-divergence",
            AlgorithmType::MeanReversion => "mean-reversion",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlgorithmType::MovingAverageCrossover => "Moving Average Crossover",
            AlgorithmType::VolatilityBreakout => "Volatility Breakout",
            AlgorithmType::RsiDivergence => "RSI Divergence",
            AlgorithmType::MeanReversion => "Mean Reversion",
        }
    }
}

impl FromStr for AlgorithmType {
    type Err = String;

    /// Accepts the kebab-case key or the camelCase form value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "moving-average-crossover" | "movingAverageCrossover" => {
                Ok(AlgorithmType::MovingAverageCrossover)
            }
            "volatility-breakout" | "volatilityBreakout" => Ok(AlgorithmType::VolatilityBreakout),
            "rsi-divergence" | "rsiDivergence" => Ok(AlgorithmType::RsiDivergence),
            "mean-reversion" | "meanReversion" => Ok(AlgorithmType::MeanReversion),
            other => Err(format!("unknown algorithm type '{other}'")),
        }
    }
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    pub fn key(self) -> &'static str {
        match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskTolerance::Low),
            "medium" => Ok(RiskTolerance::Medium),
            "high" => Ok(RiskTolerance::High),
            other => Err(format!("unknown risk tolerance '{other}'")),
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unvalidated form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OptimizationForm {
    pub market_data: String,
    pub algorithm_type: String,
    pub risk_tolerance: String,
}

impl OptimizationForm {
    pub fn validate(&self) -> Result<OptimizationRequest, AlgoTradeError> {
        let mut errors = ValidationErrors::new();

        if self.market_data.chars().count() < MIN_MARKET_DATA_CHARS {
            errors.push(
                "market_data",
                format!(
                    "Market data must be at least {MIN_MARKET_DATA_CHARS} characters long. Please provide detailed data."
                ),
            );
        }

        let algorithm = if self.algorithm_type.trim().is_empty() {
            errors.push("algorithm_type", "Algorithm type is required.");
            None
        } else {
            match self.algorithm_type.parse::<AlgorithmType>() {
                Ok(a) => Some(a),
                Err(e) => {
                    errors.push("algorithm_type", e);
                    None
                }
            }
        };

        let risk = if self.risk_tolerance.trim().is_empty() {
            errors.push("risk_tolerance", "Risk tolerance is required.");
            None
        } else {
            match self.risk_tolerance.parse::<RiskTolerance>() {
                Ok(r) => Some(r),
                Err(e) => {
                    errors.push("risk_tolerance", e);
                    None
                }
            }
        };

        match (algorithm, risk) {
            (Some(algorithm_type), Some(risk_tolerance)) if errors.is_empty() => {
                Ok(OptimizationRequest {
                    market_data: self.market_data.clone(),
                    algorithm_type,
                    risk_tolerance,
                })
            }
            _ => Err(AlgoTradeError::Validation(errors)),
        }
    }
}

/// A request that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizationRequest {
    market_data: String,
    algorithm_type: AlgorithmType,
    risk_tolerance: RiskTolerance,
}

impl OptimizationRequest {
    pub fn market_data(&self) -> &str {
        &self.market_data
    }

    pub fn algorithm_type(&self) -> AlgorithmType {
        self.algorithm_type
    }

    pub fn risk_tolerance(&self) -> RiskTolerance {
        self.risk_tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimal_parameters: String,
    pub backtesting_results: String,
    pub analysis_summary: String,
}

/// Where and how to reach the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerSettings {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        OptimizerSettings {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}
