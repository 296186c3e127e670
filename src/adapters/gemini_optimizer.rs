//! Optimizer adapter backed by a Gemini `generateContent` endpoint.
//!
//! The prompt asks for a JSON object matching [`OptimizationResult`], and the
//! request pins that shape with a response schema. One attempt per request;
//! every transport, status or decode failure becomes
//! [`AlgoTradeError::Optimizer`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::domain::error::AlgoTradeError;
use crate::domain::optimization::{OptimizationRequest, OptimizationResult, OptimizerSettings};
use crate::ports::optimizer_port::OptimizerPort;

const MAX_ERROR_BODY_CHARS: usize = 200;

pub struct GeminiOptimizer {
    client: reqwest::Client,
    settings: OptimizerSettings,
    api_key: String,
}

impl GeminiOptimizer {
    pub fn new(
        settings: OptimizerSettings,
        api_key: impl Into<String>,
    ) -> Result<Self, AlgoTradeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AlgoTradeError::optimizer(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            settings,
            api_key: api_key.into(),
        })
    }

    /// Reads the API key from the environment variable named in `settings`.
    pub fn from_env(settings: OptimizerSettings) -> Result<Self, AlgoTradeError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AlgoTradeError::ConfigMissing {
                section: "optimizer".to_string(),
                key: settings.api_key_env.clone(),
            })?;
        Self::new(settings, api_key)
    }

    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint, self.settings.model
        )
    }
}

#[async_trait]
impl OptimizerPort for GeminiOptimizer {
    async fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResult, AlgoTradeError> {
        tracing::debug!(
            url = %self.url(),
            algorithm = %request.algorithm_type(),
            "sending optimization request"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| AlgoTradeError::optimizer(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AlgoTradeError::optimizer(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(AlgoTradeError::optimizer(format!("HTTP {status}: {excerpt}")));
        }

        parse_response(&body)
    }
}

pub fn render_prompt(request: &OptimizationRequest) -> String {
    format!(
        "You are an AI trading assistant specializing in optimizing trading algorithm parameters.

You will receive real-time market data and the type of trading algorithm to optimize. Based on this information, you will recommend optimal parameters for the algorithm and provide backtesting results.

Market Data: {market_data}
Algorithm Type: {algorithm}
Risk Tolerance: {risk}

Consider the following factors in your analysis:
- Moving averages
- Volatility
- Correlations

Provide the optimal parameters and backtesting results in a clear and concise format.
Respond with a JSON object with the string fields optimalParameters, backtestingResults and analysisSummary.
",
        market_data = request.market_data(),
        algorithm = request.algorithm_type().label(),
        risk = request.risk_tolerance().key(),
    )
}

pub fn request_body(request: &OptimizationRequest) -> serde_json::Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": render_prompt(request) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "optimalParameters": { "type": "STRING" },
                    "backtestingResults": { "type": "STRING" },
                    "analysisSummary": { "type": "STRING" }
                },
                "required": ["optimalParameters", "backtestingResults", "analysisSummary"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extracts the structured result from a `generateContent` response body.
pub fn parse_response(body: &str) -> Result<OptimizationResult, AlgoTradeError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| AlgoTradeError::optimizer(format!("malformed response: {e}")))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .filter(|t: &String| !t.trim().is_empty())
        .ok_or_else(|| AlgoTradeError::optimizer("response contained no output"))?;

    let result: OptimizationResult = serde_json::from_str(strip_code_fence(&text))
        .map_err(|e| AlgoTradeError::optimizer(format!("output did not match schema: {e}")))?;

    if result.optimal_parameters.trim().is_empty()
        || result.backtesting_results.trim().is_empty()
        || result.analysis_summary.trim().is_empty()
    {
        return Err(AlgoTradeError::optimizer("output is missing required fields"));
    }
    Ok(result)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}
