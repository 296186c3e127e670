//! Configuration loading and validation.
//!
//! Every section has a builder that starts from the defaults, overrides what
//! the file provides and rejects out-of-range values before anything runs.

use crate::domain::engine::SimulationConfig;
use crate::domain::error::AlgoTradeError;
use crate::domain::optimization::OptimizerSettings;
use crate::domain::risk::RiskSettings;
use crate::ports::config_port::ConfigPort;

/// Largest alert log a config file may ask for.
pub const MAX_CONFIGURED_ALERTS: i64 = 1_000;

/// Builds and validates every section; used by `validate` and at start-up.
pub fn validate_config(
    config: &dyn ConfigPort,
) -> Result<(SimulationConfig, OptimizerSettings, RiskSettings), AlgoTradeError> {
    Ok((
        build_simulation_config(config)?,
        build_optimizer_settings(config)?,
        build_risk_settings(config)?,
    ))
}

pub fn build_simulation_config(
    config: &dyn ConfigPort,
) -> Result<SimulationConfig, AlgoTradeError> {
    const S: &str = "simulation";
    let defaults = SimulationConfig::default();

    let quote_interval_ms =
        positive_int(config, S, "quote_interval_ms", defaults.quote_interval_ms as i64)?;
    let metrics_interval_ms =
        positive_int(config, S, "metrics_interval_ms", defaults.metrics_interval_ms as i64)?;
    let warning_delay_ms =
        non_negative_int(config, S, "warning_delay_ms", defaults.warning_delay_ms as i64)?;
    let history_window_ms =
        positive_int(config, S, "history_window_ms", defaults.history_window_ms)?;
    let max_alerts = positive_int(config, S, "max_alerts", defaults.max_alerts as i64)?;
    if max_alerts > MAX_CONFIGURED_ALERTS {
        return Err(AlgoTradeError::config_invalid(
            S,
            "max_alerts",
            format!("max_alerts must be at most {MAX_CONFIGURED_ALERTS}"),
        ));
    }

    let seed = match config.get_string(S, "seed").filter(|s| !s.trim().is_empty()) {
        None => None,
        Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
            AlgoTradeError::config_invalid(S, "seed", "seed must be a non-negative integer")
        })?),
    };

    let volatility = double(config, S, "volatility", defaults.volatility)?;
    if volatility <= 0.0 || volatility >= 1.0 {
        return Err(AlgoTradeError::config_invalid(
            S,
            "volatility",
            "volatility must be between 0 and 1",
        ));
    }
    let price_floor = double(config, S, "price_floor", defaults.price_floor)?;
    if price_floor <= 0.0 {
        return Err(AlgoTradeError::config_invalid(
            S,
            "price_floor",
            "price_floor must be positive",
        ));
    }

    let mut drift = defaults.drift;
    drift.pnl_bias = unit_interval(config, S, "pnl_bias", drift.pnl_bias)?;
    drift.pnl_scale = double(config, S, "pnl_scale", drift.pnl_scale)?;
    drift.win_rate_bias = unit_interval(config, S, "win_rate_bias", drift.win_rate_bias)?;
    drift.win_rate_scale = double(config, S, "win_rate_scale", drift.win_rate_scale)?;
    if drift.pnl_scale < 0.0 {
        return Err(AlgoTradeError::config_invalid(
            S,
            "pnl_scale",
            "pnl_scale must be non-negative",
        ));
    }
    if drift.win_rate_scale < 0.0 {
        return Err(AlgoTradeError::config_invalid(
            S,
            "win_rate_scale",
            "win_rate_scale must be non-negative",
        ));
    }

    Ok(SimulationConfig {
        quote_interval_ms: quote_interval_ms as u64,
        metrics_interval_ms: metrics_interval_ms as u64,
        warning_delay_ms: warning_delay_ms as u64,
        history_window_ms,
        max_alerts: max_alerts as usize,
        seed,
        volatility,
        price_floor,
        drift,
    })
}

pub fn build_optimizer_settings(
    config: &dyn ConfigPort,
) -> Result<OptimizerSettings, AlgoTradeError> {
    const S: &str = "optimizer";
    let defaults = OptimizerSettings::default();

    let endpoint = non_blank(config, S, "endpoint").unwrap_or(defaults.endpoint);
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(AlgoTradeError::config_invalid(
            S,
            "endpoint",
            "endpoint must be an http(s) URL",
        ));
    }
    let model = non_blank(config, S, "model").unwrap_or(defaults.model);
    let api_key_env = non_blank(config, S, "api_key_env").unwrap_or(defaults.api_key_env);
    let timeout_secs = positive_int(config, S, "timeout_secs", defaults.timeout_secs as i64)?;

    Ok(OptimizerSettings {
        endpoint: endpoint.trim_end_matches('/').to_string(),
        model,
        api_key_env,
        timeout_secs: timeout_secs as u64,
    })
}

pub fn build_risk_settings(config: &dyn ConfigPort) -> Result<RiskSettings, AlgoTradeError> {
    const S: &str = "risk";
    let defaults = RiskSettings::default();

    let leverage = positive_int(config, S, "leverage", defaults.leverage as i64)?;
    let settings = RiskSettings {
        stop_loss_percent: double(config, S, "stop_loss", defaults.stop_loss_percent)?,
        take_profit_percent: double(config, S, "take_profit", defaults.take_profit_percent)?,
        max_position_size_usd: double(
            config,
            S,
            "max_position_size",
            defaults.max_position_size_usd,
        )?,
        leverage: u32::try_from(leverage)
            .map_err(|_| AlgoTradeError::config_invalid(S, "leverage", "leverage out of range"))?,
    };

    settings.validate().map_err(|e| match e {
        AlgoTradeError::Validation(errors) => {
            let key = errors.errors.first().map(|e| e.field).unwrap_or(S);
            AlgoTradeError::config_invalid(S, key, errors.to_string())
        }
        other => other,
    })?;
    Ok(settings)
}

fn non_blank(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, AlgoTradeError> {
    config
        .get_int(section, key)
        .map(|v| v.unwrap_or(default))
        .map_err(|raw| {
            AlgoTradeError::config_invalid(section, key, format!("'{raw}' is not an integer"))
        })
}

fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, AlgoTradeError> {
    let value = int(config, section, key, default)?;
    if value <= 0 {
        return Err(AlgoTradeError::config_invalid(
            section,
            key,
            format!("{key} must be positive"),
        ));
    }
    Ok(value)
}

fn non_negative_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, AlgoTradeError> {
    let value = int(config, section, key, default)?;
    if value < 0 {
        return Err(AlgoTradeError::config_invalid(
            section,
            key,
            format!("{key} must be non-negative"),
        ));
    }
    Ok(value)
}

fn double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, AlgoTradeError> {
    let value = config
        .get_double(section, key)
        .map(|v| v.unwrap_or(default))
        .map_err(|raw| {
            AlgoTradeError::config_invalid(section, key, format!("'{raw}' is not a number"))
        })?;
    if !value.is_finite() {
        return Err(AlgoTradeError::config_invalid(
            section,
            key,
            format!("{key} must be finite"),
        ));
    }
    Ok(value)
}

fn unit_interval(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, AlgoTradeError> {
    let value = double(config, section, key, default)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(AlgoTradeError::config_invalid(
            section,
            key,
            format!("{key} must be between 0 and 1"),
        ));
    }
    Ok(value)
}
