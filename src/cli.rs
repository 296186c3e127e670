//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::clock::SystemClock;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_dashboard;
use crate::domain::config_validation::{
    build_risk_settings, build_simulation_config, validate_config,
};
use crate::domain::engine::{EngineSnapshot, SimulationConfig};
use crate::domain::error::AlgoTradeError;
use crate::domain::optimization::SAMPLE_MARKET_DATA;
use crate::domain::risk::RiskSettings;
use crate::runtime::session::SimulationSession;

#[derive(Parser, Debug)]
#[command(name = "algotrade", about = "Synthetic trading-insights console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a live simulation session and print the dashboard
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        duration_secs: Option<u64>,
        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Ask the optimizer for algorithm parameter suggestions
    Optimize {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        market_data_file: Option<PathBuf>,
        #[arg(long, default_value = "moving-average-crossover")]
        algorithm: String,
        #[arg(long, default_value = "medium")]
        risk: String,
    },
    /// Validate and save risk-management settings
    Risk {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        stop_loss: Option<f64>,
        #[arg(long)]
        take_profit: Option<f64>,
        #[arg(long)]
        max_position: Option<f64>,
        #[arg(long)]
        leverage: Option<u32>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line overrides for the `[risk]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskOverrides {
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub max_position: Option<f64>,
    pub leverage: Option<u32>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            duration_secs,
            json,
        } => run_session(config.as_ref(), duration_secs, json),
        Command::Optimize {
            config,
            market_data_file,
            algorithm,
            risk,
        } => run_optimize(config.as_ref(), market_data_file.as_ref(), algorithm, risk),
        Command::Risk {
            config,
            stop_loss,
            take_profit,
            max_position,
            leverage,
        } => run_risk(
            config.as_ref(),
            RiskOverrides {
                stop_loss,
                take_profit,
                max_position,
                leverage,
            },
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = AlgoTradeError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Loads `path` when given, otherwise an empty config that yields defaults.
pub fn load_optional_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => load_config(p),
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn report(err: AlgoTradeError) -> ExitCode {
    match &err {
        AlgoTradeError::Validation(errors) => {
            for field in &errors.errors {
                eprintln!("error: {field}");
            }
        }
        other => eprintln!("error: {other}"),
    }
    (&err).into()
}

fn build_runtime() -> Result<tokio::runtime::Runtime, ExitCode> {
    tokio::runtime::Runtime::new().map_err(|e| report(AlgoTradeError::Io(e)))
}

pub fn render_snapshot(snapshot: &EngineSnapshot, json: bool) -> String {
    if json {
        serde_json::to_string(snapshot).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    } else {
        text_dashboard::render(snapshot)
    }
}

fn run_session(config_path: Option<&PathBuf>, duration_secs: Option<u64>, json: bool) -> ExitCode {
    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let sim_config: SimulationConfig = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report(e),
    };
    let runtime = match build_runtime() {
        Ok(r) => r,
        Err(code) => return code,
    };

    runtime.block_on(async move {
        let refresh_every = Duration::from_millis(sim_config.quote_interval_ms);
        let mut session = SimulationSession::start(sim_config, Arc::new(SystemClock));
        let mut refresh = tokio::time::interval(refresh_every);

        let deadline = async {
            match duration_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = refresh.tick() => {
                    println!("{}", render_snapshot(&session.snapshot(), json));
                }
                _ = &mut deadline => break,
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        session.shutdown();
        println!("{}", render_snapshot(&session.snapshot(), json));
    });

    ExitCode::SUCCESS
}

fn run_optimize(
    config_path: Option<&PathBuf>,
    market_data_file: Option<&PathBuf>,
    algorithm: String,
    risk: String,
) -> ExitCode {
    let market_data = match market_data_file {
        Some(path) => match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => return report(AlgoTradeError::Io(e)),
        },
        None => SAMPLE_MARKET_DATA.to_string(),
    };
    let form = crate::domain::optimization::OptimizationForm {
        market_data,
        algorithm_type: algorithm,
        risk_tolerance: risk,
    };

    // Reject bad input before touching config, env or network.
    if let Err(e) = form.validate() {
        return report(e);
    }

    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    #[cfg(feature = "gemini")]
    {
        use crate::adapters::gemini_optimizer::GeminiOptimizer;
        use crate::domain::config_validation::build_optimizer_settings;
        use crate::runtime::desk::OptimizationDesk;

        let sim_config = match build_simulation_config(&adapter) {
            Ok(c) => c,
            Err(e) => return report(e),
        };
        let settings = match build_optimizer_settings(&adapter) {
            Ok(s) => s,
            Err(e) => return report(e),
        };
        let optimizer = match GeminiOptimizer::from_env(settings) {
            Ok(o) => o,
            Err(e) => return report(e),
        };
        let runtime = match build_runtime() {
            Ok(r) => r,
            Err(code) => return code,
        };

        runtime.block_on(async move {
            let mut session = SimulationSession::start(sim_config, Arc::new(SystemClock));
            let desk = OptimizationDesk::new(Arc::new(optimizer), Arc::new(session.handle()));
            let outcome = desk.submit(&form).await;
            session.shutdown();

            match outcome {
                Ok(result) => {
                    println!("Optimal parameters:\n{}\n", result.optimal_parameters);
                    println!("Backtesting results:\n{}\n", result.backtesting_results);
                    println!("Analysis summary:\n{}", result.analysis_summary);
                    ExitCode::SUCCESS
                }
                Err(e) => report(e),
            }
        })
    }

    #[cfg(not(feature = "gemini"))]
    {
        let _ = (adapter, form);
        eprintln!("error: gemini feature is required for optimize");
        ExitCode::from(1)
    }
}

pub fn apply_risk_overrides(base: RiskSettings, overrides: RiskOverrides) -> RiskSettings {
    RiskSettings {
        stop_loss_percent: overrides.stop_loss.unwrap_or(base.stop_loss_percent),
        take_profit_percent: overrides.take_profit.unwrap_or(base.take_profit_percent),
        max_position_size_usd: overrides.max_position.unwrap_or(base.max_position_size_usd),
        leverage: overrides.leverage.unwrap_or(base.leverage),
    }
}

/// Saves `settings` through a fresh session and returns the resulting state,
/// including the confirmation alert. Must run inside a Tokio runtime.
pub async fn save_risk_settings(
    sim_config: SimulationConfig,
    settings: RiskSettings,
) -> Result<EngineSnapshot, AlgoTradeError> {
    let mut session = SimulationSession::start(sim_config, Arc::new(SystemClock));
    let saved = session.save_risk_settings(settings);
    session.shutdown();
    saved.map(|()| session.snapshot())
}

fn run_risk(config_path: Option<&PathBuf>, overrides: RiskOverrides) -> ExitCode {
    let adapter = match load_optional_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let sim_config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report(e),
    };
    let base = match build_risk_settings(&adapter) {
        Ok(r) => r,
        Err(e) => return report(e),
    };
    let runtime = match build_runtime() {
        Ok(r) => r,
        Err(code) => return code,
    };

    let settings = apply_risk_overrides(base, overrides);
    let snapshot = match runtime.block_on(save_risk_settings(sim_config, settings)) {
        Ok(s) => s,
        Err(e) => return report(e),
    };

    println!("Stop loss:         {:.1}%", settings.stop_loss_percent);
    println!("Take profit:       {:.1}%", settings.take_profit_percent);
    println!("Max position size: ${:.2}", settings.max_position_size_usd);
    println!("Leverage:          {}x", settings.leverage);
    if let Some(alert) = snapshot.alerts.first() {
        println!("\n{}", text_dashboard::render_alerts(std::slice::from_ref(alert)).trim_end());
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_config(&adapter) {
        Ok((sim, optimizer, _risk)) => {
            println!("Configuration is valid.");
            println!(
                "  quotes every {} ms, metrics every {} ms, warning after {} ms",
                sim.quote_interval_ms, sim.metrics_interval_ms, sim.warning_delay_ms
            );
            println!("  optimizer model {} at {}", optimizer.model, optimizer.endpoint);
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}
