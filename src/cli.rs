use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::info;

use crate::api::{self, ApiContext};
use crate::client::{HttpProjectionClient, ProjectionService};
use crate::config::EngineConfig;
use crate::core::{
    Composer, FiSnapshot, ScenarioState, SolverConfig, coast_number, progress_percent,
    required_monthly_contribution, scenario_checksum, years_to_target,
};
use crate::monte_carlo::MonteCarloController;

#[derive(Parser, Debug)]
#[command(
    name = "fire-scenario",
    about = "What-If scenario engine for FIRE projections (effective requests, FI solver, projection service client)"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Engine config file (TOML)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the local scenario API over HTTP.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, help = "Year ages are measured against, defaults to the current year")]
        year: Option<i32>,
    },
    /// Print the effective projection request and local FI figures.
    Compose {
        #[arg(long, help = "Scenario state as JSON")]
        scenario: PathBuf,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Closed-form FI questions.
    Solve {
        #[command(subcommand)]
        question: SolveCommand,
    },
    /// Send the effective request to the projection service.
    Project {
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Run a Monte Carlo simulation through the projection service.
    MonteCarlo {
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long, help = "Iteration count, one of the configured menu")]
        iterations: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand, Debug)]
enum SolveCommand {
    /// Years until the target balance is reached.
    Years {
        #[arg(long, default_value_t = 0.0)]
        assets: f64,
        #[arg(long)]
        monthly_contribution: f64,
        #[arg(long)]
        target: f64,
        #[arg(long, help = "Expected annual real return in percent, e.g. 5")]
        rate: f64,
    },
    /// Monthly contribution needed to reach the target in a number of years.
    Required {
        #[arg(long, default_value_t = 0.0)]
        assets: f64,
        #[arg(long)]
        target: f64,
        #[arg(long)]
        years: f64,
        #[arg(long, help = "Expected annual real return in percent, e.g. 5")]
        rate: f64,
    },
    /// Assets that grow into the target with no further contributions.
    Coast {
        #[arg(long)]
        target: f64,
        #[arg(long)]
        years: f64,
        #[arg(long, help = "Expected annual real return in percent, e.g. 5")]
        rate: f64,
        #[arg(long, help = "Current assets, to report Coast progress")]
        assets: Option<f64>,
    },
}

pub async fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port, year } => {
            let ctx = ApiContext {
                as_of_year: resolve_year(year),
                solver: config.solver,
            };
            api::run_http_server(port, ctx)
                .await
                .map_err(|e| format!("Server error: {e}"))
        }
        Command::Compose { scenario, year } => {
            let scenario = load_scenario(&scenario)?;
            print_json(&compose_output(&scenario, resolve_year(year), &config.solver)?)
        }
        Command::Solve { question } => print_json(&solve(&question, &config.solver)?),
        Command::Project { scenario, year } => {
            let scenario = load_scenario(&scenario)?;
            let composer = Composer::new(resolve_year(year));
            let request = composer
                .compose_state(&scenario)
                .ok_or_else(|| "scenario has no plan".to_string())?;
            let client = HttpProjectionClient::new(&config.service);
            info!(url = %config.service.projection_url(), "requesting projection");
            let projection = client
                .project(&request)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&json!({ "request": request, "projection": projection }))
        }
        Command::MonteCarlo {
            scenario,
            iterations,
            year,
        } => {
            let scenario = load_scenario(&scenario)?;
            let client = Arc::new(HttpProjectionClient::new(&config.service));
            let controller = MonteCarloController::new(client, &config.monte_carlo);
            let iterations = iterations.unwrap_or(controller.default_iterations());
            let result = controller
                .run(&Composer::new(resolve_year(year)), &scenario, iterations)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&result)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    match path {
        Some(path) => EngineConfig::load(path).map_err(|e| e.to_string()),
        None => Ok(EngineConfig::default()),
    }
}

fn load_scenario(path: &Path) -> Result<ScenarioState, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read scenario {}: {e}", path.display()))?;
    parse_scenario(&text)
}

fn parse_scenario(text: &str) -> Result<ScenarioState, String> {
    serde_json::from_str(text).map_err(|e| format!("Invalid scenario JSON: {e}"))
}

fn resolve_year(year: Option<i32>) -> i32 {
    year.unwrap_or_else(|| Utc::now().year())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn compose_output(
    scenario: &ScenarioState,
    as_of_year: i32,
    solver: &SolverConfig,
) -> Result<Value, String> {
    let request = Composer::new(as_of_year)
        .compose_state(scenario)
        .ok_or_else(|| "scenario has no plan".to_string())?;
    let checksum = scenario_checksum(scenario).ok_or_else(|| "scenario has no plan".to_string())?;
    let fi = FiSnapshot::compute(&request, &scenario.assets, solver);
    Ok(json!({ "checksum": checksum, "request": request, "fi": fi }))
}

fn solve(question: &SolveCommand, solver: &SolverConfig) -> Result<Value, String> {
    match *question {
        SolveCommand::Years {
            assets,
            monthly_contribution,
            target,
            rate,
        } => {
            if target <= 0.0 {
                return Err("--target must be > 0".to_string());
            }
            if assets < 0.0 {
                return Err("--assets must be >= 0".to_string());
            }
            let years = years_to_target(
                assets,
                monthly_contribution * 12.0,
                target,
                rate / 100.0,
                solver,
            );
            Ok(json!({ "years": years }))
        }
        SolveCommand::Required {
            assets,
            target,
            years,
            rate,
        } => {
            if years <= 0.0 {
                return Err("--years must be > 0".to_string());
            }
            let monthly = required_monthly_contribution(assets, target, years, rate / 100.0);
            Ok(json!({ "monthlyContribution": monthly }))
        }
        SolveCommand::Coast {
            target,
            years,
            rate,
            assets,
        } => {
            if years < 0.0 {
                return Err("--years must be >= 0".to_string());
            }
            let coast = coast_number(target, years, rate / 100.0);
            let progress = coast.zip(assets).and_then(|(coast, assets)| progress_percent(assets, coast));
            Ok(json!({
                "coastNumber": coast,
                "progress": progress,
                "isCoastFi": progress.is_some_and(|p| p >= 100.0),
            }))
        }
    }
}
