//! Plan final approach trajectories from scenario files.
//!
//! Usage:
//!   faf-plan plan scenario.json --mode tangent-arc --output trajectory.json
//!   faf-plan demo

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faf_cli::config::{load_planner_config, parse_mode};
use faf_cli::demo::demo_scenarios;
use faf_cli::{summarize, Config, Scenario, TrajectoryReport};
use faf_core::{PlanError, PlanMode, PlannerConfig, Trajectory};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Final approach fix trajectory planner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a single scenario file
    Plan {
        /// Scenario JSON (defaults to FAF_SCENARIO)
        scenario: Option<PathBuf>,

        /// progressive | tangent-arc (defaults to FAF_MODE)
        #[arg(long, value_parser = mode_arg)]
        mode: Option<PlanMode>,

        /// Planner constants JSON (defaults to FAF_PLANNER_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the trajectory report here
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the built-in demonstration scenarios
    Demo {
        #[arg(long, value_parser = mode_arg)]
        mode: Option<PlanMode>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn mode_arg(value: &str) -> Result<PlanMode, String> {
    parse_mode(value).ok_or_else(|| format!("unknown mode '{value}', expected progressive or tangent-arc"))
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .with_context(|| format!("invalid log filter '{}'", config.log_filter))?,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

fn planner_config(config: &Config, path: Option<PathBuf>) -> Result<PlannerConfig> {
    match path {
        Some(path) => load_planner_config(&path),
        None => config.planner_config(),
    }
}

/// Print the outcome; `false` when planning produced no trajectory.
fn report_outcome(name: &str, outcome: &std::result::Result<Trajectory, PlanError>) -> bool {
    match outcome {
        Ok(trajectory) => {
            println!("{name}");
            print!("{}", summarize(trajectory));
            true
        }
        Err(PlanError::UnreachableSafely { margins, .. }) => {
            eprintln!("{name}: no valid trajectory (safety margins tried: {margins:?} km)");
            false
        }
        Err(err) => {
            eprintln!("{name}: {err}");
            false
        }
    }
}

fn run_plan(
    config: &Config,
    scenario: Option<PathBuf>,
    mode: Option<PlanMode>,
    planner_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<bool> {
    let path = scenario
        .or_else(|| config.scenario_path.clone())
        .context("no scenario given (pass a path or set FAF_SCENARIO)")?;
    let scenario = Scenario::load(&path)?;
    tracing::debug!(path = %path.display(), obstacles = scenario.obstacles.len(), "scenario loaded");
    let planner = planner_config(config, planner_path)?;
    let mode = mode.unwrap_or(config.mode);

    let outcome = mode.plan(
        &scenario.aircraft,
        &scenario.environment,
        &scenario.obstacles,
        &planner,
    );
    let ok = report_outcome(&scenario.name, &outcome);

    if let (Ok(trajectory), Some(output)) = (outcome, output) {
        TrajectoryReport::new(&scenario.name, trajectory).write(&output)?;
        tracing::info!(path = %output.display(), "trajectory report written");
    }
    Ok(ok)
}

fn run_demo(config: &Config, mode: Option<PlanMode>, planner_path: Option<PathBuf>) -> Result<bool> {
    let planner = planner_config(config, planner_path)?;
    let mode = mode.unwrap_or(config.mode);

    let mut all_ok = true;
    for (index, scenario) in demo_scenarios().iter().enumerate() {
        let outcome = mode.plan(
            &scenario.aircraft,
            &scenario.environment,
            &scenario.obstacles,
            &planner,
        );
        let name = format!("[{}] {}", index + 1, scenario.name);
        all_ok &= report_outcome(&name, &outcome);
        println!();
    }
    Ok(all_ok)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(&config)?;

    let ok = match args.command {
        Command::Plan {
            scenario,
            mode,
            config: planner_path,
            output,
        } => run_plan(&config, scenario, mode, planner_path, output)?,
        Command::Demo {
            mode,
            config: planner_path,
        } => run_demo(&config, mode, planner_path)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
