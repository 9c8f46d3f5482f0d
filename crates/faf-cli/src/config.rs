//! CLI configuration from environment.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use faf_core::{PlanMode, PlannerConfig};

pub const DEFAULT_LOG_FILTER: &str = "faf_core=info,faf_cli=info";

#[derive(Debug, Clone)]
pub struct Config {
    /// Scenario used when none is given on the command line.
    pub scenario_path: Option<PathBuf>,
    /// JSON file overriding planner constants.
    pub planner_config_path: Option<PathBuf>,
    pub log_filter: String,
    pub mode: PlanMode,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            scenario_path: env::var_os("FAF_SCENARIO").map(PathBuf::from),
            planner_config_path: env::var_os("FAF_PLANNER_CONFIG").map(PathBuf::from),
            log_filter: env::var("FAF_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
            mode: env::var("FAF_MODE")
                .ok()
                .and_then(|s| parse_mode(&s))
                .unwrap_or_default(),
        }
    }

    /// Planner constants from the configured file, or the defaults.
    pub fn planner_config(&self) -> Result<PlannerConfig> {
        match &self.planner_config_path {
            Some(path) => load_planner_config(path),
            None => Ok(PlannerConfig::default()),
        }
    }
}

/// Accepts `progressive`, `progressive-alignment`, `tangent` and `tangent-arc`.
pub fn parse_mode(value: &str) -> Option<PlanMode> {
    match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "progressive" | "progressive-alignment" | "aligned" => Some(PlanMode::ProgressiveAlignment),
        "tangent" | "tangent-arc" | "realistic" => Some(PlanMode::TangentArc),
        _ => None,
    }
}

pub fn load_planner_config(path: &Path) -> Result<PlannerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read planner config {}", path.display()))?;
    PlannerConfig::from_json(&text)
        .with_context(|| format!("invalid planner config {}", path.display()))
}
