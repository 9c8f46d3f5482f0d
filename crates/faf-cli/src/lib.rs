//! FAF CLI - scenario loading, reporting and the `faf-plan` binary.

pub mod config;
pub mod demo;
pub mod report;
pub mod scenario;

pub use config::Config;
pub use report::{summarize, TrajectoryReport};
pub use scenario::{Scenario, ScenarioFile};
