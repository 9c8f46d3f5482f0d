//! Error types for the planning engine.

use thiserror::Error;

use crate::models::{Attempt, Point3};

/// Input that violates the planning contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("speed must be positive, got {0} km/h")]
    InvalidSpeed(f64),

    #[error("bank angle must lie in (0, 90) degrees, got {0}")]
    InvalidBankAngle(f64),

    #[error("slope limits must be non-zero (climb {climb}, descent {descent})")]
    InvalidSlopeLimits { climb: f64, descent: f64 },

    #[error("environment dimensions must be positive, got {0}")]
    InvalidEnvironmentSize(f64),

    #[error("{what} at ({:.3}, {:.3}, {:.3}) lies outside the airspace", .position.x, .position.y, .position.z)]
    OutOfBounds { what: &'static str, position: Point3 },

    #[error("obstacle radius must be positive, got {0}")]
    InvalidObstacleRadius(f64),

    #[error("obstacle height {height} outside (0, {ceiling}]")]
    InvalidObstacleHeight { height: f64, ceiling: f64 },

    #[error("planner config: {0}")]
    InvalidConfig(String),
}

/// Interception geometry failures, recovered inside the planner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    #[error("turn circle never meets the runway axis (discriminant {discriminant:.4})")]
    NoTangentSolution { discriminant: f64 },

    #[error("airport and FAF coincide, no runway axis")]
    NoRunwayAxis,
}

/// Terminal planning failures surfaced to callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid scenario: {0}")]
    InvalidScenario(#[from] ScenarioError),

    #[error("no valid trajectory: every safety margin {margins:?} km still collides")]
    UnreachableSafely {
        margins: Vec<f64>,
        attempts: Vec<Attempt>,
    },
}

pub type Result<T> = std::result::Result<T, PlanError>;
