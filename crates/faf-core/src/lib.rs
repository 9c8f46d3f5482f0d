pub mod alignment;
pub mod avoidance;
pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod kinematics;
pub mod models;
pub mod planner;
pub mod profile;
pub mod stitcher;

pub use alignment::{ApproachAxis, ProgressiveIntercept, TangentArc, TurnDirection};
pub use avoidance::WaypointInserter;
pub use collision::CollisionChecker;
pub use config::PlannerConfig;
pub use error::{AlignmentError, PlanError, ScenarioError};
pub use models::{
    AircraftProfile, AircraftSpecs, AircraftType, Anchor, AnchorKind, Attempt, Collision,
    Environment, Obstacle, PathKind, PlanFallback, PlanMode, Point3, ProfileSummary, SamplePhase,
    Trajectory, TrajectorySample, TurnSummary,
};
pub use planner::{plan_progressive_alignment, plan_tangent_arc};
pub use profile::{AltitudeProfile, SpeedProfile};
