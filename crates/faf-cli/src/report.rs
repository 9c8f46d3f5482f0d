//! Human-readable summaries and the JSON trajectory report.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use faf_core::{PlanMode, Trajectory};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryReport {
    pub generated_at: DateTime<Utc>,
    pub scenario: String,
    pub requested_mode: PlanMode,
    pub trajectory: Trajectory,
}

impl TrajectoryReport {
    pub fn new(scenario: impl Into<String>, trajectory: Trajectory) -> Self {
        Self {
            generated_at: Utc::now(),
            scenario: scenario.into(),
            requested_mode: trajectory.requested_mode,
            trajectory,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))
    }
}

/// Multi-line summary of a planned trajectory.
pub fn summarize(trajectory: &Trajectory) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  path: {:?} ({:?})", trajectory.path_kind, trajectory.mode);
    if let Some(fallback) = &trajectory.fallback {
        let _ = writeln!(out, "  fallback: {fallback:?}");
    }
    let _ = writeln!(out, "  distance: {:.2} km", trajectory.total_distance_km);
    let _ = writeln!(out, "  flight time: {:.2} min", trajectory.flight_time_min());
    let _ = writeln!(out, "  points: {}", trajectory.samples.len());

    match trajectory.approach_speed_kmh {
        Some(approach) => {
            let _ = writeln!(
                out,
                "  speed: {:.0} -> {:.0} km/h",
                trajectory.initial_speed_kmh, approach
            );
        }
        None => {
            let _ = writeln!(out, "  speed: {:.0} km/h", trajectory.initial_speed_kmh);
        }
    }
    if let Some(turn) = &trajectory.turn {
        let _ = writeln!(
            out,
            "  turn: {:.1} deg at radius {:.3} km",
            turn.angle_deg, turn.radius_km
        );
    }
    if let Some(point) = trajectory.intercept_point {
        let _ = writeln!(out, "  intercept: ({:.2}, {:.2}) km", point.x, point.y);
    }

    let profile = &trajectory.profile;
    let _ = writeln!(
        out,
        "  profile: level {:.2} km, transition {:.2} km, descent {:.2} km",
        profile.level_flight_distance_km,
        profile.transition_distance_km,
        profile.descent_distance_km
    );
    if profile.altitude_shortfall_km > 0.0 {
        let _ = writeln!(
            out,
            "  altitude shortfall: {:.2} km absorbed by the terminal blend",
            profile.altitude_shortfall_km
        );
    }
    let _ = writeln!(out, "  min slope: {:.2} deg", trajectory.min_slope_deg());
    let _ = writeln!(
        out,
        "  safety margin: {:.1} km after {} attempt(s), {} detour waypoint(s)",
        trajectory.safety_margin_km,
        trajectory.attempts.len(),
        trajectory.detour_waypoints
    );
    if let Some(clearance) = trajectory.min_clearance_km {
        let _ = writeln!(out, "  obstacle clearance: {clearance:.2} km");
    }
    if !trajectory.within_bounds {
        let _ = writeln!(out, "  note: path leaves the airspace box");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_scenarios;
    use faf_core::PlannerConfig;

    #[test]
    fn summary_and_report_cover_the_plan() {
        let scenario = &demo_scenarios()[0];
        let trajectory = PlanMode::ProgressiveAlignment
            .plan(
                &scenario.aircraft,
                &scenario.environment,
                &scenario.obstacles,
                &PlannerConfig::default(),
            )
            .unwrap();

        let text = summarize(&trajectory);
        assert!(text.contains("distance:"));
        assert!(text.contains("flight time:"));
        assert!(text.contains("intercept:"));

        let report = TrajectoryReport::new(&scenario.name, trajectory);
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["requested_mode"], "progressive-alignment");
        assert!(value["trajectory"]["samples"].as_array().unwrap().len() > 100);
    }
}
