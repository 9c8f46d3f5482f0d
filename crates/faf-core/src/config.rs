//! Tunable planner constants.
//!
//! The defaults are empirically calibrated heuristics rather than physical
//! limits. Every value can be overridden from a JSON document; missing keys
//! keep their default.

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Bezier control-point distance as a fraction of the segment length.
    pub control_point_fraction: f64,
    /// Curve sampling density in points per km.
    pub samples_per_km: f64,
    /// Lower bound on samples per Bezier segment.
    pub min_samples_per_segment: usize,
    /// Share of trailing samples blended onto the FAF.
    pub terminal_blend_fraction: f64,

    /// Transition length as a fraction of the minimum descent length.
    pub transition_fraction: f64,
    pub transition_min_km: f64,
    pub transition_max_km: f64,
    /// Cap on the transition as a fraction of the path when the path is short.
    pub short_path_transition_cap: f64,

    /// Obstacles lower than flight altitude minus this are ignored by the inserter.
    pub obstacle_vertical_margin_km: f64,
    /// Entry/exit distance as a fraction of the effective radius.
    pub detour_approach_factor: f64,
    pub detour_approach_min_km: f64,
    /// Sub-segment re-check passes after detour insertion.
    pub max_insertion_passes: usize,
    /// Slack below which a segment is considered clear of an obstacle.
    pub conflict_tolerance_km: f64,

    /// Margin used by the first planning pass.
    pub base_safety_margin_km: f64,
    /// Escalating margins for Retrying(1..).
    pub retry_margins_km: Vec<f64>,

    /// Initial straight leg as a fraction of the distance to the FAF.
    pub initial_leg_fraction: f64,
    pub initial_leg_min_km: f64,
    pub initial_leg_max_km: f64,

    /// Minimum stand-off of the interception point from the FAF.
    pub intercept_min_margin_km: f64,
    /// Projection share of the runway below which the aircraft is "far back".
    pub intercept_far_back_fraction: f64,
    /// Cap on the interception parameter as a fraction of runway length.
    pub intercept_cap_fraction: f64,
    pub intercept_min_lead_km: f64,

    /// Tangent roots further than this many runway lengths from the FAF are
    /// rejected in favour of the nearer root.
    pub tangent_root_window: f64,
    /// Arc sampling, degrees per sample.
    pub arc_degrees_per_sample: f64,
    pub arc_min_samples: usize,
    /// Share of the approach leg flown at cruise before decelerating.
    pub deceleration_start_fraction: f64,

    /// Distances below this are treated as coincident.
    pub degeneracy_threshold_km: f64,
    pub vertical_speed_kmh: f64,
    pub vertical_min_samples: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            control_point_fraction: 0.35,
            samples_per_km: 100.0,
            min_samples_per_segment: 50,
            terminal_blend_fraction: 0.05,
            transition_fraction: 0.5,
            transition_min_km: 3.0,
            transition_max_km: 12.0,
            short_path_transition_cap: 0.3,
            obstacle_vertical_margin_km: 0.5,
            detour_approach_factor: 0.8,
            detour_approach_min_km: 1.0,
            max_insertion_passes: 4,
            conflict_tolerance_km: 1e-6,
            base_safety_margin_km: 1.0,
            retry_margins_km: vec![2.0, 2.5, 3.0, 3.5, 4.0],
            initial_leg_fraction: 0.2,
            initial_leg_min_km: 1.0,
            initial_leg_max_km: 5.0,
            intercept_min_margin_km: 0.5,
            intercept_far_back_fraction: 0.3,
            intercept_cap_fraction: 0.95,
            intercept_min_lead_km: 3.0,
            tangent_root_window: 1.5,
            arc_degrees_per_sample: 2.0,
            arc_min_samples: 10,
            deceleration_start_fraction: 0.33,
            degeneracy_threshold_km: 0.1,
            vertical_speed_kmh: 10.0,
            vertical_min_samples: 300,
        }
    }
}

impl PlannerConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let config: PlannerConfig =
            serde_json::from_str(json).map_err(|e| ScenarioError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Margins in the order the planner tries them.
    pub fn margin_schedule(&self) -> Vec<f64> {
        std::iter::once(self.base_safety_margin_km)
            .chain(self.retry_margins_km.iter().copied())
            .collect()
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let named = [
            ("control_point_fraction", self.control_point_fraction),
            ("samples_per_km", self.samples_per_km),
            ("terminal_blend_fraction", self.terminal_blend_fraction),
            ("transition_fraction", self.transition_fraction),
            ("transition_min_km", self.transition_min_km),
            ("transition_max_km", self.transition_max_km),
            ("short_path_transition_cap", self.short_path_transition_cap),
            ("obstacle_vertical_margin_km", self.obstacle_vertical_margin_km),
            ("detour_approach_factor", self.detour_approach_factor),
            ("detour_approach_min_km", self.detour_approach_min_km),
            ("conflict_tolerance_km", self.conflict_tolerance_km),
            ("base_safety_margin_km", self.base_safety_margin_km),
            ("initial_leg_fraction", self.initial_leg_fraction),
            ("initial_leg_min_km", self.initial_leg_min_km),
            ("initial_leg_max_km", self.initial_leg_max_km),
            ("intercept_min_margin_km", self.intercept_min_margin_km),
            ("intercept_far_back_fraction", self.intercept_far_back_fraction),
            ("intercept_cap_fraction", self.intercept_cap_fraction),
            ("intercept_min_lead_km", self.intercept_min_lead_km),
            ("tangent_root_window", self.tangent_root_window),
            ("arc_degrees_per_sample", self.arc_degrees_per_sample),
            ("deceleration_start_fraction", self.deceleration_start_fraction),
            ("degeneracy_threshold_km", self.degeneracy_threshold_km),
            ("vertical_speed_kmh", self.vertical_speed_kmh),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ScenarioError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.samples_per_km <= 0.0 || self.arc_degrees_per_sample <= 0.0 || self.vertical_speed_kmh <= 0.0 {
            return Err(ScenarioError::InvalidConfig(
                "sampling densities and vertical speed must be positive".into(),
            ));
        }
        if self.transition_min_km > self.transition_max_km {
            return Err(ScenarioError::InvalidConfig(format!(
                "transition bounds inverted: {} > {}",
                self.transition_min_km, self.transition_max_km
            )));
        }
        if self.initial_leg_min_km > self.initial_leg_max_km {
            return Err(ScenarioError::InvalidConfig(format!(
                "initial leg bounds inverted: {} > {}",
                self.initial_leg_min_km, self.initial_leg_max_km
            )));
        }
        if self.terminal_blend_fraction > 1.0 || self.deceleration_start_fraction >= 1.0 {
            return Err(ScenarioError::InvalidConfig(
                "terminal blend and deceleration fractions must be below 1".into(),
            ));
        }
        if self.retry_margins_km.is_empty() {
            return Err(ScenarioError::InvalidConfig("retry ladder is empty".into()));
        }
        if let Some(bad) = self
            .retry_margins_km
            .iter()
            .find(|m| !m.is_finite() || **m < 0.0)
        {
            return Err(ScenarioError::InvalidConfig(format!(
                "retry margin {bad} must be finite and non-negative"
            )));
        }
        Ok(())
    }
}
