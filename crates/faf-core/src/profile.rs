//! Longitudinal profiles addressed by horizontal arc length.
//!
//! [`AltitudeProfile`] shapes the vertical path in three phases (level,
//! smoothed transition, constant slope). [`SpeedProfile`] holds cruise speed
//! and optionally eases down to an approach speed near the end. Both are
//! functions of arc length only, so they compose with any lateral path.

use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::models::{ProfileSummary, SamplePhase};

const FLAT_KM: f64 = 1e-9;

/// Integral of the septic slope blend `-20t⁷+70t⁶-84t⁵+35t⁴` over `[0, t]`.
///
/// Equals 0.5 at `t = 1`, so a full transition covers half the altitude a
/// constant slope would over the same distance.
fn transition_integral(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let t5 = t.powi(5);
    t5 * (7.0 + t * (-14.0 + t * (10.0 - 2.5 * t)))
}

/// Altitude versus horizontal distance from the start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeProfile {
    pub start_altitude_km: f64,
    pub target_altitude_km: f64,
    pub total_km: f64,
    pub level_km: f64,
    pub transition_km: f64,
    pub linear_km: f64,
    /// Signed tangent of the limiting slope; negative when descending.
    pub gradient: f64,
    pub shortfall_km: f64,
}

impl AltitudeProfile {
    /// Build the profile for a path of horizontal length `total_km`.
    ///
    /// `max_climb_slope_deg` is used when the target lies above the start,
    /// `max_descent_slope_deg` (signed or not) otherwise.
    pub fn new(
        start_altitude_km: f64,
        target_altitude_km: f64,
        total_km: f64,
        max_climb_slope_deg: f64,
        max_descent_slope_deg: f64,
        config: &PlannerConfig,
    ) -> Self {
        let total_km = total_km.max(0.0);
        let delta = target_altitude_km - start_altitude_km;
        if delta.abs() <= FLAT_KM {
            return Self {
                start_altitude_km,
                target_altitude_km,
                total_km,
                level_km: total_km,
                transition_km: 0.0,
                linear_km: 0.0,
                gradient: 0.0,
                shortfall_km: 0.0,
            };
        }

        let limit_deg = if delta > 0.0 {
            max_climb_slope_deg.abs()
        } else {
            max_descent_slope_deg.abs()
        };
        let gradient = limit_deg.to_radians().tan().copysign(delta);
        let min_length = delta.abs() / gradient.abs();

        let mut transition_km = (config.transition_fraction * min_length)
            .clamp(config.transition_min_km, config.transition_max_km);
        let mut linear_km = (min_length - transition_km / 2.0).max(0.0);
        let mut level_km = total_km - transition_km - linear_km;

        if level_km < 0.0 {
            transition_km = transition_km.min(config.short_path_transition_cap * total_km);
            level_km = 0.0;
            linear_km = (total_km - transition_km).max(0.0);
        }

        let achievable = gradient.abs() * (transition_km / 2.0 + linear_km);
        let shortfall_km = match delta.abs() - achievable {
            gap if gap > FLAT_KM => gap,
            _ => 0.0,
        };

        Self {
            start_altitude_km,
            target_altitude_km,
            total_km,
            level_km,
            transition_km,
            linear_km,
            gradient,
            shortfall_km,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.gradient == 0.0
    }

    pub fn is_climb(&self) -> bool {
        self.gradient > 0.0
    }

    /// Absolute slope limit of the linear phase, degrees.
    pub fn slope_limit_deg(&self) -> f64 {
        self.gradient.abs().atan().to_degrees()
    }

    pub fn altitude_at(&self, distance_km: f64) -> f64 {
        if self.is_flat() {
            return self.start_altitude_km;
        }
        let s = distance_km.max(0.0);
        let into_descent = s - self.level_km;
        if into_descent <= 0.0 {
            return self.start_altitude_km;
        }
        let change = if into_descent < self.transition_km {
            self.transition_km * transition_integral(into_descent / self.transition_km)
        } else {
            let linear = (into_descent - self.transition_km).min(self.linear_km);
            self.transition_km / 2.0 + linear
        };
        let altitude = self.start_altitude_km + self.gradient * change;
        if self.is_climb() {
            altitude.min(self.target_altitude_km)
        } else {
            altitude.max(self.target_altitude_km)
        }
    }

    pub fn phase_at(&self, distance_km: f64) -> SamplePhase {
        if self.is_flat() || distance_km <= self.level_km {
            SamplePhase::Level
        } else if distance_km < self.level_km + self.transition_km {
            SamplePhase::Transition
        } else if self.is_climb() {
            SamplePhase::Climb
        } else {
            SamplePhase::Descent
        }
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            level_flight_distance_km: self.level_km,
            transition_distance_km: self.transition_km,
            descent_distance_km: self.linear_km,
            altitude_shortfall_km: self.shortfall_km,
        }
    }
}

/// Speed versus horizontal distance from the start of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub cruise_kmh: f64,
    /// Target speed at the end of the leg; `None` holds cruise throughout.
    pub approach_kmh: Option<f64>,
    pub total_km: f64,
    pub deceleration_start_km: f64,
}

impl SpeedProfile {
    pub fn constant(cruise_kmh: f64) -> Self {
        Self {
            cruise_kmh,
            approach_kmh: None,
            total_km: 0.0,
            deceleration_start_km: 0.0,
        }
    }

    /// Cruise until `start_fraction` of the leg, then cosine-ease to `approach_kmh`.
    pub fn decelerating(cruise_kmh: f64, approach_kmh: f64, total_km: f64, start_fraction: f64) -> Self {
        Self {
            cruise_kmh,
            approach_kmh: Some(approach_kmh),
            total_km: total_km.max(0.0),
            deceleration_start_km: total_km.max(0.0) * start_fraction,
        }
    }

    pub fn speed_at(&self, distance_km: f64) -> f64 {
        let Some(approach) = self.approach_kmh else {
            return self.cruise_kmh;
        };
        let zone = self.total_km - self.deceleration_start_km;
        if zone <= FLAT_KM {
            return if distance_km >= self.total_km { approach } else { self.cruise_kmh };
        }
        let progress = ((distance_km - self.deceleration_start_km) / zone).clamp(0.0, 1.0);
        let ease = 0.5 * (1.0 + (progress * std::f64::consts::PI).cos());
        approach + ease * (self.cruise_kmh - approach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_descent(start: f64, target: f64, total: f64) -> AltitudeProfile {
        AltitudeProfile::new(start, target, total, 15.0, -10.0, &PlannerConfig::default())
    }

    #[test]
    fn transition_integral_is_smooth_at_both_ends() {
        assert_eq!(transition_integral(0.0), 0.0);
        assert!((transition_integral(1.0) - 0.5).abs() < 1e-12);
        // Slope blend has zero derivative at the ends, so the integral is
        // flat near 0 and linear with unit slope near 1.
        let h = 1e-4;
        assert!(transition_integral(h) / h < 1e-10);
        let d1 = (transition_integral(1.0) - transition_integral(1.0 - h)) / h;
        assert!((d1 - 1.0).abs() < 1e-3);
    }

    #[test]
    fn long_path_has_all_three_phases() {
        let profile = light_descent(3.0, 1.0, 40.0);
        let min_length = 2.0 / 10f64.to_radians().tan();
        assert!(profile.level_km > 0.0);
        assert!((profile.transition_km - (0.5 * min_length).clamp(3.0, 12.0)).abs() < 1e-9);
        assert_eq!(profile.shortfall_km, 0.0);
        assert_eq!(profile.altitude_at(0.0), 3.0);
        assert!((profile.altitude_at(40.0) - 1.0).abs() < 1e-9);

        // Linear phase runs at exactly the limit slope.
        let mid = profile.level_km + profile.transition_km + profile.linear_km / 2.0;
        let slope = (profile.altitude_at(mid + 0.01) - profile.altitude_at(mid)) / 0.01;
        assert!((slope - profile.gradient).abs() < 1e-9);
        assert_eq!(profile.phase_at(mid), SamplePhase::Descent);
    }

    #[test]
    fn short_path_drops_level_flight_and_caps_transition() {
        let profile = light_descent(3.0, 1.0, 6.0);
        assert_eq!(profile.level_km, 0.0);
        assert!(profile.transition_km <= 0.3 * 6.0 + 1e-12);
        assert!(profile.shortfall_km > 0.0);
        assert!(profile.altitude_at(6.0) > 1.0);
        assert_eq!(profile.summary().level_flight_distance_km, 0.0);
    }

    #[test]
    fn exactly_long_enough_path_has_no_shortfall() {
        let long = light_descent(3.0, 1.0, 40.0);
        let exact = light_descent(3.0, 1.0, long.transition_km + long.linear_km);
        assert_eq!(exact.shortfall_km, 0.0);
    }

    #[test]
    fn altitude_never_crosses_target() {
        let profile = light_descent(1.2, 1.0, 30.0);
        for i in 0..=300 {
            let alt = profile.altitude_at(i as f64 * 0.1);
            assert!(alt >= 1.0 - 1e-12 && alt <= 1.2 + 1e-12);
        }
    }

    #[test]
    fn climb_mirrors_descent() {
        let profile = AltitudeProfile::new(0.5, 1.0, 20.0, 15.0, -10.0, &PlannerConfig::default());
        assert!(profile.is_climb());
        assert!((profile.slope_limit_deg() - 15.0).abs() < 1e-9);
        assert!((profile.altitude_at(20.0) - 1.0).abs() < 1e-9);
        assert_eq!(profile.phase_at(19.9), SamplePhase::Climb);
    }

    #[test]
    fn deceleration_eases_from_cruise_to_approach() {
        let speed = SpeedProfile::decelerating(180.0, 120.0, 10.0, 0.33);
        assert_eq!(speed.speed_at(0.0), 180.0);
        assert_eq!(speed.speed_at(3.3), 180.0);
        assert!((speed.speed_at(10.0) - 120.0).abs() < 1e-9);
        let mid = speed.speed_at(3.3 + 6.7 / 2.0);
        assert!((mid - 150.0).abs() < 1e-9);
        assert_eq!(SpeedProfile::constant(200.0).speed_at(5.0), 200.0);
    }
}
