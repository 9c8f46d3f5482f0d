//! Per-sample kinematics from positions and speeds.
//!
//! Distances are 3D and cumulative, time integrates distance over the mean
//! speed of each step, and turn rate uses the shortest heading change so a
//! crossing of north does not read as a 360° spike.

use crate::geometry::{heading_delta, vector_to_heading, EPSILON_KM};
use crate::models::{Trajectory, TrajectorySample};
use crate::stitcher::PathSample;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Derive the full sample record.
///
/// `initial_heading_deg` is used until the path first moves horizontally.
pub fn derive(samples: &[PathSample], initial_heading_deg: f64) -> Vec<TrajectorySample> {
    let mut out: Vec<TrajectorySample> = samples
        .iter()
        .map(|sample| TrajectorySample {
            position: sample.position,
            altitude_km: sample.position.z,
            speed_kmh: sample.speed_kmh,
            phase: sample.phase,
            heading_deg: initial_heading_deg,
            ..TrajectorySample::default()
        })
        .collect();

    for i in 1..out.len() {
        let (prev, cur) = (out[i - 1], out[i]);
        let step = prev.position.distance(&cur.position);
        let horizontal = prev.position.horizontal_distance(&cur.position);
        let climb = cur.position.z - prev.position.z;

        let mean_speed = 0.5 * (prev.speed_kmh + cur.speed_kmh);
        let dt = if mean_speed > 0.0 {
            step / mean_speed * SECONDS_PER_HOUR
        } else {
            0.0
        };

        let slope_deg = if horizontal > EPSILON_KM {
            climb.atan2(horizontal).to_degrees()
        } else if climb != 0.0 {
            90.0_f64.copysign(climb)
        } else {
            0.0
        };

        let heading_deg = if horizontal > EPSILON_KM {
            vector_to_heading(cur.position.horizontal() - prev.position.horizontal())
                .unwrap_or(prev.heading_deg)
        } else {
            prev.heading_deg
        };

        let sample = &mut out[i];
        sample.distance_km = prev.distance_km + step;
        sample.time_s = prev.time_s + dt;
        sample.slope_deg = slope_deg;
        sample.heading_deg = heading_deg;
    }

    if out.len() > 1 {
        out[0].slope_deg = out[1].slope_deg;
        out[0].heading_deg = out[1].heading_deg;
    }

    for i in 1..out.len() {
        let dt = out[i].time_s - out[i - 1].time_s;
        out[i].turn_rate_deg_s = if dt > 0.0 {
            heading_delta(out[i - 1].heading_deg, out[i].heading_deg) / dt
        } else {
            0.0
        };
    }
    if out.len() > 1 {
        out[0].turn_rate_deg_s = out[1].turn_rate_deg_s;
    }

    out
}

/// Re-run the derivation on a finished trajectory's positions and speeds.
pub fn rederive(trajectory: &Trajectory) -> Vec<TrajectorySample> {
    let raw: Vec<PathSample> = trajectory
        .samples
        .iter()
        .map(|sample| PathSample {
            position: sample.position,
            speed_kmh: sample.speed_kmh,
            phase: sample.phase,
        })
        .collect();
    let initial = trajectory.first().map(|s| s.heading_deg).unwrap_or(0.0);
    derive(&raw, initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Point3, SamplePhase};

    fn sample(x: f64, y: f64, z: f64, speed: f64) -> PathSample {
        PathSample {
            position: Point3::new(x, y, z),
            speed_kmh: speed,
            phase: SamplePhase::Level,
        }
    }

    #[test]
    fn time_uses_mean_step_speed() {
        let out = derive(
            &[sample(0.0, 0.0, 1.0, 100.0), sample(0.0, 10.0, 1.0, 300.0)],
            90.0,
        );
        // 10 km at a mean 200 km/h is three minutes.
        assert!((out[1].time_s - 180.0).abs() < 1e-9);
        assert!((out[1].distance_km - 10.0).abs() < 1e-12);
        assert_eq!(out[1].heading_deg, 0.0);
        assert_eq!(out[0].heading_deg, 0.0);
    }

    #[test]
    fn slope_handles_vertical_steps() {
        let out = derive(
            &[
                sample(0.0, 0.0, 2.0, 10.0),
                sample(0.0, 0.0, 1.5, 10.0),
                sample(1.0, 0.0, 1.5, 10.0),
            ],
            45.0,
        );
        assert_eq!(out[1].slope_deg, -90.0);
        assert_eq!(out[0].slope_deg, -90.0);
        assert_eq!(out[1].heading_deg, 45.0);
        assert_eq!(out[2].slope_deg, 0.0);
        assert!((out[2].heading_deg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn turn_rate_takes_the_short_way_through_north() {
        let out = derive(
            &[
                sample(0.0, 0.0, 1.0, 360.0),
                sample(-0.01, 1.0, 1.0, 360.0),
                sample(0.0, 2.0, 1.0, 360.0),
            ],
            0.0,
        );
        assert!(out[1].heading_deg > 359.0);
        assert!(out[2].heading_deg < 1.0);
        // Roughly +1.15° over 10 s, not -358°.
        assert!(out[2].turn_rate_deg_s > 0.0 && out[2].turn_rate_deg_s < 1.0);
        assert_eq!(out[0].turn_rate_deg_s, out[1].turn_rate_deg_s);
    }

    #[test]
    fn single_sample_is_at_rest() {
        let out = derive(&[sample(1.0, 2.0, 3.0, 100.0)], 270.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time_s, 0.0);
        assert_eq!(out[0].heading_deg, 270.0);
    }
}
