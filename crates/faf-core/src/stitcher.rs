//! Tangent-continuous cubic Bezier stitching through an anchor chain.
//!
//! Every anchor carries one direction of travel shared by the segment that
//! ends there and the segment that starts there, so the chain is G1
//! continuous without a separate smoothing pass. The lateral path is built
//! first; altitude and speed are then looked up by horizontal arc length.

use kurbo::{CubicBez, ParamCurve, Point, Vec2};

use crate::config::PlannerConfig;
use crate::geometry::{unit, EPSILON_KM};
use crate::models::{Anchor, Point3, SamplePhase};
use crate::profile::{AltitudeProfile, SpeedProfile};

/// A sampled 2D path with cumulative horizontal distance per point.
#[derive(Debug, Clone, Default)]
pub struct LateralPath {
    pub points: Vec<Point>,
    pub distances_km: Vec<f64>,
}

impl LateralPath {
    pub fn length_km(&self) -> f64 {
        self.distances_km.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn push(&mut self, point: Point) {
        match self.points.last() {
            None => {
                self.points.push(point);
                self.distances_km.push(0.0);
            }
            Some(&last) => {
                let step = last.distance(point);
                if step > EPSILON_KM {
                    let total = self.length_km() + step;
                    self.points.push(point);
                    self.distances_km.push(total);
                }
            }
        }
    }
}

/// A positioned sample before kinematics are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub position: Point3,
    pub speed_kmh: f64,
    pub phase: SamplePhase,
}

/// Direction of travel at every anchor.
///
/// Pinned tangents win. Otherwise the endpoints follow their only chord and
/// interior anchors take the bisector of the incoming and outgoing chords.
pub fn resolve_tangents(anchors: &[Anchor]) -> Vec<Vec2> {
    let chord = |i: usize| unit(anchors[i + 1].point - anchors[i].point);
    let last = anchors.len().saturating_sub(1);

    anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| {
            if let Some(tangent) = anchor.tangent.and_then(unit) {
                return tangent;
            }
            let incoming = if i > 0 { chord(i - 1) } else { None };
            let outgoing = if i < last { chord(i) } else { None };
            match (incoming, outgoing) {
                (Some(a), Some(b)) => unit(a + b).unwrap_or(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => Vec2::new(0.0, 1.0),
            }
        })
        .collect()
}

/// One cubic per consecutive anchor pair, `None` where the pair coincides.
pub fn segment_curves(anchors: &[Anchor], config: &PlannerConfig) -> Vec<Option<CubicBez>> {
    let tangents = resolve_tangents(anchors);
    anchors
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (p0, p3) = (pair[0].point, pair[1].point);
            let length = p0.distance(p3);
            if length <= EPSILON_KM {
                return None;
            }
            let reach = config.control_point_fraction * length;
            Some(CubicBez::new(
                p0,
                p0 + tangents[i] * reach,
                p3 - tangents[i + 1] * reach,
                p3,
            ))
        })
        .collect()
}

/// Samples taken along a segment of the given chord length.
pub(crate) fn sample_count(length_km: f64, config: &PlannerConfig) -> usize {
    config
        .min_samples_per_segment
        .max((length_km * config.samples_per_km).ceil() as usize)
        .max(1)
}

/// Build and sample one cubic per consecutive anchor pair.
pub fn stitch(anchors: &[Anchor], config: &PlannerConfig) -> LateralPath {
    let mut path = LateralPath::default();
    let Some(first) = anchors.first() else {
        return path;
    };
    path.push(first.point);

    for curve in segment_curves(anchors, config).into_iter().flatten() {
        let count = sample_count(curve.p0.distance(curve.p3), config);
        for j in 1..=count {
            path.push(curve.eval(j as f64 / count as f64));
        }
    }
    path
}

/// Attach altitude, speed and phase to every lateral sample.
pub fn merge_profiles(
    path: &LateralPath,
    altitude: &AltitudeProfile,
    speed: &SpeedProfile,
) -> Vec<PathSample> {
    path.points
        .iter()
        .zip(&path.distances_km)
        .map(|(point, &distance)| PathSample {
            position: Point3::from_horizontal(*point, altitude.altitude_at(distance)),
            speed_kmh: speed.speed_at(distance),
            phase: altitude.phase_at(distance),
        })
        .collect()
}

/// Blend the trailing samples linearly onto `target` so the path ends on it exactly.
///
/// Blended samples are tagged with `phase`.
pub fn blend_terminal(
    samples: &mut [PathSample],
    target: Point3,
    fraction: f64,
    phase: SamplePhase,
) {
    let n = samples.len();
    if n == 0 {
        return;
    }
    let count = ((fraction * n as f64).ceil() as usize).clamp(1, n);
    let first = n - count;
    for (j, sample) in samples[first..].iter_mut().enumerate() {
        let weight = if count == 1 {
            1.0
        } else {
            j as f64 / (count - 1) as f64
        };
        sample.position = sample.position.lerp(&target, weight);
        sample.phase = phase;
    }
    if let Some(last) = samples.last_mut() {
        last.position = target;
    }
}

/// Drop samples closer than [`EPSILON_KM`] to their predecessor.
///
/// The final sample always survives; a near-duplicate before it is removed
/// instead.
pub fn dedupe(samples: Vec<PathSample>) -> Vec<PathSample> {
    let mut kept: Vec<PathSample> = Vec::with_capacity(samples.len());
    let n = samples.len();
    for (i, sample) in samples.into_iter().enumerate() {
        if let Some(prev) = kept.last() {
            if prev.position.distance(&sample.position) <= EPSILON_KM {
                if i + 1 == n && kept.len() > 1 {
                    kept.pop();
                } else {
                    continue;
                }
            }
        }
        kept.push(sample);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnchorKind;

    fn anchors(points: &[(f64, f64)]) -> Vec<Anchor> {
        points
            .iter()
            .map(|&(x, y)| Anchor::free(Point::new(x, y), AnchorKind::Detour))
            .collect()
    }

    #[test]
    fn straight_chain_stays_straight() {
        let config = PlannerConfig::default();
        let path = stitch(&anchors(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0)]), &config);
        assert!(path.points.iter().all(|p| p.y.abs() < 1e-12));
        assert!((path.length_km() - 3.0).abs() < 1e-9);
        // 100 samples for the 1 km segment, 200 for the 2 km one, plus the start.
        assert_eq!(path.len(), 301);
    }

    #[test]
    fn endpoints_and_interior_anchors_are_hit_exactly() {
        let config = PlannerConfig::default();
        let chain = anchors(&[(0.0, 0.0), (4.0, 3.0), (8.0, 0.0)]);
        let path = stitch(&chain, &config);
        for anchor in &chain {
            assert!(path.points.iter().any(|p| p.distance(anchor.point) < 1e-9));
        }
        assert!(path.distances_km.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn interior_tangent_is_the_chord_bisector() {
        let chain = anchors(&[(0.0, 0.0), (4.0, 3.0), (8.0, 0.0)]);
        let tangents = resolve_tangents(&chain);
        assert!((tangents[1].x - 1.0).abs() < 1e-12 && tangents[1].y.abs() < 1e-12);
    }

    #[test]
    fn pinned_tangent_shapes_the_departure() {
        let config = PlannerConfig::default();
        let mut chain = anchors(&[(0.0, 0.0), (10.0, 0.0)]);
        chain[0].tangent = Some(Vec2::new(0.0, 1.0));
        let path = stitch(&chain, &config);
        let first_step = path.points[1] - path.points[0];
        assert!(first_step.y > first_step.x.abs());
    }

    #[test]
    fn terminal_blend_lands_on_target() {
        let mut samples: Vec<PathSample> = (0..100)
            .map(|i| PathSample {
                position: Point3::new(i as f64 * 0.1, 0.0, 1.0),
                speed_kmh: 200.0,
                phase: SamplePhase::Descent,
            })
            .collect();
        let target = Point3::new(10.0, 0.0, 0.5);
        blend_terminal(&mut samples, target, 0.05, SamplePhase::TerminalBlend);
        assert_eq!(samples.last().unwrap().position, target);
        assert_eq!(samples[95].phase, SamplePhase::TerminalBlend);
        assert_eq!(samples[94].phase, SamplePhase::Descent);
        assert_eq!(samples[95].position, Point3::new(9.5, 0.0, 1.0));
    }

    #[test]
    fn dedupe_keeps_the_final_sample() {
        let at = |x: f64| PathSample {
            position: Point3::new(x, 0.0, 0.0),
            speed_kmh: 1.0,
            phase: SamplePhase::Level,
        };
        let kept = dedupe(vec![at(0.0), at(1.0), at(1.0), at(2.0), at(2.0 + 1e-12)]);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept.last().unwrap().position.x, 2.0 + 1e-12);
    }
}
