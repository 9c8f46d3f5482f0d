//! Detour waypoint insertion around cylindrical obstacles.
//!
//! Every anchor-to-anchor segment is checked twice against each obstacle
//! tall enough to matter at the estimated flight altitude: once as a
//! straight chord and once as the cubic the stitcher will actually fly.
//!
//! Chord conflicts whose margin circles overlap form one cluster. A cluster
//! gets an entry and an exit waypoint, all on the side of the chord that
//! needs the smaller lateral offset to clear every member. A curve that
//! bulges into an obstacle the chord misses gets one waypoint on the margin
//! circle at its closest approach.

use kurbo::{CubicBez, ParamCurve, Point, Vec2};

use crate::config::PlannerConfig;
use crate::geometry::{
    circle_line_intersections, left_normal, project_onto_segment, unit, SegmentProjection,
};
use crate::models::{Anchor, AnchorKind, Obstacle};
use crate::stitcher::{sample_count, segment_curves};

/// Detour waypoint inserter for one safety margin.
pub struct WaypointInserter<'a> {
    obstacles: &'a [Obstacle],
    safety_margin_km: f64,
    /// Obstacles treated as relevant at any altitude.
    forced: &'a [usize],
    config: &'a PlannerConfig,
}

#[derive(Debug, Clone, Copy)]
struct Conflict {
    obstacle: Obstacle,
    projection: SegmentProjection,
}

/// Segment-local view shared by the detour builders.
struct Segment<'c> {
    start: Point,
    end: Point,
    dir: Vec2,
    length_km: f64,
    travelled_km: f64,
    curve: Option<&'c CubicBez>,
}

impl Segment<'_> {
    fn at(&self, along_km: f64) -> Point {
        self.start + self.dir * along_km
    }
}

impl<'a> WaypointInserter<'a> {
    pub fn new(obstacles: &'a [Obstacle], safety_margin_km: f64, config: &'a PlannerConfig) -> Self {
        Self {
            obstacles,
            safety_margin_km,
            forced: &[],
            config,
        }
    }

    /// Treat the obstacles at these indices as relevant regardless of altitude.
    pub fn with_forced(mut self, forced: &'a [usize]) -> Self {
        self.forced = forced;
        self
    }

    fn effective_radius(&self, obstacle: &Obstacle) -> f64 {
        obstacle.radius + self.safety_margin_km
    }

    fn is_relevant(&self, index: usize, obstacle: &Obstacle, altitude_km: f64) -> bool {
        self.forced.contains(&index)
            || altitude_km <= obstacle.height + self.config.obstacle_vertical_margin_km
    }

    /// Distance along a straight run from `origin` before it first enters a
    /// relevant obstacle's margin circle, capped at `length_km`.
    ///
    /// Obstacles whose circle already contains `origin` are ignored, and the
    /// run never shrinks below the degeneracy threshold.
    pub fn clear_run_km<F>(
        &self,
        origin: Point,
        dir: Vec2,
        length_km: f64,
        altitude_at: F,
    ) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let mut run = length_km;
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            let effective = self.effective_radius(obstacle);
            if origin.distance(obstacle.center()) <= effective {
                continue;
            }
            let Ok((exit, entry)) =
                circle_line_intersections(obstacle.center(), effective, origin, dir)
            else {
                continue;
            };
            if entry <= 0.0 || exit <= entry {
                continue;
            }
            if self.is_relevant(index, obstacle, altitude_at(0.5 * (entry + exit))) {
                run = run.min(entry);
            }
        }
        run.max(self.config.degeneracy_threshold_km.min(length_km))
    }

    /// Return a new anchor chain with detours inserted.
    ///
    /// `altitude_at` estimates flight altitude from horizontal distance along
    /// the chain. The first and last anchors are never moved.
    pub fn insert<F>(&self, anchors: &[Anchor], altitude_at: F) -> Vec<Anchor>
    where
        F: Fn(f64) -> f64,
    {
        let mut chain = anchors.to_vec();
        if self.obstacles.is_empty() || chain.len() < 2 {
            return chain;
        }

        for pass in 0..self.config.max_insertion_passes {
            let (next, inserted) = self.insert_pass(&chain, &altitude_at);
            chain = next;
            if inserted == 0 {
                break;
            }
            tracing::debug!(
                pass,
                inserted,
                margin_km = self.safety_margin_km,
                "inserted detour waypoints"
            );
        }
        chain
    }

    fn insert_pass<F>(&self, chain: &[Anchor], altitude_at: &F) -> (Vec<Anchor>, usize)
    where
        F: Fn(f64) -> f64,
    {
        let curves = segment_curves(chain, self.config);
        let mut rebuilt = Vec::with_capacity(chain.len());
        let mut inserted = 0;
        let mut travelled_km = 0.0;

        rebuilt.push(chain[0]);
        for (pair, curve) in chain.windows(2).zip(&curves) {
            let (start, end) = (pair[0].point, pair[1].point);
            if let Some(dir) = unit(end - start) {
                let segment = Segment {
                    start,
                    end,
                    dir,
                    length_km: start.distance(end),
                    travelled_km,
                    curve: curve.as_ref(),
                };
                let detours = self.detours_for_segment(&segment, altitude_at);
                inserted += detours.len();
                rebuilt.extend(detours);
            }
            rebuilt.push(pair[1]);
            travelled_km += start.distance(end);
        }
        (rebuilt, inserted)
    }

    /// Obstacles whose margin circle the straight chord cuts through.
    fn chord_conflicts(
        &self,
        segment: &Segment<'_>,
        altitude_at: &impl Fn(f64) -> f64,
    ) -> Vec<(usize, Conflict)> {
        self.obstacles
            .iter()
            .enumerate()
            .filter_map(|(index, obstacle)| {
                let projection =
                    project_onto_segment(obstacle.center(), segment.start, segment.end)?;
                if !projection.is_interior() {
                    return None;
                }
                let limit = self.effective_radius(obstacle) - self.config.conflict_tolerance_km;
                if projection.distance_km() >= limit {
                    return None;
                }
                let altitude = altitude_at(segment.travelled_km + projection.along_km);
                self.is_relevant(index, obstacle, altitude).then_some((
                    index,
                    Conflict {
                        obstacle: *obstacle,
                        projection,
                    },
                ))
            })
            .collect()
    }

    /// Group conflicts whose margin circles overlap.
    fn clusters(&self, conflicts: Vec<Conflict>) -> Vec<Vec<Conflict>> {
        let mut clusters: Vec<Vec<Conflict>> = conflicts.into_iter().map(|c| vec![c]).collect();
        'merge: loop {
            for i in 0..clusters.len() {
                for j in i + 1..clusters.len() {
                    let touching = clusters[i].iter().any(|a| {
                        clusters[j].iter().any(|b| {
                            let reach = self.effective_radius(&a.obstacle)
                                + self.effective_radius(&b.obstacle);
                            a.obstacle.center().distance(b.obstacle.center()) < reach
                        })
                    });
                    if touching {
                        let absorbed = clusters.swap_remove(j);
                        clusters[i].extend(absorbed);
                        continue 'merge;
                    }
                }
            }
            break;
        }
        clusters
    }

    fn cluster_waypoints(
        &self,
        segment: &Segment<'_>,
        cluster: &[Conflict],
        altitude_at: &impl Fn(f64) -> f64,
    ) -> [(f64, Point); 2] {
        let mut left = f64::NEG_INFINITY;
        let mut right = f64::NEG_INFINITY;
        let mut approach = 0.0_f64;
        let mut first_along = f64::INFINITY;
        let mut last_along = f64::NEG_INFINITY;
        for Conflict {
            obstacle,
            projection,
        } in cluster
        {
            let effective = self.effective_radius(obstacle);
            left = left.max(projection.offset_km + effective);
            right = right.max(effective - projection.offset_km);
            let reach = self.config.detour_approach_factor * effective;
            approach = approach.max(reach.max(self.config.detour_approach_min_km));
            first_along = first_along.min(projection.along_km);
            last_along = last_along.max(projection.along_km);
        }

        // Ties, including a dead-centre single obstacle, go right.
        let (side, lateral) = if left < right { (1.0, left) } else { (-1.0, right) };
        let normal = left_normal(segment.dir) * side;

        [first_along - approach, last_along + approach].map(|along| {
            let along = along.clamp(0.0, segment.length_km);
            let point = segment.at(along) + normal * lateral;
            let point = self.push_clear(point, segment.travelled_km + along, normal, altitude_at);
            (along, point)
        })
    }

    /// Single waypoints for obstacles the chord misses but the curve enters.
    fn curve_waypoints(
        &self,
        segment: &Segment<'_>,
        chord_hits: &[usize],
        altitude_at: &impl Fn(f64) -> f64,
    ) -> Vec<(f64, Point)> {
        let Some(curve) = segment.curve else {
            return Vec::new();
        };
        let count = sample_count(segment.length_km, self.config);
        let samples: Vec<Point> = (0..=count)
            .map(|j| curve.eval(j as f64 / count as f64))
            .collect();
        let tolerance = self.config.conflict_tolerance_km;

        let mut waypoints = Vec::new();
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if chord_hits.contains(&index) {
                continue;
            }
            let center = obstacle.center();
            let effective = self.effective_radius(obstacle);
            let Some(closest) = samples
                .iter()
                .copied()
                .min_by(|a, b| a.distance(center).total_cmp(&b.distance(center)))
            else {
                continue;
            };
            let distance = closest.distance(center);
            if distance >= effective - tolerance {
                continue;
            }
            // Obstacles hugging an endpoint are the neighbouring segment's business.
            let nearest_end = segment.start.distance(center).min(segment.end.distance(center));
            if distance >= nearest_end - tolerance {
                continue;
            }
            let Some(projection) = project_onto_segment(closest, segment.start, segment.end) else {
                continue;
            };
            let along = projection.along_km.clamp(0.0, segment.length_km);
            if !self.is_relevant(index, obstacle, altitude_at(segment.travelled_km + along)) {
                continue;
            }

            let away = match project_onto_segment(center, segment.start, segment.end) {
                Some(p) if p.offset_km < 0.0 => left_normal(segment.dir),
                _ => -left_normal(segment.dir),
            };
            let outward = unit(closest - center).unwrap_or(away);
            let point = center + outward * effective;
            let point = self.push_clear(point, segment.travelled_km + along, outward, altitude_at);
            waypoints.push((along, point));
        }
        waypoints
    }

    fn detours_for_segment(
        &self,
        segment: &Segment<'_>,
        altitude_at: &impl Fn(f64) -> f64,
    ) -> Vec<Anchor> {
        let (chord_hits, conflicts): (Vec<usize>, Vec<Conflict>) =
            self.chord_conflicts(segment, altitude_at).into_iter().unzip();

        let mut waypoints: Vec<(f64, Point)> = self
            .clusters(conflicts)
            .iter()
            .flat_map(|cluster| self.cluster_waypoints(segment, cluster, altitude_at))
            .collect();
        waypoints.extend(self.curve_waypoints(segment, &chord_hits, altitude_at));
        waypoints.sort_by(|a, b| a.0.total_cmp(&b.0));

        let spacing = self.config.degeneracy_threshold_km;
        let mut previous = segment.start;
        let mut detours = Vec::with_capacity(waypoints.len());
        for (_, point) in waypoints {
            if point.distance(previous) < spacing || point.distance(segment.end) < spacing {
                continue;
            }
            detours.push(Anchor::free(point, AnchorKind::Detour));
            previous = point;
        }
        detours
    }

    /// Move a waypoint radially out of any relevant obstacle's margin.
    fn push_clear(
        &self,
        mut point: Point,
        distance_km: f64,
        fallback: Vec2,
        altitude_at: &impl Fn(f64) -> f64,
    ) -> Point {
        let altitude = altitude_at(distance_km);
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if !self.is_relevant(index, obstacle, altitude) {
                continue;
            }
            let effective = self.effective_radius(obstacle);
            let center = obstacle.center();
            if point.distance(center) < effective {
                let outward = unit(point - center).unwrap_or(fallback);
                point = center + outward * effective;
            }
        }
        point
    }
}

/// Number of detour anchors in a chain.
pub fn detour_count(anchors: &[Anchor]) -> usize {
    anchors
        .iter()
        .filter(|anchor| anchor.kind == AnchorKind::Detour)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stitcher::stitch;

    fn chain(points: &[(f64, f64)]) -> Vec<Anchor> {
        let last = points.len() - 1;
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let kind = match i {
                    0 => AnchorKind::Start,
                    i if i == last => AnchorKind::Faf,
                    _ => AnchorKind::InitialLeg,
                };
                Anchor::free(Point::new(x, y), kind)
            })
            .collect()
    }

    #[test]
    fn clear_path_is_untouched() {
        let config = PlannerConfig::default();
        let obstacles = [Obstacle::new(10.0, 10.0, 1.0, 3.0)];
        let inserter = WaypointInserter::new(&obstacles, 1.0, &config);
        let anchors = chain(&[(0.0, 0.0), (20.0, 0.0)]);
        assert_eq!(inserter.insert(&anchors, |_| 1.0), anchors);
    }

    #[test]
    fn centred_obstacle_is_passed_on_the_right() {
        let config = PlannerConfig::default();
        let obstacles = [Obstacle::new(10.0, 0.0, 2.0, 3.0)];
        let inserter = WaypointInserter::new(&obstacles, 1.0, &config);
        // Travelling east: right is south.
        let result = inserter.insert(&chain(&[(0.0, 0.0), (20.0, 0.0)]), |_| 1.0);

        assert_eq!(detour_count(&result), 2);
        let entry = result[1].point;
        let exit = result[2].point;
        assert!(entry.x < exit.x);
        assert!((entry.y + 3.0).abs() < 1e-9 && (exit.y + 3.0).abs() < 1e-9);
        assert!((entry.x - 7.6).abs() < 1e-9 && (exit.x - 12.4).abs() < 1e-9);
        for anchor in &result {
            assert!(anchor.point.distance(Point::new(10.0, 0.0)) >= 3.0 - 1e-9);
        }
    }

    #[test]
    fn detour_goes_away_from_an_offset_obstacle() {
        let config = PlannerConfig::default();
        let obstacles = [Obstacle::new(10.0, -1.0, 2.0, 3.0)];
        let inserter = WaypointInserter::new(&obstacles, 1.0, &config);
        let result = inserter.insert(&chain(&[(0.0, 0.0), (20.0, 0.0)]), |_| 1.0);

        assert_eq!(detour_count(&result), 2);
        // Offset (2 - 1) + 1 = 2 to the north.
        assert!((result[1].point.y - 2.0).abs() < 1e-9);
        assert!((result[2].point.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn low_obstacles_are_ignored() {
        let config = PlannerConfig::default();
        let obstacles = [Obstacle::new(10.0, 0.0, 2.0, 0.4)];
        let inserter = WaypointInserter::new(&obstacles, 1.0, &config);
        let anchors = chain(&[(0.0, 0.0), (20.0, 0.0)]);
        assert_eq!(detour_count(&inserter.insert(&anchors, |_| 1.5)), 0);
        assert_eq!(detour_count(&inserter.insert(&anchors, |_| 0.8)), 2);
    }

    #[test]
    fn obstacle_beyond_segment_end_is_not_a_conflict() {
        let config = PlannerConfig::default();
        let obstacles = [Obstacle::new(20.0, 0.0, 3.0, 5.0)];
        let inserter = WaypointInserter::new(&obstacles, 2.0, &config);
        let anchors = chain(&[(0.0, 0.0), (20.0, 0.0)]);
        assert_eq!(detour_count(&inserter.insert(&anchors, |_| 1.0)), 0);
    }

    #[test]
    fn curve_bulging_into_an_obstacle_gets_a_waypoint() {
        let config = PlannerConfig::default();
        // The chord runs 4 km south of the obstacle, but the pinned tangents
        // arch the cubic to within 1.4 km of its centre.
        let obstacles = [Obstacle::new(5.0, 4.0, 1.0, 3.0)];
        let inserter = WaypointInserter::new(&obstacles, 1.0, &config);
        let anchors = vec![
            Anchor::pinned(Point::new(0.0, 0.0), Vec2::new(0.0, 1.0), AnchorKind::Start),
            Anchor::pinned(Point::new(10.0, 0.0), Vec2::new(0.0, -1.0), AnchorKind::Faf),
        ];
        let result = inserter.insert(&anchors, |_| 1.0);

        assert_eq!(detour_count(&result), 1);
        assert!(result[1].point.distance(Point::new(5.0, 2.0)) < 1e-9);
        let path = stitch(&result, &config);
        for point in &path.points {
            assert!(point.distance(obstacles[0].center()) >= 2.0 - 1e-9);
        }
    }

    #[test]
    fn overlapping_obstacles_are_passed_on_one_side() {
        let config = PlannerConfig::default();
        // One obstacle just left of the chord, one right; their margin
        // circles overlap so the detour must not weave between them.
        let obstacles = [
            Obstacle::new(10.0, 0.5, 1.0, 4.0),
            Obstacle::new(11.0, -1.0, 1.0, 4.0),
        ];
        let inserter = WaypointInserter::new(&obstacles, 1.0, &config);
        let result = inserter.insert(&chain(&[(0.0, 0.0), (20.0, 0.0)]), |_| 1.0);

        assert_eq!(detour_count(&result), 2);
        assert!(result[1].point.distance(Point::new(8.4, 2.5)) < 1e-9);
        assert!(result[2].point.distance(Point::new(12.6, 2.5)) < 1e-9);
        let path = stitch(&result, &config);
        for obstacle in &obstacles {
            for point in &path.points {
                assert!(point.distance(obstacle.center()) >= 2.0);
            }
        }
    }

    #[test]
    fn forced_obstacle_is_avoided_at_any_altitude() {
        let config = PlannerConfig::default();
        let obstacles = [Obstacle::new(10.0, 0.0, 2.0, 0.4)];
        let anchors = chain(&[(0.0, 0.0), (20.0, 0.0)]);
        let inserter = WaypointInserter::new(&obstacles, 1.0, &config);
        assert_eq!(detour_count(&inserter.insert(&anchors, |_| 1.5)), 0);
        let forced = inserter.with_forced(&[0]);
        assert_eq!(detour_count(&forced.insert(&anchors, |_| 1.5)), 2);
    }

    #[test]
    fn clear_run_stops_at_the_first_margin_circle() {
        let config = PlannerConfig::default();
        let obstacles = [Obstacle::new(10.0, 0.0, 1.0, 3.0)];
        let inserter = WaypointInserter::new(&obstacles, 1.0, &config);
        let east = Vec2::new(1.0, 0.0);
        let run = |x: f64, length: f64, altitude: f64| {
            inserter.clear_run_km(Point::new(x, 0.0), east, length, |_| altitude)
        };

        assert!((run(0.0, 20.0, 1.0) - 8.0).abs() < 1e-9);
        assert_eq!(run(0.0, 5.0, 1.0), 5.0);
        // Overflown, or already inside the circle.
        assert_eq!(run(0.0, 20.0, 4.0), 20.0);
        assert_eq!(run(9.5, 20.0, 1.0), 20.0);
        // Never shorter than the degeneracy threshold.
        assert!((run(7.95, 20.0, 1.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn larger_margin_widens_the_detour() {
        let config = PlannerConfig::default();
        let obstacles = [Obstacle::new(10.0, 0.0, 2.0, 3.0)];
        let anchors = chain(&[(0.0, 0.0), (20.0, 0.0)]);
        let narrow = WaypointInserter::new(&obstacles, 1.0, &config).insert(&anchors, |_| 1.0);
        let wide = WaypointInserter::new(&obstacles, 3.0, &config).insert(&anchors, |_| 1.0);
        assert!(wide[1].point.y.abs() > narrow[1].point.y.abs());
        // Input chain is rebuilt, not modified.
        assert_eq!(anchors.len(), 2);
    }
}
