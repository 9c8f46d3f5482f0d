//! Planning entry points and the validate-and-retry loop.
//!
//! A request is classified first: coincident with the FAF, directly above
//! it, without a usable runway axis, or regular. Regular requests go to the
//! selected [`PlanMode`]. Every candidate, fallbacks included, is scanned
//! against the obstacles; a colliding candidate is rebuilt with the next
//! safety margin of the schedule until one is clear or the schedule runs out.

use kurbo::{Point, Vec2};

use crate::alignment::{
    initial_leg_km, progressive_intercept, solve_tangent_arc, ApproachAxis, TangentArc,
};
use crate::avoidance::{detour_count, WaypointInserter};
use crate::collision::CollisionChecker;
use crate::config::PlannerConfig;
use crate::error::{AlignmentError, PlanError, Result};
use crate::geometry::{polyline_length, EPSILON_KM};
use crate::kinematics;
use crate::models::{
    AircraftProfile, Anchor, AnchorKind, Attempt, Environment, Obstacle, PathKind, PlanFallback,
    PlanMode, Point3, ProfileSummary, SamplePhase, Trajectory, TurnSummary,
};
use crate::profile::{AltitudeProfile, SpeedProfile};
use crate::stitcher::{blend_terminal, dedupe, merge_profiles, stitch, LateralPath, PathSample};

impl PlanMode {
    /// Plan with this mode.
    pub fn plan(
        self,
        aircraft: &AircraftProfile,
        environment: &Environment,
        obstacles: &[Obstacle],
        config: &PlannerConfig,
    ) -> Result<Trajectory> {
        match self {
            PlanMode::ProgressiveAlignment => {
                plan_progressive_alignment(aircraft, environment, obstacles, config)
            }
            PlanMode::TangentArc => plan_tangent_arc(aircraft, environment, obstacles, config),
        }
    }
}

/// Straight leg on the current heading, then one Bezier turn onto the axis
/// ending at the FAF.
pub fn plan_progressive_alignment(
    aircraft: &AircraftProfile,
    environment: &Environment,
    obstacles: &[Obstacle],
    config: &PlannerConfig,
) -> Result<Trajectory> {
    let ctx = PlanContext::new(aircraft, environment, obstacles, config, PlanMode::ProgressiveAlignment)?;
    match ctx.classify() {
        Geometry::Axis(axis) => {
            ctx.run_attempts(|margin, forced| ctx.build_aligned(&axis, margin, forced))
        }
        other => ctx.plan_degenerate(other),
    }
}

/// Minimum-radius arc onto the axis line, then a decelerating leg to the FAF.
///
/// Falls back to progressive alignment when the turn circle cannot reach
/// the axis.
pub fn plan_tangent_arc(
    aircraft: &AircraftProfile,
    environment: &Environment,
    obstacles: &[Obstacle],
    config: &PlannerConfig,
) -> Result<Trajectory> {
    let ctx = PlanContext::new(aircraft, environment, obstacles, config, PlanMode::TangentArc)?;
    let axis = match ctx.classify() {
        Geometry::Axis(axis) => axis,
        other => return ctx.plan_degenerate(other),
    };

    let radius_km = aircraft.min_turn_radius_km();
    match solve_tangent_arc(ctx.start().horizontal(), ctx.heading(), radius_km, &axis, config) {
        Ok(arc) => {
            ctx.run_attempts(|margin, forced| ctx.build_tangent(&arc, &axis, margin, forced))
        }
        Err(AlignmentError::NoTangentSolution { discriminant }) => {
            tracing::warn!(
                discriminant,
                turn_radius_km = radius_km,
                "turn circle misses the runway axis, using progressive alignment"
            );
            let fallback = PlanFallback::NoTangentSolution {
                discriminant,
                turn_radius_km: radius_km,
            };
            ctx.run_attempts(|margin, forced| {
                let mut candidate = ctx.build_aligned(&axis, margin, forced);
                candidate.fallback = Some(fallback.clone());
                candidate
            })
        }
        Err(AlignmentError::NoRunwayAxis) => ctx.plan_degenerate(Geometry::StraightLine),
    }
}

enum Geometry {
    /// Start and FAF coincide in 3D.
    Coincident,
    /// Start is horizontally on top of the FAF.
    Vertical,
    /// Airport and FAF coincide, so there is no axis to align with.
    StraightLine,
    Axis(ApproachAxis),
}

/// One build of the path for a given safety margin, before validation.
struct Candidate {
    samples: Vec<PathSample>,
    anchors: Vec<Anchor>,
    mode: PlanMode,
    path_kind: PathKind,
    fallback: Option<PlanFallback>,
    intercept_point: Option<Point>,
    turn: Option<TurnSummary>,
    profile: ProfileSummary,
    approach_speed_kmh: Option<f64>,
}

struct PlanContext<'a> {
    aircraft: &'a AircraftProfile,
    environment: &'a Environment,
    obstacles: &'a [Obstacle],
    config: &'a PlannerConfig,
    requested: PlanMode,
}

impl<'a> PlanContext<'a> {
    fn new(
        aircraft: &'a AircraftProfile,
        environment: &'a Environment,
        obstacles: &'a [Obstacle],
        config: &'a PlannerConfig,
        requested: PlanMode,
    ) -> Result<Self> {
        config.validate()?;
        environment.validate()?;
        aircraft.validate()?;
        if !environment.contains(&aircraft.position) {
            return Err(crate::error::ScenarioError::OutOfBounds {
                what: "aircraft",
                position: aircraft.position,
            }
            .into());
        }
        for obstacle in obstacles {
            obstacle.validate(environment)?;
        }
        if !aircraft.is_speed_valid(aircraft.speed_kmh) {
            let (min_kmh, max_kmh) = aircraft.speed_limits();
            tracing::warn!(
                speed_kmh = aircraft.speed_kmh,
                min_kmh,
                max_kmh,
                "speed outside the aircraft type's envelope"
            );
        }

        tracing::info!(
            mode = ?requested,
            start = ?aircraft.position,
            faf = ?environment.faf,
            obstacles = obstacles.len(),
            "planning approach"
        );

        Ok(Self {
            aircraft,
            environment,
            obstacles,
            config,
            requested,
        })
    }

    fn start(&self) -> Point3 {
        self.aircraft.position
    }

    fn faf(&self) -> Point3 {
        self.environment.faf
    }

    fn heading(&self) -> Vec2 {
        self.aircraft.direction()
    }

    fn classify(&self) -> Geometry {
        let (start, faf) = (self.start(), self.faf());
        let threshold = self.config.degeneracy_threshold_km;
        if start.distance(&faf) <= EPSILON_KM {
            return Geometry::Coincident;
        }
        if start.horizontal_distance(&faf) < threshold {
            return Geometry::Vertical;
        }
        match ApproachAxis::from_environment(self.environment) {
            Ok(axis) if axis.length_km >= threshold => Geometry::Axis(axis),
            _ => Geometry::StraightLine,
        }
    }

    fn plan_degenerate(&self, geometry: Geometry) -> Result<Trajectory> {
        match geometry {
            Geometry::Coincident => {
                tracing::warn!("aircraft already at the FAF");
                self.run_attempts(|_, _| self.build_vertical(true))
            }
            Geometry::Vertical => {
                tracing::warn!(
                    altitude_change_km = self.faf().z - self.start().z,
                    "aircraft above the FAF, vertical manoeuvre only"
                );
                self.run_attempts(|_, _| self.build_vertical(false))
            }
            Geometry::StraightLine => {
                tracing::warn!("airport and FAF coincide, flying a straight line to the FAF");
                self.run_attempts(|margin, forced| self.build_straight(margin, forced))
            }
            Geometry::Axis(axis) => {
                self.run_attempts(|margin, forced| self.build_aligned(&axis, margin, forced))
            }
        }
    }

    fn altitude_profile(&self, length_km: f64, start_altitude_km: f64) -> AltitudeProfile {
        AltitudeProfile::new(
            start_altitude_km,
            self.faf().z,
            length_km,
            self.aircraft.max_climb_slope_deg,
            self.aircraft.max_descent_slope_deg,
            self.config,
        )
    }

    fn inserter<'f>(&self, margin: f64, forced: &'f [usize]) -> WaypointInserter<'f>
    where
        'a: 'f,
    {
        WaypointInserter::new(self.obstacles, margin, self.config).with_forced(forced)
    }

    fn insert_detours(
        &self,
        anchors: &[Anchor],
        start_altitude_km: f64,
        inserter: &WaypointInserter<'_>,
    ) -> Vec<Anchor> {
        let points: Vec<Point> = anchors.iter().map(|a| a.point).collect();
        let estimate = self.altitude_profile(polyline_length(&points), start_altitude_km);
        inserter.insert(anchors, |distance| estimate.altitude_at(distance))
    }

    fn lateral_leg(&self, anchors: &[Anchor], start_altitude_km: f64) -> (LateralPath, AltitudeProfile) {
        let path = stitch(anchors, self.config);
        let profile = self.altitude_profile(path.length_km(), start_altitude_km);
        (path, profile)
    }

    /// Land on the FAF exactly. The blend is tagged as a steep terminal
    /// when it also has to lose altitude the slope limit left over.
    fn finish_samples(
        &self,
        mut samples: Vec<PathSample>,
        profile: &AltitudeProfile,
    ) -> Vec<PathSample> {
        let phase = if profile.shortfall_km > 0.0 {
            SamplePhase::SteepTerminal
        } else {
            SamplePhase::TerminalBlend
        };
        blend_terminal(&mut samples, self.faf(), self.config.terminal_blend_fraction, phase);
        dedupe(samples)
    }

    fn build_aligned(&self, axis: &ApproachAxis, margin: f64, forced: &[usize]) -> Candidate {
        let start = self.start();
        let origin = start.horizontal();
        let faf = self.faf().horizontal();
        let heading = self.heading();
        let inserter = self.inserter(margin, forced);

        // The leg is pinned to the heading, so it must stop short of any
        // obstacle ahead instead of relying on detours.
        let direct_km = origin.distance(faf);
        let estimate = self.altitude_profile(direct_km, start.z);
        let leg = inserter.clear_run_km(
            origin,
            heading,
            initial_leg_km(direct_km, self.config),
            |distance| estimate.altitude_at(distance),
        );
        let anchors = [
            Anchor::pinned(origin, heading, AnchorKind::Start),
            Anchor::pinned(origin + heading * leg, heading, AnchorKind::InitialLeg),
            Anchor::pinned(faf, axis.inbound(), AnchorKind::Faf),
        ];
        let anchors = self.insert_detours(&anchors, start.z, &inserter);
        let (path, profile) = self.lateral_leg(&anchors, start.z);
        let speed = SpeedProfile::constant(self.aircraft.speed_kmh);
        let samples = self.finish_samples(merge_profiles(&path, &profile, &speed), &profile);

        let intercept = progressive_intercept(origin, heading, axis, margin, self.config);
        Candidate {
            samples,
            anchors,
            mode: PlanMode::ProgressiveAlignment,
            path_kind: PathKind::Aligned,
            fallback: None,
            intercept_point: Some(intercept.point),
            turn: None,
            profile: profile.summary(),
            approach_speed_kmh: None,
        }
    }

    fn build_tangent(
        &self,
        arc: &TangentArc,
        axis: &ApproachAxis,
        margin: f64,
        forced: &[usize],
    ) -> Candidate {
        let start = self.start();
        let cruise = self.aircraft.speed_kmh;

        let mut samples: Vec<PathSample> = arc
            .sample(self.config)
            .into_iter()
            .map(|point| PathSample {
                position: Point3::from_horizontal(point, start.z),
                speed_kmh: cruise,
                phase: SamplePhase::Turn,
            })
            .collect();

        let leg = [
            Anchor::pinned(arc.intercept, arc.exit_tangent(), AnchorKind::Intercept),
            Anchor::pinned(self.faf().horizontal(), axis.inbound(), AnchorKind::Faf),
        ];
        let leg = self.insert_detours(&leg, start.z, &self.inserter(margin, forced));
        let (path, profile) = self.lateral_leg(&leg, start.z);
        let speed = SpeedProfile::decelerating(
            cruise,
            self.aircraft.approach_speed_kmh,
            path.length_km(),
            self.config.deceleration_start_fraction,
        );
        samples.extend(merge_profiles(&path, &profile, &speed));
        let samples = self.finish_samples(samples, &profile);

        let mut anchors = vec![Anchor::pinned(start.horizontal(), self.heading(), AnchorKind::Start)];
        anchors.extend(leg);

        let mut summary = profile.summary();
        summary.level_flight_distance_km += arc.arc_length_km();

        Candidate {
            samples,
            anchors,
            mode: PlanMode::TangentArc,
            path_kind: PathKind::TangentArc,
            fallback: None,
            intercept_point: Some(arc.intercept),
            turn: Some(TurnSummary {
                radius_km: arc.radius_km,
                angle_deg: arc.sweep_deg(),
                center: arc.center,
                intercept: arc.intercept,
            }),
            profile: summary,
            approach_speed_kmh: Some(self.aircraft.approach_speed_kmh),
        }
    }

    fn build_straight(&self, margin: f64, forced: &[usize]) -> Candidate {
        let start = self.start();
        let anchors = [
            Anchor::free(start.horizontal(), AnchorKind::Start),
            Anchor::free(self.faf().horizontal(), AnchorKind::Faf),
        ];
        let anchors = self.insert_detours(&anchors, start.z, &self.inserter(margin, forced));
        let (path, profile) = self.lateral_leg(&anchors, start.z);
        let speed = SpeedProfile::constant(self.aircraft.speed_kmh);
        let samples = self.finish_samples(merge_profiles(&path, &profile, &speed), &profile);

        Candidate {
            samples,
            anchors,
            mode: self.requested,
            path_kind: PathKind::StraightLine,
            fallback: Some(PlanFallback::StraightLine),
            intercept_point: None,
            turn: None,
            profile: profile.summary(),
            approach_speed_kmh: None,
        }
    }

    /// Smoothstep interpolation from the start to the FAF at manoeuvring speed.
    fn build_vertical(&self, coincident: bool) -> Candidate {
        let (start, faf) = (self.start(), self.faf());
        let speed_kmh = self.config.vertical_speed_kmh;
        let samples = if coincident {
            vec![PathSample {
                position: faf,
                speed_kmh,
                phase: SamplePhase::Vertical,
            }]
        } else {
            let count = self.config.vertical_min_samples.max(2);
            let mut samples: Vec<PathSample> = (0..count)
                .map(|i| {
                    let t = i as f64 / (count - 1) as f64;
                    PathSample {
                        position: start.lerp(&faf, t * t * (3.0 - 2.0 * t)),
                        speed_kmh,
                        phase: SamplePhase::Vertical,
                    }
                })
                .collect();
            if let Some(last) = samples.last_mut() {
                last.position = faf;
            }
            dedupe(samples)
        };

        let change = (faf.z - start.z).abs();
        let profile = ProfileSummary {
            descent_distance_km: change,
            ..ProfileSummary::default()
        };
        Candidate {
            samples,
            anchors: vec![
                Anchor::free(start.horizontal(), AnchorKind::Start),
                Anchor::free(faf.horizontal(), AnchorKind::Faf),
            ],
            mode: self.requested,
            path_kind: PathKind::Vertical,
            fallback: Some(PlanFallback::VerticalOnly),
            intercept_point: None,
            turn: None,
            profile,
            approach_speed_kmh: None,
        }
    }

    /// Planning pass then Retrying(1..=k) until a candidate is clear.
    ///
    /// Every obstacle a candidate hits is handed to the later builds, which
    /// then avoid it whatever the estimated altitude says.
    fn run_attempts<F>(&self, mut build: F) -> Result<Trajectory>
    where
        F: FnMut(f64, &[usize]) -> Candidate,
    {
        let checker = CollisionChecker::new(self.obstacles);
        let margins = self.config.margin_schedule();
        let mut attempts = Vec::with_capacity(margins.len());
        let mut forced: Vec<usize> = Vec::new();

        for (index, &margin) in margins.iter().enumerate() {
            let candidate = build(margin, &forced);
            let collision = checker.first_collision(candidate.samples.iter().map(|s| &s.position));
            let detours = detour_count(&candidate.anchors);
            attempts.push(Attempt {
                index,
                safety_margin_km: margin,
                detour_waypoints: detours,
                sample_count: candidate.samples.len(),
                collision,
            });
            tracing::debug!(
                attempt = index,
                margin_km = margin,
                detours,
                samples = candidate.samples.len(),
                clear = collision.is_none(),
                "validated candidate"
            );

            let Some(hit) = collision else {
                return Ok(self.finalize(candidate, margin, attempts));
            };
            if !forced.contains(&hit.obstacle_index) {
                forced.push(hit.obstacle_index);
            }
            if let Some(&next_margin_km) = margins.get(index + 1) {
                tracing::warn!(
                    attempt = index,
                    margin_km = margin,
                    next_margin_km,
                    obstacle = hit.obstacle_index,
                    sample = hit.sample_index,
                    altitude_km = hit.altitude_km,
                    "candidate collides, escalating safety margin"
                );
            }
        }

        tracing::warn!(?margins, "no valid trajectory, every safety margin collides");
        Err(PlanError::UnreachableSafely { margins, attempts })
    }

    fn finalize(&self, candidate: Candidate, margin: f64, attempts: Vec<Attempt>) -> Trajectory {
        if candidate.profile.altitude_shortfall_km > 0.0 {
            tracing::warn!(
                shortfall_km = candidate.profile.altitude_shortfall_km,
                "slope limit cannot absorb the altitude change, terminal blend steepens"
            );
        }

        let samples = kinematics::derive(&candidate.samples, self.aircraft.heading_deg);
        let (total_distance_km, flight_time_s) = samples
            .last()
            .map(|s| (s.distance_km, s.time_s))
            .unwrap_or((0.0, 0.0));
        let within_bounds = samples.iter().all(|s| self.environment.contains(&s.position));
        let detour_waypoints = detour_count(&candidate.anchors);
        let min_clearance_km = CollisionChecker::new(self.obstacles)
            .min_clearance_km(samples.iter().map(|s| &s.position));

        tracing::info!(
            mode = ?candidate.mode,
            path = ?candidate.path_kind,
            samples = samples.len(),
            distance_km = total_distance_km,
            flight_time_s,
            margin_km = margin,
            detours = detour_waypoints,
            "trajectory validated"
        );

        Trajectory {
            requested_mode: self.requested,
            mode: candidate.mode,
            path_kind: candidate.path_kind,
            fallback: candidate.fallback,
            samples,
            total_distance_km,
            flight_time_s,
            anchors: candidate.anchors,
            detour_waypoints,
            intercept_point: candidate.intercept_point,
            turn: candidate.turn,
            profile: candidate.profile,
            initial_speed_kmh: self.aircraft.speed_kmh,
            approach_speed_kmh: candidate.approach_speed_kmh,
            safety_margin_km: margin,
            min_clearance_km,
            attempts,
            within_bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AircraftType;

    fn demo_environment() -> Environment {
        Environment::new(50.0, 50.0, 5.0)
            .with_points(Point3::new(5.0, 25.0, 0.0), Point3::new(20.0, 25.0, 1.0))
    }

    fn light(x: f64, y: f64, z: f64, heading: f64) -> AircraftProfile {
        AircraftProfile::new(Point3::new(x, y, z), 180.0, heading, AircraftType::Light)
    }

    #[test]
    fn aligned_plan_starts_and_ends_exactly() {
        let env = demo_environment();
        let aircraft = light(40.0, 10.0, 3.0, 180.0);
        let trajectory =
            plan_progressive_alignment(&aircraft, &env, &[], &PlannerConfig::default()).unwrap();

        let first = trajectory.first().unwrap();
        let last = trajectory.last().unwrap();
        assert_eq!(first.position, aircraft.position);
        assert!(last.position.distance(&env.faf) < 1e-6);
        assert_eq!(trajectory.path_kind, PathKind::Aligned);
        assert_eq!(trajectory.attempts.len(), 1);
        assert_eq!(trajectory.safety_margin_km, 1.0);
        assert!(trajectory.intercept_point.is_some());
        assert!(trajectory.within_bounds);
    }

    #[test]
    fn vertical_fallback_above_the_faf() {
        let env = demo_environment();
        let aircraft = light(20.0, 25.0, 3.0, 90.0);
        let trajectory = PlanMode::TangentArc
            .plan(&aircraft, &env, &[], &PlannerConfig::default())
            .unwrap();
        assert_eq!(trajectory.path_kind, PathKind::Vertical);
        assert_eq!(trajectory.fallback, Some(PlanFallback::VerticalOnly));
        assert!(trajectory.samples.len() >= 300);
        assert!(trajectory.samples.iter().all(|s| s.speed_kmh == 10.0));
        assert_eq!(trajectory.last().unwrap().position, env.faf);
        assert!(trajectory.min_slope_deg() <= -89.0);
    }

    #[test]
    fn coincident_start_is_a_single_sample() {
        let env = demo_environment();
        let aircraft = light(20.0, 25.0, 1.0, 0.0);
        let trajectory =
            plan_progressive_alignment(&aircraft, &env, &[], &PlannerConfig::default()).unwrap();
        assert_eq!(trajectory.samples.len(), 1);
        assert_eq!(trajectory.total_distance_km, 0.0);
    }

    #[test]
    fn coincident_airport_flies_straight() {
        let env = Environment::new(50.0, 50.0, 5.0)
            .with_points(Point3::new(20.0, 25.0, 0.0), Point3::new(20.0, 25.05, 1.0));
        let aircraft = light(40.0, 25.0, 1.0, 270.0);
        let trajectory =
            plan_progressive_alignment(&aircraft, &env, &[], &PlannerConfig::default()).unwrap();
        assert_eq!(trajectory.path_kind, PathKind::StraightLine);
        assert_eq!(trajectory.fallback, Some(PlanFallback::StraightLine));
        assert!(trajectory.last().unwrap().position.distance(&env.faf) < 1e-6);
    }

    #[test]
    fn unreachable_tangent_falls_back_to_progressive() {
        let env = demo_environment();
        let aircraft = light(30.0, 45.0, 3.0, 90.0);
        let trajectory = PlanMode::TangentArc
            .plan(&aircraft, &env, &[], &PlannerConfig::default())
            .unwrap();
        assert_eq!(trajectory.requested_mode, PlanMode::TangentArc);
        assert_eq!(trajectory.mode, PlanMode::ProgressiveAlignment);
        assert!(matches!(
            trajectory.fallback,
            Some(PlanFallback::NoTangentSolution { .. })
        ));
    }

    #[test]
    fn tangent_plan_reports_turn_and_decelerates() {
        let env = demo_environment();
        let aircraft = light(30.0, 25.5, 3.0, 270.0);
        let trajectory = PlanMode::TangentArc
            .plan(&aircraft, &env, &[], &PlannerConfig::default())
            .unwrap();
        assert_eq!(trajectory.mode, PlanMode::TangentArc);
        let turn = trajectory.turn.unwrap();
        assert!((turn.radius_km - aircraft.min_turn_radius_km()).abs() < 1e-12);
        assert_eq!(trajectory.first().unwrap().phase, SamplePhase::Turn);
        assert_eq!(trajectory.first().unwrap().speed_kmh, 180.0);
        assert!((trajectory.last().unwrap().speed_kmh - 120.0).abs() < 1e-6);
        assert_eq!(trajectory.approach_speed_kmh, Some(120.0));
        // A short leg after the turn cannot lose 2 km at 10 degrees.
        assert!(trajectory.profile.altitude_shortfall_km > 0.0);
        assert_eq!(trajectory.last().unwrap().phase, SamplePhase::SteepTerminal);
    }

    #[test]
    fn retries_stop_at_the_first_clear_margin() {
        let env = demo_environment();
        let aircraft = light(40.0, 10.0, 3.0, 180.0);
        let obstacles = [Obstacle::new(30.0, 40.0, 1.0, 2.0)];
        let config = PlannerConfig::default();
        let mode = PlanMode::ProgressiveAlignment;
        let ctx = PlanContext::new(&aircraft, &env, &obstacles, &config, mode).unwrap();
        let Geometry::Axis(axis) = ctx.classify() else {
            panic!("demo airspace has a runway axis");
        };

        let mut builds = Vec::new();
        let trajectory = ctx
            .run_attempts(|margin, forced| {
                builds.push((margin, forced.to_vec()));
                let mut candidate = ctx.build_aligned(&axis, margin, forced);
                if margin < 2.5 {
                    candidate.samples[1].position = Point3::new(30.0, 40.0, 1.0);
                }
                candidate
            })
            .unwrap();

        assert_eq!(builds, vec![(1.0, vec![]), (2.0, vec![0]), (2.5, vec![0])]);
        assert_eq!(trajectory.safety_margin_km, 2.5);
        assert_eq!(trajectory.attempts.len(), 3);
        for attempt in &trajectory.attempts[..2] {
            let hit = attempt.collision.unwrap();
            assert_eq!((hit.obstacle_index, hit.sample_index), (0, 1));
        }
        assert!(trajectory.attempts[2].collision.is_none());
    }

    #[test]
    fn invalid_scenario_is_rejected() {
        let env = demo_environment();
        let aircraft = light(60.0, 10.0, 3.0, 180.0);
        let err = plan_progressive_alignment(&aircraft, &env, &[], &PlannerConfig::default())
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidScenario(_)));
    }
}
