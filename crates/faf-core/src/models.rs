//! Core data models for approach planning.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::geometry::{heading_to_vector, unit};

const GRAVITY_MPS2: f64 = 9.81;

/// A position in local kilometres (x east, y north, z altitude).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_horizontal(point: Point, z: f64) -> Self {
        Self::new(point.x, point.y, z)
    }

    /// Horizontal projection.
    pub fn horizontal(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn horizontal_distance(&self, other: &Point3) -> f64 {
        self.horizontal().distance(other.horizontal())
    }

    pub fn lerp(&self, other: &Point3, t: f64) -> Point3 {
        Point3::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Aircraft families with fixed performance envelopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftType {
    Light,
    #[default]
    Commercial,
    Cargo,
}

/// Performance limits of an aircraft type. Speeds in km/h, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AircraftSpecs {
    pub name: &'static str,
    pub max_climb_slope: f64,
    /// Signed, negative for descent.
    pub max_descent_slope: f64,
    pub typical_speed: f64,
    pub approach_speed: f64,
    pub faf_speed: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub max_bank_angle: f64,
}

impl AircraftType {
    pub const ALL: [AircraftType; 3] = [
        AircraftType::Light,
        AircraftType::Commercial,
        AircraftType::Cargo,
    ];

    pub fn specs(self) -> AircraftSpecs {
        match self {
            AircraftType::Light => AircraftSpecs {
                name: "Light aircraft",
                max_climb_slope: 15.0,
                max_descent_slope: -10.0,
                typical_speed: 180.0,
                approach_speed: 120.0,
                faf_speed: 140.0,
                min_speed: 100.0,
                max_speed: 220.0,
                max_bank_angle: 30.0,
            },
            AircraftType::Commercial => AircraftSpecs {
                name: "Airliner",
                max_climb_slope: 10.0,
                max_descent_slope: -6.0,
                typical_speed: 250.0,
                approach_speed: 180.0,
                faf_speed: 200.0,
                min_speed: 160.0,
                max_speed: 300.0,
                max_bank_angle: 25.0,
            },
            AircraftType::Cargo => AircraftSpecs {
                name: "Cargo aircraft",
                max_climb_slope: 8.0,
                max_descent_slope: -5.0,
                typical_speed: 220.0,
                approach_speed: 160.0,
                faf_speed: 180.0,
                min_speed: 140.0,
                max_speed: 280.0,
                max_bank_angle: 20.0,
            },
        }
    }

    /// Parse a type name, falling back to `Commercial` for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => AircraftType::Light,
            "cargo" => AircraftType::Cargo,
            _ => AircraftType::Commercial,
        }
    }
}

/// Aircraft state and limits for one planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftProfile {
    pub position: Point3,
    /// Degrees, 0 = north, clockwise.
    pub heading_deg: f64,
    pub speed_kmh: f64,
    pub aircraft_type: AircraftType,
    pub max_climb_slope_deg: f64,
    /// Signed, negative for descent.
    pub max_descent_slope_deg: f64,
    pub max_bank_angle_deg: f64,
    pub approach_speed_kmh: f64,
}

impl AircraftProfile {
    /// Build a profile whose limits come from the aircraft type table.
    pub fn new(position: Point3, speed_kmh: f64, heading_deg: f64, aircraft_type: AircraftType) -> Self {
        let specs = aircraft_type.specs();
        Self {
            position,
            heading_deg,
            speed_kmh,
            aircraft_type,
            max_climb_slope_deg: specs.max_climb_slope,
            max_descent_slope_deg: specs.max_descent_slope,
            max_bank_angle_deg: specs.max_bank_angle,
            approach_speed_kmh: specs.approach_speed,
        }
    }

    pub fn specs(&self) -> AircraftSpecs {
        self.aircraft_type.specs()
    }

    /// Unit horizontal direction of travel.
    pub fn direction(&self) -> Vec2 {
        heading_to_vector(self.heading_deg)
    }

    /// Minimum turn radius in km at the current speed and bank limit.
    pub fn min_turn_radius_km(&self) -> f64 {
        self.turn_radius_at(self.speed_kmh)
    }

    pub fn turn_radius_at(&self, speed_kmh: f64) -> f64 {
        let v_mps = speed_kmh / 3.6;
        let bank = self.max_bank_angle_deg.to_radians();
        (v_mps * v_mps) / (GRAVITY_MPS2 * bank.tan()) / 1000.0
    }

    /// `(min, max)` speed in km/h.
    pub fn speed_limits(&self) -> (f64, f64) {
        let specs = self.specs();
        (specs.min_speed, specs.max_speed)
    }

    pub fn is_speed_valid(&self, speed_kmh: f64) -> bool {
        let (min, max) = self.speed_limits();
        (min..=max).contains(&speed_kmh)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.position.is_finite() || !self.heading_deg.is_finite() {
            return Err(ScenarioError::NonFinite("aircraft state"));
        }
        if !(self.speed_kmh.is_finite() && self.speed_kmh > 0.0) {
            return Err(ScenarioError::InvalidSpeed(self.speed_kmh));
        }
        if !(self.max_bank_angle_deg > 0.0 && self.max_bank_angle_deg < 90.0) {
            return Err(ScenarioError::InvalidBankAngle(self.max_bank_angle_deg));
        }
        if self.max_descent_slope_deg.abs() <= 0.0 || self.max_climb_slope_deg <= 0.0 {
            return Err(ScenarioError::InvalidSlopeLimits {
                climb: self.max_climb_slope_deg,
                descent: self.max_descent_slope_deg,
            });
        }
        Ok(())
    }
}

/// Airspace box plus the airport and final approach fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
    pub airport: Point3,
    pub faf: Point3,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(200.0, 200.0, 5.0)
    }
}

impl Environment {
    /// Airport at 90% of the box on the ground, FAF 5 km out on the
    /// diagonal at 0.5 km.
    pub fn new(size_x: f64, size_y: f64, size_z: f64) -> Self {
        const APPROACH_DISTANCE_KM: f64 = 5.0;
        const APPROACH_ALTITUDE_KM: f64 = 0.5;

        let airport = Point3::new(size_x * 0.9, size_y * 0.9, 0.0);
        let offset = APPROACH_DISTANCE_KM / std::f64::consts::SQRT_2;
        let faf = Point3::new(airport.x + offset, airport.y + offset, APPROACH_ALTITUDE_KM);
        Self {
            size_x,
            size_y,
            size_z,
            airport,
            faf,
        }
    }

    pub fn with_points(mut self, airport: Point3, faf: Point3) -> Self {
        self.airport = airport;
        self.faf = faf;
        self
    }

    /// Unit horizontal direction from the FAF towards the airport.
    pub fn runway_axis(&self) -> Option<Vec2> {
        unit(self.airport.horizontal() - self.faf.horizontal())
    }

    /// Horizontal FAF to airport distance.
    pub fn runway_length_km(&self) -> f64 {
        self.faf.horizontal_distance(&self.airport)
    }

    pub fn contains(&self, point: &Point3) -> bool {
        (0.0..=self.size_x).contains(&point.x)
            && (0.0..=self.size_y).contains(&point.y)
            && (0.0..=self.size_z).contains(&point.z)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        for size in [self.size_x, self.size_y, self.size_z] {
            if !(size.is_finite() && size > 0.0) {
                return Err(ScenarioError::InvalidEnvironmentSize(size));
            }
        }
        if !self.contains(&self.airport) {
            return Err(ScenarioError::OutOfBounds {
                what: "airport",
                position: self.airport,
            });
        }
        if !self.contains(&self.faf) {
            return Err(ScenarioError::OutOfBounds {
                what: "FAF",
                position: self.faf,
            });
        }
        Ok(())
    }
}

/// Vertical cylinder the trajectory must stay clear of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub height: f64,
}

impl Obstacle {
    pub const fn new(x: f64, y: f64, radius: f64, height: f64) -> Self {
        Self {
            x,
            y,
            radius,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether a 3D point lies inside the cylinder (boundary included).
    pub fn contains(&self, point: &Point3) -> bool {
        self.center().distance(point.horizontal()) <= self.radius
            && point.z >= 0.0
            && point.z <= self.height
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ScenarioError> {
        let in_box = (0.0..=environment.size_x).contains(&self.x)
            && (0.0..=environment.size_y).contains(&self.y);
        if !in_box {
            return Err(ScenarioError::OutOfBounds {
                what: "obstacle",
                position: Point3::new(self.x, self.y, 0.0),
            });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ScenarioError::InvalidObstacleRadius(self.radius));
        }
        if !(self.height > 0.0 && self.height <= environment.size_z) {
            return Err(ScenarioError::InvalidObstacleHeight {
                height: self.height,
                ceiling: environment.size_z,
            });
        }
        Ok(())
    }
}

/// Role of an anchor in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    Start,
    /// End of the straight leg flown on the initial heading.
    InitialLeg,
    /// Arc exit on the runway axis line.
    Intercept,
    Detour,
    Faf,
}

/// A 2D point the stitched path must pass through.
///
/// `tangent` pins the direction of travel at the anchor; unpinned anchors
/// take the bisector of their neighbouring chords.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub point: Point,
    pub tangent: Option<Vec2>,
    pub kind: AnchorKind,
}

impl Anchor {
    pub fn pinned(point: Point, tangent: Vec2, kind: AnchorKind) -> Self {
        Self {
            point,
            tangent: Some(tangent),
            kind,
        }
    }

    pub fn free(point: Point, kind: AnchorKind) -> Self {
        Self {
            point,
            tangent: None,
            kind,
        }
    }
}

/// Lateral strategy used to meet the runway axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanMode {
    /// Straight leg on the current heading, then one Bezier turn onto the axis.
    #[default]
    ProgressiveAlignment,
    /// Minimum-radius arc onto the axis, then a decelerating approach.
    TangentArc,
}

/// Shape of the lateral plan that produced a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Aligned,
    TangentArc,
    /// Airport and FAF coincide, no axis to align with.
    StraightLine,
    /// Already above the FAF.
    Vertical,
}

/// Flight phase a sample belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplePhase {
    #[default]
    Level,
    Turn,
    Transition,
    Descent,
    Climb,
    TerminalBlend,
    /// Terminal blend that also drops altitude the slope limit could not absorb.
    SteepTerminal,
    Vertical,
}

/// One point of a trajectory with its kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub position: Point3,
    /// Cumulative 3D distance from the start, km.
    pub distance_km: f64,
    /// Seconds from the start.
    pub time_s: f64,
    pub altitude_km: f64,
    pub slope_deg: f64,
    pub heading_deg: f64,
    /// Degrees per second, positive clockwise.
    pub turn_rate_deg_s: f64,
    pub speed_kmh: f64,
    pub phase: SamplePhase,
}

/// Turn geometry of a tangent-arc plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub radius_km: f64,
    /// Signed sweep, positive counter-clockwise (left turn).
    pub angle_deg: f64,
    pub center: Point,
    pub intercept: Point,
}

/// Lengths of the longitudinal profile phases.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub level_flight_distance_km: f64,
    pub transition_distance_km: f64,
    pub descent_distance_km: f64,
    /// Altitude the slope limit could not absorb before the terminal blend.
    pub altitude_shortfall_km: f64,
}

/// Why a requested mode was not used as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PlanFallback {
    /// Tangent-arc interception had no real root; progressive alignment used instead.
    NoTangentSolution { discriminant: f64, turn_radius_km: f64 },
    /// Airport and FAF coincide.
    StraightLine,
    /// Start is horizontally on top of the FAF.
    VerticalOnly,
}

/// A detected sample-versus-obstacle intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub obstacle_index: usize,
    pub sample_index: usize,
    pub horizontal_distance_km: f64,
    pub altitude_km: f64,
}

/// Record of one build-and-validate pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// 0 is the planning pass, k >= 1 is Retrying(k).
    pub index: usize,
    pub safety_margin_km: f64,
    pub detour_waypoints: usize,
    pub sample_count: usize,
    pub collision: Option<Collision>,
}

/// A validated, collision-free trajectory to the FAF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub requested_mode: PlanMode,
    pub mode: PlanMode,
    pub path_kind: PathKind,
    pub fallback: Option<PlanFallback>,
    pub samples: Vec<TrajectorySample>,
    pub total_distance_km: f64,
    pub flight_time_s: f64,
    /// Anchor chain the final path was stitched through.
    pub anchors: Vec<Anchor>,
    pub detour_waypoints: usize,
    pub intercept_point: Option<Point>,
    pub turn: Option<TurnSummary>,
    pub profile: ProfileSummary,
    pub initial_speed_kmh: f64,
    pub approach_speed_kmh: Option<f64>,
    pub safety_margin_km: f64,
    /// Closest horizontal approach beyond an obstacle's radius, among
    /// samples below its top. `None` when nothing is flown beneath one.
    pub min_clearance_km: Option<f64>,
    pub attempts: Vec<Attempt>,
    pub within_bounds: bool,
}

impl Trajectory {
    pub fn first(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    pub fn flight_time_min(&self) -> f64 {
        self.flight_time_s / 60.0
    }

    /// Most negative slope in degrees.
    pub fn min_slope_deg(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.slope_deg)
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_radius_grows_with_speed() {
        let light = AircraftProfile::new(Point3::new(0.0, 0.0, 1.0), 180.0, 0.0, AircraftType::Light);
        // 50 m/s at 30 degrees of bank.
        let expected = 50.0_f64.powi(2) / (9.81 * 30.0_f64.to_radians().tan()) / 1000.0;
        assert!((light.min_turn_radius_km() - expected).abs() < 1e-12);
        assert!(light.turn_radius_at(220.0) > light.min_turn_radius_km());
    }

    #[test]
    fn type_table_drives_profile_limits() {
        let cargo = AircraftProfile::new(Point3::default(), 220.0, 90.0, AircraftType::Cargo);
        assert_eq!(cargo.max_descent_slope_deg, -5.0);
        assert_eq!(cargo.approach_speed_kmh, 160.0);
        assert!(cargo.is_speed_valid(220.0));
        assert!(!cargo.is_speed_valid(300.0));
        assert_eq!(AircraftType::from_name("LIGHT"), AircraftType::Light);
        assert_eq!(AircraftType::from_name("glider"), AircraftType::Commercial);
    }

    #[test]
    fn runway_axis_points_from_faf_to_airport() {
        let env = Environment::new(50.0, 50.0, 5.0)
            .with_points(Point3::new(5.0, 25.0, 0.0), Point3::new(20.0, 25.0, 1.0));
        let axis = env.runway_axis().unwrap();
        assert!((axis.x + 1.0).abs() < 1e-12 && axis.y.abs() < 1e-12);
        assert!((env.runway_length_km() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn obstacle_validation_checks_height_against_ceiling() {
        let env = Environment::new(50.0, 50.0, 5.0);
        assert!(Obstacle::new(10.0, 10.0, 2.0, 3.0).validate(&env).is_ok());
        assert!(matches!(
            Obstacle::new(10.0, 10.0, 2.0, 6.0).validate(&env),
            Err(ScenarioError::InvalidObstacleHeight { .. })
        ));
        assert!(matches!(
            Obstacle::new(10.0, 10.0, 0.0, 3.0).validate(&env),
            Err(ScenarioError::InvalidObstacleRadius(_))
        ));
    }

    #[test]
    fn obstacle_containment_includes_boundary() {
        let obstacle = Obstacle::new(0.0, 0.0, 2.0, 1.0);
        assert!(obstacle.contains(&Point3::new(2.0, 0.0, 1.0)));
        assert!(!obstacle.contains(&Point3::new(2.0, 0.0, 1.01)));
        assert!(!obstacle.contains(&Point3::new(2.01, 0.0, 0.5)));
    }
}
