//! Runway-axis interception.
//!
//! Two strategies meet the axis: a progressive interception point used by
//! the aligned plan, and a minimum-radius turn circle whose crossing with
//! the axis line fixes the end of a constant-bank arc.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::error::AlignmentError;
use crate::geometry::{
    angle_between_deg, circle_line_intersections, left_normal, signed_angle, unit,
};
use crate::models::Environment;

/// Axis line parameterised from the airport towards the FAF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachAxis {
    pub airport: Point,
    pub faf: Point,
    /// Unit vector airport -> FAF.
    pub outbound: Vec2,
    pub length_km: f64,
}

impl ApproachAxis {
    pub fn from_environment(environment: &Environment) -> Result<Self, AlignmentError> {
        let airport = environment.airport.horizontal();
        let faf = environment.faf.horizontal();
        let outbound = unit(faf - airport).ok_or(AlignmentError::NoRunwayAxis)?;
        Ok(Self {
            airport,
            faf,
            outbound,
            length_km: airport.distance(faf),
        })
    }

    /// Direction flown on final, FAF -> airport.
    pub fn inbound(&self) -> Vec2 {
        -self.outbound
    }

    pub fn point_at(&self, t_km: f64) -> Point {
        self.airport + self.outbound * t_km
    }
}

/// Where the progressive plan aims to join the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveIntercept {
    /// Projection of the aircraft on the axis, km from the airport.
    pub projection_km: f64,
    /// Signed perpendicular offset from the axis, positive left of outbound.
    pub offset_km: f64,
    /// Angle between the current heading and the final approach direction.
    pub heading_offset_deg: f64,
    /// Interception parameter along the axis, km from the airport.
    pub intercept_km: f64,
    pub point: Point,
}

pub fn progressive_intercept(
    position: Point,
    heading: Vec2,
    axis: &ApproachAxis,
    safety_margin_km: f64,
    config: &PlannerConfig,
) -> ProgressiveIntercept {
    let rel = position - axis.airport;
    let projection_km = rel.dot(axis.outbound);
    let offset_km = axis.outbound.cross(rel);
    let heading_offset_deg = angle_between_deg(heading, axis.inbound());

    let intercept_km = if projection_km < config.intercept_far_back_fraction * axis.length_km {
        let lead = (2.0 * offset_km.abs())
            .max(0.1 * heading_offset_deg)
            .max(config.intercept_min_lead_km);
        (projection_km + lead).min(config.intercept_cap_fraction * axis.length_km)
    } else {
        axis.length_km - safety_margin_km.max(config.intercept_min_margin_km)
    };

    ProgressiveIntercept {
        projection_km,
        offset_km,
        heading_offset_deg,
        intercept_km,
        point: axis.point_at(intercept_km),
    }
}

/// Length of the straight leg flown on the current heading before turning.
///
/// Never more than half the remaining distance.
pub fn initial_leg_km(distance_to_faf_km: f64, config: &PlannerConfig) -> f64 {
    (config.initial_leg_fraction * distance_to_faf_km)
        .clamp(config.initial_leg_min_km, config.initial_leg_max_km)
        .min(0.5 * distance_to_faf_km)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    fn sign(self) -> f64 {
        match self {
            TurnDirection::Left => 1.0,
            TurnDirection::Right => -1.0,
        }
    }
}

/// Constant-radius turn from the start position onto the axis line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentArc {
    pub start: Point,
    pub center: Point,
    pub radius_km: f64,
    pub direction: TurnDirection,
    /// Signed sweep in radians, positive counter-clockwise.
    pub sweep_rad: f64,
    pub intercept: Point,
    /// Axis parameter of the intercept, km from the airport.
    pub intercept_km: f64,
}

impl TangentArc {
    pub fn arc_length_km(&self) -> f64 {
        self.radius_km * self.sweep_rad.abs()
    }

    pub fn sweep_deg(&self) -> f64 {
        self.sweep_rad.to_degrees()
    }

    /// Direction of travel when leaving the arc.
    pub fn exit_tangent(&self) -> Vec2 {
        self.tangent_at(self.intercept)
    }

    fn tangent_at(&self, point: Point) -> Vec2 {
        let radial = unit(point - self.center).unwrap_or(Vec2::new(1.0, 0.0));
        left_normal(radial) * self.direction.sign()
    }

    /// Arc points from start to intercept, both included.
    pub fn sample(&self, config: &PlannerConfig) -> Vec<Point> {
        let by_angle = (self.sweep_deg().abs() / config.arc_degrees_per_sample).ceil() as usize;
        let by_length = (self.arc_length_km() * config.samples_per_km).ceil() as usize;
        let count = config.arc_min_samples.max(by_angle).max(by_length).max(2);

        let radial = self.start - self.center;
        let start_angle = radial.y.atan2(radial.x);
        (0..count)
            .map(|i| {
                let angle = start_angle + self.sweep_rad * i as f64 / (count - 1) as f64;
                let (sin, cos) = angle.sin_cos();
                Point::new(
                    self.center.x + self.radius_km * cos,
                    self.center.y + self.radius_km * sin,
                )
            })
            .collect()
    }
}

/// Solve the turn circle against the axis line.
///
/// The circle is tangent to the current heading at `start` on the side the
/// approach direction lies. Fails with [`AlignmentError::NoTangentSolution`]
/// when the circle never reaches the axis line.
pub fn solve_tangent_arc(
    start: Point,
    heading: Vec2,
    radius_km: f64,
    axis: &ApproachAxis,
    config: &PlannerConfig,
) -> Result<TangentArc, AlignmentError> {
    let direction = if heading.cross(axis.outbound) > 0.0 {
        TurnDirection::Left
    } else {
        TurnDirection::Right
    };
    let center = start + left_normal(heading) * (radius_km * direction.sign());

    let (t1, t2) = circle_line_intersections(center, radius_km, axis.airport, axis.outbound)
        .map_err(|discriminant| AlignmentError::NoTangentSolution { discriminant })?;

    let window = config.tangent_root_window * axis.length_km;
    let ahead = |t: f64| t > 0.0 && axis.point_at(t).distance(axis.faf) < window;
    let intercept_km = if ahead(t1) {
        t1
    } else if ahead(t2) {
        t2
    } else if axis.point_at(t1).distance(axis.faf) < axis.point_at(t2).distance(axis.faf) {
        t1
    } else {
        t2
    };
    let intercept = axis.point_at(intercept_km);

    let mut sweep_rad = signed_angle(start - center, intercept - center);
    match direction {
        TurnDirection::Left if sweep_rad < 0.0 => sweep_rad += std::f64::consts::TAU,
        TurnDirection::Right if sweep_rad > 0.0 => sweep_rad -= std::f64::consts::TAU,
        _ => {}
    }

    Ok(TangentArc {
        start,
        center,
        radius_km,
        direction,
        sweep_rad,
        intercept,
        intercept_km,
    })
}
