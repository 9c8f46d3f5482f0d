//! Planar geometry helpers for trajectory synthesis.
//!
//! All coordinates are local east/north kilometres: `x` grows east, `y`
//! grows north. Headings follow the aviation convention (0° = north,
//! clockwise), so a heading maps to the direction `(sin h, cos h)`.

use kurbo::{Point, Vec2};

/// Length below which a vector is treated as zero.
pub const EPSILON_KM: f64 = 1e-9;

/// Unit direction vector for a heading in degrees.
pub fn heading_to_vector(heading_deg: f64) -> Vec2 {
    let rad = heading_deg.to_radians();
    Vec2::new(rad.sin(), rad.cos())
}

/// Heading in degrees `[0, 360)` of a planar direction.
///
/// Returns `None` for a zero-length vector.
pub fn vector_to_heading(v: Vec2) -> Option<f64> {
    if v.hypot() <= EPSILON_KM {
        return None;
    }
    Some(normalize_heading(v.x.atan2(v.y).to_degrees()))
}

/// Wrap any angle in degrees into `[0, 360)`.
pub fn normalize_heading(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed difference `to - from` in degrees, in `[-180, 180]`.
pub fn heading_delta(from_deg: f64, to_deg: f64) -> f64 {
    let mut delta = to_deg - from_deg;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    delta
}

/// Unit vector, or `None` when the input is degenerate.
pub fn unit(v: Vec2) -> Option<Vec2> {
    let len = v.hypot();
    if len <= EPSILON_KM || !len.is_finite() {
        None
    } else {
        Some(v / len)
    }
}

/// Counter-clockwise normal (90° to the left of travel).
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Signed angle in radians rotating `a` onto `b`, in `(-π, π]`.
/// Positive is counter-clockwise.
pub fn signed_angle(a: Vec2, b: Vec2) -> f64 {
    a.cross(b).atan2(a.dot(b))
}

/// Unsigned angle in degrees between two directions.
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f64 {
    signed_angle(a, b).abs().to_degrees()
}

/// Projection of a point onto the line through a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Distance from the segment start to the foot point, along the segment.
    pub along_km: f64,
    /// Segment length.
    pub length_km: f64,
    /// Signed perpendicular offset; positive when the point lies left of travel.
    pub offset_km: f64,
    /// Foot of the perpendicular on the (infinite) line.
    pub foot: Point,
}

impl SegmentProjection {
    /// True when the foot point lies strictly between the endpoints.
    pub fn is_interior(&self) -> bool {
        self.along_km > 0.0 && self.along_km < self.length_km
    }

    pub fn distance_km(&self) -> f64 {
        self.offset_km.abs()
    }
}

/// Project `point` onto the line through `start -> end`.
///
/// Returns `None` for a zero-length segment.
pub fn project_onto_segment(point: Point, start: Point, end: Point) -> Option<SegmentProjection> {
    let chord = end - start;
    let length_km = chord.hypot();
    let dir = unit(chord)?;
    let rel = point - start;
    let along_km = rel.dot(dir);
    Some(SegmentProjection {
        along_km,
        length_km,
        offset_km: dir.cross(rel),
        foot: start + dir * along_km,
    })
}

/// Parameters `t` where the line `origin + t * dir` crosses a circle.
///
/// `dir` must be a unit vector. Returns the two roots (larger first), or
/// the negative discriminant when the line misses the circle.
pub fn circle_line_intersections(
    center: Point,
    radius: f64,
    origin: Point,
    dir: Vec2,
) -> Result<(f64, f64), f64> {
    let to_center = center - origin;
    let a = dir.dot(dir);
    let b = -2.0 * to_center.dot(dir);
    let c = to_center.dot(to_center) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Err(discriminant);
    }
    let root = discriminant.sqrt();
    Ok(((-b + root) / (2.0 * a), (-b - root) / (2.0 * a)))
}

/// Horizontal length of a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn heading_conversions_follow_compass_convention() {
        let east = heading_to_vector(90.0);
        assert!(approx(east.x, 1.0) && approx(east.y, 0.0));
        assert!(approx(vector_to_heading(Vec2::new(0.0, -1.0)).unwrap(), 180.0));
        assert!(approx(vector_to_heading(Vec2::new(-1.0, 0.0)).unwrap(), 270.0));
        assert!(vector_to_heading(Vec2::ZERO).is_none());
    }

    #[test]
    fn heading_delta_takes_the_short_way_round() {
        assert!(approx(heading_delta(350.0, 10.0), 20.0));
        assert!(approx(heading_delta(10.0, 350.0), -20.0));
        assert!(approx(heading_delta(90.0, 180.0), 90.0));
    }

    #[test]
    fn projection_reports_side_and_interior() {
        let proj = project_onto_segment(
            Point::new(5.0, 2.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        )
        .unwrap();
        assert!(approx(proj.along_km, 5.0));
        // Travelling east, north is on the left.
        assert!(approx(proj.offset_km, 2.0));
        assert!(proj.is_interior());

        let behind = project_onto_segment(
            Point::new(-1.0, 0.5),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        )
        .unwrap();
        assert!(!behind.is_interior());
    }

    #[test]
    fn circle_line_roots_and_miss() {
        let (t1, t2) = circle_line_intersections(
            Point::new(5.0, 0.0),
            2.0,
            Point::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
        )
        .unwrap();
        assert!(approx(t1, 7.0) && approx(t2, 3.0));

        let miss = circle_line_intersections(
            Point::new(5.0, 3.0),
            2.0,
            Point::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
        );
        assert!(miss.is_err());
    }

    #[test]
    fn signed_angle_is_counter_clockwise_positive() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert!(approx(signed_angle(a, b), std::f64::consts::FRAC_PI_2));
        assert!(approx(signed_angle(b, a), -std::f64::consts::FRAC_PI_2));
        assert!(approx(angle_between_deg(b, a), 90.0));
    }
}
