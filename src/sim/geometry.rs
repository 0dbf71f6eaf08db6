//! Geometry primitives for tile collision
//!
//! Screen space: x grows right, y grows down. Angles come from `atan2`
//! on raw screen deltas, so a positive angle points down-right.

use glam::Vec2;

use crate::{cartesian_to_polar, polar_to_cartesian};

/// Perpendicular distance under which a point counts as lying on a line
const ON_LINE_EPSILON: f32 = 1e-6;

/// A planar vector in angle + magnitude form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    pub angle: f32,
    pub magnitude: f32,
}

/// An immutable line segment with its derived line attributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Vec2,
    end: Vec2,
    /// `f32::INFINITY` for a vertical segment
    slope: f32,
    /// `None` for a vertical segment
    y_intercept: Option<f32>,
    /// `None` for a horizontal segment
    x_intercept: Option<f32>,
    length: f32,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        let delta = end - start;
        let slope = if delta.x == 0.0 {
            f32::INFINITY
        } else {
            delta.y / delta.x
        };

        let y_intercept = slope.is_finite().then(|| start.y - slope * start.x);
        let x_intercept = match y_intercept {
            None => Some(start.x),
            Some(_) if slope == 0.0 => None,
            Some(b) => Some(-b / slope),
        };

        Self {
            start,
            end,
            slope,
            y_intercept,
            x_intercept,
            length: delta.length(),
        }
    }

    #[inline]
    pub fn start(&self) -> Vec2 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.end
    }

    #[inline]
    pub fn slope(&self) -> f32 {
        self.slope
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.slope.is_infinite()
    }

    #[inline]
    pub fn y_intercept(&self) -> Option<f32> {
        self.y_intercept
    }

    #[inline]
    pub fn x_intercept(&self) -> Option<f32> {
        self.x_intercept
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }
}

/// Signed angle of `to - from`, in (-π, π]
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Polar to cartesian difference
#[inline]
pub fn vector_to_difference(angle: f32, magnitude: f32) -> Vec2 {
    polar_to_cartesian(magnitude, angle)
}

/// Cartesian difference to polar. `atan2` keeps all four quadrants apart.
#[inline]
pub fn difference_to_vector(delta: Vec2) -> Polar {
    let (magnitude, angle) = cartesian_to_polar(delta);
    Polar { angle, magnitude }
}

/// Signed scalar projection of `vector` onto the unit direction `direction`
#[inline]
pub fn component_in_direction(vector: Polar, direction: f32) -> f32 {
    vector.magnitude * (vector.angle - direction).cos()
}

/// Shortest connector from `point` to the finite segment `segment`.
///
/// The connector starts at `point`. It ends at the foot of the
/// perpendicular when the foot lies inside the segment, otherwise at the
/// nearer endpoint. A point lying on the segment's line (or a zero-length
/// segment) yields `None`: there is no direction to push along.
pub fn point_and_segment(point: Vec2, segment: &Segment) -> Option<Segment> {
    let dir = segment.end - segment.start;
    let len_sq = dir.length_squared();
    if len_sq == 0.0 {
        return None;
    }

    let t = (point - segment.start).dot(dir) / len_sq;
    let foot = segment.start + dir * t;
    if point.distance(foot) <= ON_LINE_EPSILON {
        return None;
    }

    if (0.0..=1.0).contains(&t) {
        return Some(Segment::new(point, foot));
    }

    let nearest = if point.distance_squared(segment.start) <= point.distance_squared(segment.end) {
        segment.start
    } else {
        segment.end
    };
    Some(Segment::new(point, nearest))
}

/// Reflect `velocity` across a line of slope `tangent_slope`.
///
/// Works in a y-up frame: callers flip the y component going in and out.
/// Magnitude is preserved.
pub fn reflect_vector(tangent_slope: f32, velocity: Vec2) -> Vec2 {
    let incoming = difference_to_vector(velocity);
    let tangent_angle = tangent_slope.atan();
    let angle = tangent_angle + (tangent_angle - incoming.angle);
    vector_to_difference(angle, incoming.magnitude)
}

/// Boundary segments of a closed polygon.
///
/// Two points give one open segment; fewer give none.
pub fn points_to_segment_list(points: &[Vec2]) -> Vec<Segment> {
    match points.len() {
        0 | 1 => Vec::new(),
        2 => vec![Segment::new(points[0], points[1])],
        n => (0..n)
            .map(|i| Segment::new(points[i], points[(i + 1) % n]))
            .collect(),
    }
}
