//! Planar coordinate type.
//!
//! World coordinates are single-precision; the map is small enough that `f32`
//! keeps sub-millimetre precision everywhere a unit can stand.

use serde::{Deserialize, Serialize};

use crate::math;

/// A point on the 2-D world plane.
///
/// Serializes as a two-element array `[x, y]`, which is also the wire shape
/// used by the host pathfinding protocol.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

/// An intermediate point of a path.  Paths are ordered and immutable once
/// received from the host.
pub type Waypoint = Point2;

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point2) -> f32 {
        math::distance(self.x, self.y, other.x, other.y)
    }

    /// Heading from `self` to `other` in radians, `atan2` convention.
    #[inline]
    pub fn angle_to(self, other: Point2) -> f32 {
        math::angle_to(self.x, self.y, other.x, other.y)
    }

    /// The point `step` units from `self` along the segment to `other`.
    /// Does not clamp; callers check the distance first.
    pub fn step_toward(self, other: Point2, step: f32) -> Point2 {
        let d = self.distance(other);
        if d <= f32::EPSILON {
            return other;
        }
        let t = step / d;
        Point2 {
            x: math::lerp(self.x, other.x, t),
            y: math::lerp(self.y, other.y, t),
        }
    }

    /// `true` if both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32; 2]> for Point2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Point2 { x, y }
    }
}

impl From<Point2> for [f32; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
