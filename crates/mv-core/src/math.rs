//! Pure math helpers used by the movement kinematics.
//!
//! Every function is stateless and deterministic.  Angles are radians in the
//! `atan2` convention (counter-clockwise positive, 0 along +x).

use std::f32::consts::{PI, TAU};

/// Euclidean distance between `(x1, y1)` and `(x2, y2)`.
#[inline]
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (x2 - x1).hypot(y2 - y1)
}

/// Heading from `(x1, y1)` toward `(x2, y2)`.
#[inline]
pub fn angle_to(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (y2 - y1).atan2(x2 - x1)
}

/// Wrap `angle` into `(-π, π]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

/// Signed shortest rotation taking `from` to `to`, in `(-π, π]`.
///
/// Positive means counter-clockwise.
#[inline]
pub fn angle_difference(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// `true` if the shortest rotation from `from` to `to` is clockwise.
/// Equal angles and exact half-turns are reported as counter-clockwise.
#[inline]
pub fn is_clockwise(from: f32, to: f32) -> bool {
    angle_difference(from, to) < 0.0
}

#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Linear interpolation; `t` is not clamped.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate from angle `a` to angle `b` along the shortest arc.
///
/// `t = 0` returns `a` unchanged and `t = 1` lands on `b` modulo 2π.  The
/// result is not wrapped; callers that store it should pass it through
/// [`normalize_angle`].
#[inline]
pub fn angle_lerp(a: f32, b: f32, t: f32) -> f32 {
    a + angle_difference(a, b) * t
}

/// Rotate `current` toward `target` by at most `max_step` radians.
///
/// Never overshoots: if the remaining arc is shorter than `max_step` the
/// result is `target` (wrapped).
pub fn rotate_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let remaining = angle_difference(current, target).abs();
    if remaining <= f32::EPSILON {
        return normalize_angle(target);
    }
    if max_step <= 0.0 {
        return normalize_angle(current);
    }
    let t = clamp(max_step / remaining, 0.0, 1.0);
    normalize_angle(angle_lerp(current, target, t))
}
