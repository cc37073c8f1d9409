//! Angle helpers for undirected image lines.
//!
//! Road boundaries carry no meaningful direction, so orientations are folded
//! into `[0, π)` and compared modulo π.
use crate::types::ImagePoint;
use std::f32::consts::{FRAC_PI_2, PI};

/// Normalizes an angle into the range [0, π).
#[inline]
pub fn normalize_half_pi(angle: f32) -> f32 {
    let norm = angle.rem_euclid(PI);
    if norm >= PI - 1e-6 {
        0.0
    } else {
        norm
    }
}

/// Smallest unsigned difference between two undirected orientations, in
/// [0, π/2].
#[inline]
pub fn angular_difference(a: f32, b: f32) -> f32 {
    let mut diff = (a - b).abs();
    if diff > PI {
        diff = diff.rem_euclid(PI);
    }
    if diff > FRAC_PI_2 {
        PI - diff
    } else {
        diff
    }
}

/// Undirected orientation of the line through `from` and `to`, in [0, π).
/// `None` when the points coincide.
#[inline]
pub fn line_angle(from: ImagePoint, to: ImagePoint) -> Option<f32> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx * dx + dy * dy < 1e-12 {
        return None;
    }
    Some(normalize_half_pi(dy.atan2(dx)))
}

/// Angular distance of an undirected orientation from horizontal, in [0, π/2].
#[inline]
pub fn angle_from_horizontal(angle: f32) -> f32 {
    angular_difference(angle, 0.0)
}
