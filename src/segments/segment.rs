use crate::angle::{angular_difference, line_angle};
use crate::types::{ImagePoint, PixelPoint};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Line segment with integer endpoints in source-image space.
///
/// `angle` is the undirected orientation in [0, π); `length` is the Euclidean
/// endpoint distance. Segments live for a single frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: PixelPoint,
    pub p2: PixelPoint,
    pub angle: f32,
    pub length: f32,
    /// `length * avg_mag`, a saliency weight.
    pub strength: f32,
}

impl Segment {
    /// Builds a segment from its endpoints. `None` for coincident endpoints.
    pub fn from_endpoints(p1: PixelPoint, p2: PixelPoint, strength: f32) -> Option<Self> {
        let a = p1.to_image();
        let b = p2.to_image();
        let angle = line_angle(a, b)?;
        Some(Self {
            p1,
            p2,
            angle,
            length: a.distance(&b),
            strength,
        })
    }

    pub fn midpoint(&self) -> ImagePoint {
        self.p1.to_image().midpoint(&self.p2.to_image())
    }

    /// Line representation: ax + by + c = 0, with sqrt(a^2+b^2)=1
    pub fn line(&self) -> Vector3<f32> {
        let (x0, y0) = (self.p1.x as f32, self.p1.y as f32);
        let (x1, y1) = (self.p2.x as f32, self.p2.y as f32);
        let a = y1 - y0;
        let b = x0 - x1;
        let c = x1 * y0 - x0 * y1;
        let norm = (a * a + b * b).sqrt().max(1e-6);
        Vector3::new(a / norm, b / norm, c / norm)
    }

    /// Perpendicular distance from `p` to the segment's infinite line.
    pub fn line_distance(&self, p: ImagePoint) -> f32 {
        let l = self.line();
        (l[0] * p.x + l[1] * p.y + l[2]).abs()
    }

    /// Endpoint with the larger row (closer to the vehicle).
    pub fn lower_point(&self) -> PixelPoint {
        if self.p1.y >= self.p2.y {
            self.p1
        } else {
            self.p2
        }
    }

    /// Endpoint with the smaller row (closer to the horizon).
    pub fn upper_point(&self) -> PixelPoint {
        if self.p1.y >= self.p2.y {
            self.p2
        } else {
            self.p1
        }
    }

    /// True when both segments are nearly colinear: orientations within
    /// `angle_tol` and each midpoint within `dist_tol` of the other's line.
    pub fn is_colinear_with(&self, other: &Segment, angle_tol: f32, dist_tol: f32) -> bool {
        angular_difference(self.angle, other.angle) <= angle_tol
            && self.line_distance(other.midpoint()) <= dist_tol
            && other.line_distance(self.midpoint()) <= dist_tol
    }
}
