//! Geometric primitives shared by the road-finding stages.
//!
//! Coordinates live in one of two spaces and are kept apart by type:
//! - [`PixelPoint`] / [`ImagePoint`]: source-image pixel space (integer and
//!   sub-pixel). Every geometric computation runs here.
//! - [`ScreenPoint`]: positions clipped into the visible frame for overlays.
//!   Nothing in the tracker consumes these.
use serde::{Deserialize, Serialize};

/// Integer pixel location in source-image space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_image(self) -> ImagePoint {
        ImagePoint::new(self.x as f32, self.y as f32)
    }
}

/// Sub-pixel location in source-image space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f32,
    pub y: f32,
}

impl ImagePoint {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: &ImagePoint) -> f32 {
        self.distance_sq(other).sqrt()
    }

    #[inline]
    pub fn distance_sq(&self, other: &ImagePoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn midpoint(&self, other: &ImagePoint) -> ImagePoint {
        ImagePoint::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Nearest integer pixel.
    #[inline]
    pub fn round(&self) -> PixelPoint {
        PixelPoint::new(self.x.round() as i32, self.y.round() as i32)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<PixelPoint> for ImagePoint {
    fn from(p: PixelPoint) -> Self {
        p.to_image()
    }
}

/// Location in visualization space: an image-space point clamped into the
/// visible `width × height` frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn from_image_clamped(p: ImagePoint, width: usize, height: usize) -> Self {
        let max_x = width.saturating_sub(1) as f32;
        let max_y = height.saturating_sub(1) as f32;
        Self {
            x: p.x.clamp(0.0, max_x),
            y: p.y.clamp(0.0, max_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_point_is_clamped_into_frame() {
        let p = ScreenPoint::from_image_clamped(ImagePoint::new(-12.0, 500.0), 320, 240);
        assert_eq!(p, ScreenPoint { x: 0.0, y: 239.0 });
    }

    #[test]
    fn rounding_and_distance() {
        let a = ImagePoint::new(1.4, 2.6);
        assert_eq!(a.round(), PixelPoint::new(1, 3));
        let b = ImagePoint::new(4.4, 6.6);
        assert!((a.distance(&b) - 5.0).abs() < 1e-5);
    }
}
