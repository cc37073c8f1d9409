use crate::segments::Segment;
use crate::types::{ImagePoint, PixelPoint};
use serde::Serialize;

/// Scored vanishing-point hypothesis for a single frame.
#[derive(Clone, Debug, Serialize)]
pub struct VanishingPointCandidate {
    pub point: PixelPoint,
    pub prior: f32,
    pub likelihood: f32,
    /// `prior * likelihood`, normalized over the frame's candidate set.
    pub posterior: f32,
    #[serde(skip)]
    pub supporting_segments: Vec<Segment>,
}

impl VanishingPointCandidate {
    pub fn new(point: PixelPoint) -> Self {
        Self {
            point,
            prior: 1.0,
            likelihood: 0.0,
            posterior: 0.0,
            supporting_segments: Vec::new(),
        }
    }

    pub fn location(&self) -> ImagePoint {
        self.point.to_image()
    }
}
