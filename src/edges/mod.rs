//! Edge detection: blur, gradients, non‑maximum suppression and hysteresis.
//!
//! The default [`CannyEdgeDetector`] produces a thin binary [`EdgeMap`] plus
//! the gradient buffers it was derived from, so segment extraction can reuse
//! orientations without recomputing them.
//!
//! Borders clamp during convolution; NMS ignores the outermost pixel frame.

pub mod grad;
pub mod hysteresis;
pub mod map;
pub mod nms;

pub use grad::{image_gradients, Grad, GradientKernel};
pub use hysteresis::link_edges;
pub use map::EdgeMap;
pub use nms::{run_nms, EdgeElement};

use crate::filters::{apply as apply_filter, GAUSSIAN_5TAP};
use crate::image::ImageF32;
use serde::{Deserialize, Serialize};

/// Edge map together with the gradients that produced it.
#[derive(Clone, Debug, Default)]
pub struct EdgeFrame {
    pub edges: EdgeMap,
    pub grad: Grad,
}

/// Capability interface for edge detection.
pub trait EdgeDetector: Send + Sync {
    fn detect(&self, frame: &ImageF32) -> EdgeFrame;
}

/// Parameters of the Canny-style detector. Thresholds are in gradient
/// magnitude units for a `[0, 1]` intensity image.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub blur: bool,
    pub kernel: GradientKernel,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_threshold: 0.2,
            high_threshold: 0.5,
            blur: true,
            kernel: GradientKernel::Sobel,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CannyEdgeDetector {
    pub params: EdgeParams,
}

impl CannyEdgeDetector {
    pub fn new(params: EdgeParams) -> Self {
        Self { params }
    }
}

impl EdgeDetector for CannyEdgeDetector {
    fn detect(&self, frame: &ImageF32) -> EdgeFrame {
        let smoothed;
        let src = if self.params.blur {
            smoothed = apply_filter(&GAUSSIAN_5TAP, frame);
            &smoothed
        } else {
            frame
        };
        let grad = image_gradients(src, self.params.kernel);
        let low = self.params.low_threshold.min(self.params.high_threshold);
        let elements = run_nms(&grad, low);
        let edges = link_edges(frame.w, frame.h, &elements, low, self.params.high_threshold);
        EdgeFrame { edges, grad }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_step_yields_thin_edge_column() {
        let mut img = ImageF32::new(32, 24);
        for y in 0..24 {
            for x in 16..32 {
                img.set(x, y, 1.0);
            }
        }
        let frame = CannyEdgeDetector::default().detect(&img);
        for y in 2..22 {
            let hits: Vec<usize> = (0..32).filter(|&x| frame.edges.is_edge(x as i32, y)).collect();
            assert_eq!(hits.len(), 1, "row {y} hits {hits:?}");
            assert!((15..=16).contains(&hits[0]));
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = ImageF32::new(16, 16);
        let frame = CannyEdgeDetector::default().detect(&img);
        assert_eq!(frame.edges.count(), 0);
    }
}
