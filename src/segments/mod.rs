//! Segment extraction: edge detection followed by a line-segment transform.
//!
//! The default transform is a lightweight LSD-like extractor:
//!
//! - Region growing from seeds using orientation consistency: edge pixels
//!   whose gradient orientation is within a tolerance of the seed are grown
//!   into a region. Growth is confined to the binary edge map.
//! - PCA line fitting: region coordinates are summarized online and the 2×2
//!   covariance is eigendecomposed to obtain the principal direction.
//! - Endpoint projection onto the principal axis, rounded to integer pixels.
//! - Significance tests: minimum region size, minimum length, minimum aligned
//!   fraction and an optional cap on the thickness across the line.
//!
//! After the transform, [`SegmentExtractor`] drops segments that cannot be
//! road boundaries: too short, too close to horizontal, or entirely above
//! the horizon row.
//!
//! Extraction is a pure function of the frame and the parameters.

mod extractor;
mod options;
mod region_accumulator;
mod segment;

pub use options::{LsdOptions, SegmentParams};
pub use segment::Segment;

use crate::angle::angle_from_horizontal;
use crate::edges::{CannyEdgeDetector, EdgeDetector, EdgeFrame, EdgeParams};
use crate::image::ImageF32;
use log::debug;

/// Capability interface for turning an edge frame into line segments.
pub trait SegmentTransform: Send + Sync {
    fn segments(&self, frame: &EdgeFrame) -> Vec<Segment>;
}

/// Region-growing transform over the edge map's gradients.
#[derive(Clone, Debug, Default)]
pub struct LsdTransform {
    pub options: LsdOptions,
}

impl SegmentTransform for LsdTransform {
    fn segments(&self, frame: &EdgeFrame) -> Vec<Segment> {
        if frame.grad.mag.w != frame.edges.w || frame.grad.mag.h != frame.edges.h {
            return Vec::new();
        }
        extractor::LsdExtractor::new(&frame.grad, Some(frame.edges.as_mask()), self.options)
            .extract()
    }
}

/// Output of one extraction pass.
#[derive(Clone, Debug, Default)]
pub struct SegmentFrame {
    pub edges: EdgeFrame,
    pub segments: Vec<Segment>,
    /// Segments produced by the transform before filtering.
    pub raw_count: usize,
}

/// Edge detection + segment transform + road-boundary filters.
pub struct SegmentExtractor {
    detector: Box<dyn EdgeDetector>,
    transform: Box<dyn SegmentTransform>,
    params: SegmentParams,
}

impl SegmentExtractor {
    pub fn new(edge_params: EdgeParams, params: SegmentParams) -> Self {
        Self::with_components(
            Box::new(CannyEdgeDetector::new(edge_params)),
            Box::new(LsdTransform {
                options: params.lsd,
            }),
            params,
        )
    }

    pub fn with_components(
        detector: Box<dyn EdgeDetector>,
        transform: Box<dyn SegmentTransform>,
        params: SegmentParams,
    ) -> Self {
        Self {
            detector,
            transform,
            params,
        }
    }

    pub fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Run the full extraction, keeping the edge frame for line-support search.
    pub fn extract(&self, frame: &ImageF32, horizon_row: i32) -> SegmentFrame {
        let edges = self.detector.detect(frame);
        let raw = self.transform.segments(&edges);
        let raw_count = raw.len();
        let segments = self.filter(raw, horizon_row);
        debug!(
            "segments: edges={} raw={} kept={}",
            edges.edges.count(),
            raw_count,
            segments.len()
        );
        SegmentFrame {
            edges,
            segments,
            raw_count,
        }
    }

    /// Convenience wrapper returning only the segments.
    pub fn extract_segments(&self, frame: &ImageF32, horizon_row: i32) -> Vec<Segment> {
        self.extract(frame, horizon_row).segments
    }

    fn filter(&self, segments: Vec<Segment>, horizon_row: i32) -> Vec<Segment> {
        let min_angle = self.params.min_angle_from_horizontal_deg.to_radians();
        segments
            .into_iter()
            .filter(|s| s.length >= self.params.min_segment_length)
            .filter(|s| angle_from_horizontal(s.angle) >= min_angle)
            .filter(|s| s.lower_point().y > horizon_row)
            .collect()
    }
}
