use serde::{Deserialize, Serialize};

/// Options controlling region growth in the LSD-like transform.
///
/// - `enforce_polarity`: Compare signed angles (no pi folding) during growth to
///   avoid fusing opposite-polarity parallel edges.
/// - `normal_span_limit_px`: Cap the perpendicular thickness of a grown region.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LsdOptions {
    /// Minimum gradient magnitude for region pixels.
    pub magnitude_threshold: f32,
    /// Orientation tolerance around the seed normal in degrees.
    pub angle_tolerance_deg: f32,
    /// Minimum accepted segment length in pixels.
    pub min_length_px: f32,
    /// Minimum number of pixels in a grown region.
    pub min_region_size: usize,
    /// Minimum share of region pixels aligned within half the tolerance.
    pub min_aligned_fraction: f32,
    pub enforce_polarity: bool,
    pub normal_span_limit_px: Option<f32>,
}

impl Default for LsdOptions {
    fn default() -> Self {
        Self {
            magnitude_threshold: 0.05,
            angle_tolerance_deg: 22.5,
            min_length_px: 10.0,
            min_region_size: 8,
            min_aligned_fraction: 0.6,
            enforce_polarity: false,
            normal_span_limit_px: Some(3.0),
        }
    }
}

/// Post-filters applied to extracted segments before vanishing-point voting.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    pub lsd: LsdOptions,
    /// Shortest segment kept (pixels).
    pub min_segment_length: f32,
    /// Segments closer than this to horizontal are dropped (degrees).
    pub min_angle_from_horizontal_deg: f32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            lsd: LsdOptions::default(),
            min_segment_length: 10.0,
            min_angle_from_horizontal_deg: 10.0,
        }
    }
}
