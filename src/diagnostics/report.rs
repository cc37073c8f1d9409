use super::timing::TimingBreakdown;
use crate::center::RoadCenter;
use crate::finder::RoadSnapshot;
use crate::segments::Segment;
use crate::tracking::{Line, TrackingOutcome};
use crate::types::ImagePoint;
use crate::vp::VanishingPointCandidate;
use serde::Serialize;

/// Everything one call to
/// [`RoadFinder::process_with_diagnostics`](crate::RoadFinder::process_with_diagnostics)
/// computed.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub input: InputDescriptor,
    /// Zero when the frame was not tracked.
    pub frame_index: u64,
    /// Reset generation the frame was processed under.
    pub epoch: u64,
    /// False when a reset landed between detection and tracking; the stages
    /// after vanishing-point voting were then skipped.
    pub tracked: bool,
    pub edges: EdgeStage,
    pub segments: SegmentStage,
    pub vanishing_point: VanishingPointStage,
    pub tracking: TrackingOutcome,
    pub lines: Vec<LineDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<RoadCenter>,
    pub smoother: SmootherStage,
    /// False when a concurrent reset superseded this frame before it was
    /// published.
    pub published: bool,
    pub snapshot: RoadSnapshot,
    pub timings: TimingBreakdown,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub horizon: i32,
    pub support: i32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStage {
    pub edge_pixels: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStage {
    pub raw: usize,
    pub kept: usize,
    pub segments: Vec<Segment>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VanishingPointStage {
    /// Winner of the grid vote, if it was accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<VanishingPointCandidate>,
    /// Intersection of the tracked lines, if at least two crossed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_lines: Option<ImagePoint>,
    pub stability: f32,
}

/// Target smoother state after the frame.
#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmootherStage {
    /// The next measurement restarts the filter.
    pub needs_init: bool,
    pub lost_frames: u32,
}

/// Compact view of one active line.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDescriptor {
    pub index: Option<usize>,
    pub score: f32,
    pub angle_deg: f32,
    pub left: bool,
    pub horizon_point: ImagePoint,
    pub horizon_support_point: ImagePoint,
    pub road_bottom_point: ImagePoint,
    pub support_pixels: usize,
    pub history_len: usize,
}

impl From<&Line> for LineDescriptor {
    fn from(line: &Line) -> Self {
        Self {
            index: line.index,
            score: line.score,
            angle_deg: line.angle.to_degrees(),
            left: line.is_left(),
            horizon_point: line.horizon_point,
            horizon_support_point: line.horizon_support_point,
            road_bottom_point: line.road_bottom_point,
            support_pixels: line.points.len(),
            history_len: line.scores.len(),
        }
    }
}
