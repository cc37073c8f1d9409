//! Per-frame diagnostics returned by
//! [`RoadFinder::process_with_diagnostics`](crate::RoadFinder::process_with_diagnostics).
//!
//! [`FrameReport`] mirrors the stage order of the pipeline: edges, segments,
//! vanishing point, tracking, center, then the published snapshot. All
//! structures serialize to camelCase JSON for the sequence tool.

pub mod report;
pub mod timing;

pub use report::{
    EdgeStage, FrameReport, InputDescriptor, LineDescriptor, SegmentStage, SmootherStage,
    VanishingPointStage,
};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
