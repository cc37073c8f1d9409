//! The three lock domains of [`RoadFinder`](super::RoadFinder).
//!
//! Every domain carries the reset epoch it belongs to. A reset takes all
//! three locks and bumps the epoch in each; a frame writes into a domain only
//! while the domain's epoch still matches the one the frame started under.
use super::params::RoadFinderParams;
use crate::center::RoadCenterEstimator;
use crate::kalman::TemporalSmoother;
use crate::segments::SegmentExtractor;
use crate::tracking::LineTracker;
use crate::types::{ImagePoint, PixelPoint};
use crate::vp::{VanishingPointEstimator, VpStability};
use serde::Serialize;
use std::sync::Arc;

/// Values published to readers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadSnapshot {
    pub vanishing_point: PixelPoint,
    pub confidence: f32,
    pub center: ImagePoint,
    pub target: ImagePoint,
    pub filtered_target_x: f32,
    /// Reset generation the values were produced under.
    pub epoch: u64,
    /// False until the first frame with a usable estimate.
    pub valid: bool,
}

#[derive(Debug, Default)]
pub(crate) struct TrajectoryState {
    pub accumulated: f32,
    pub epoch: u64,
}

/// Detection stages copied out of the tracking domain so a frame can run
/// them without holding its lock.
pub(crate) struct FrameStages {
    pub params: RoadFinderParams,
    pub extractor: Arc<SegmentExtractor>,
    pub estimator: VanishingPointEstimator,
    pub previous_vp: Option<ImagePoint>,
    pub epoch: u64,
}

pub(crate) struct TrackingState {
    pub params: RoadFinderParams,
    pub extractor: Arc<SegmentExtractor>,
    pub estimator: VanishingPointEstimator,
    pub tracker: LineTracker,
    pub center: RoadCenterEstimator,
    pub smoother: TemporalSmoother,
    pub stability: VpStability,
    pub previous_vp: Option<ImagePoint>,
    pub epoch: u64,
    pub frames: u64,
}

impl TrackingState {
    pub fn new(params: RoadFinderParams) -> Self {
        Self {
            extractor: Arc::new(SegmentExtractor::new(params.edges, params.segments)),
            estimator: VanishingPointEstimator::new(params.vp_grid(), params.vp),
            tracker: LineTracker::new(params.tracker.clone()),
            center: RoadCenterEstimator::new(params.center.clone()),
            smoother: TemporalSmoother::new(&params.smoother),
            stability: VpStability::new(params.vp.stability_window),
            previous_vp: None,
            epoch: 0,
            frames: 0,
            params,
        }
    }

    pub fn stages(&self) -> FrameStages {
        FrameStages {
            params: self.params.clone(),
            extractor: Arc::clone(&self.extractor),
            estimator: self.estimator.clone(),
            previous_vp: self.previous_vp,
            epoch: self.epoch,
        }
    }

    /// Forgets everything learned from past frames. The tracker's identity
    /// counter survives.
    pub fn clear(&mut self, epoch: u64) {
        self.tracker.reset();
        self.smoother.reset();
        self.stability.clear();
        self.previous_vp = None;
        self.epoch = epoch;
    }

    /// Rebuilds every stage from `params`, keeping the identity counter.
    pub fn reconfigure(&mut self, params: RoadFinderParams, epoch: u64) {
        self.extractor = Arc::new(SegmentExtractor::new(params.edges, params.segments));
        self.estimator = VanishingPointEstimator::new(params.vp_grid(), params.vp);
        self.tracker.set_params(params.tracker.clone());
        self.center = RoadCenterEstimator::new(params.center.clone());
        self.smoother = TemporalSmoother::new(&params.smoother);
        self.stability = VpStability::new(params.vp.stability_window);
        self.params = params;
        self.clear(epoch);
    }
}
