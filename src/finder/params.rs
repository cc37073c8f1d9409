//! Parameter set of the road finder.
//!
//! The four geometry knobs mirror the classic tuning of the finder:
//! `horizon` (first candidate row), `support` (offset of the row the road
//! center is measured on), `spacing` (vanishing-point grid pitch) and
//! `distthresh` (how close a segment's line must pass a candidate). The
//! nested blocks tune individual stages and all default when omitted from
//! JSON.
use crate::center::CenterParams;
use crate::edges::EdgeParams;
use crate::error::{Result, RoadFinderError};
use crate::kalman::SmootherParams;
use crate::segments::SegmentParams;
use crate::tracking::TrackerParams;
use crate::vp::{VpGrid, VpParams};
use serde::{Deserialize, Serialize};

/// Narrowest frame the pipeline accepts.
pub const MIN_FRAME_WIDTH: usize = 16;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadFinderParams {
    pub horizon: i32,
    pub support: i32,
    pub spacing: u32,
    pub distthresh: u32,
    pub edges: EdgeParams,
    pub segments: SegmentParams,
    pub vp: VpParams,
    pub tracker: TrackerParams,
    pub center: CenterParams,
    pub smoother: SmootherParams,
}

impl Default for RoadFinderParams {
    fn default() -> Self {
        Self {
            horizon: 70,
            support: 20,
            spacing: 20,
            distthresh: 40,
            edges: EdgeParams::default(),
            segments: SegmentParams::default(),
            vp: VpParams::default(),
            tracker: TrackerParams::default(),
            center: CenterParams::default(),
            smoother: SmootherParams::default(),
        }
    }
}

impl RoadFinderParams {
    pub fn vp_grid(&self) -> VpGrid {
        VpGrid {
            horizon: self.horizon,
            band: self.support,
            spacing: self.spacing,
            distthresh: self.distthresh,
        }
    }

    pub fn support_row(&self) -> i32 {
        self.horizon + self.support
    }

    /// Smallest `(width, height)` frame these parameters can run on: the
    /// bottom row must lie strictly below the support row.
    pub fn min_frame_size(&self) -> (usize, usize) {
        let min_h = (self.support_row() + 2).max(1) as usize;
        (MIN_FRAME_WIDTH, min_h)
    }

    pub fn validate(&self) -> Result<()> {
        fn bad(msg: impl Into<String>) -> Result<()> {
            Err(RoadFinderError::InvalidParams(msg.into()))
        }
        if self.horizon < 0 {
            return bad(format!("horizon must be >= 0, got {}", self.horizon));
        }
        if self.support <= 0 {
            return bad(format!("support must be > 0, got {}", self.support));
        }
        if self.spacing == 0 {
            return bad("spacing must be > 0");
        }
        if self.distthresh == 0 {
            return bad("distthresh must be > 0");
        }
        let e = &self.edges;
        if !(e.low_threshold > 0.0 && e.high_threshold >= e.low_threshold) {
            return bad(format!(
                "edge thresholds must satisfy 0 < low <= high, got low={} high={}",
                e.low_threshold, e.high_threshold
            ));
        }
        if self.vp.stability_window == 0 {
            return bad("vp.stability_window must be > 0");
        }
        if !(self.vp.prior_sigma > 0.0) {
            return bad("vp.prior_sigma must be > 0");
        }
        let t = &self.tracker;
        if !(0.0..=1.0).contains(&t.active_threshold) {
            return bad(format!(
                "tracker.active_threshold must lie in [0, 1], got {}",
                t.active_threshold
            ));
        }
        if t.score_history_len == 0 {
            return bad("tracker.score_history_len must be > 0");
        }
        let s = &self.smoother;
        if !(s.process_noise > 0.0 && s.measurement_noise > 0.0 && s.initial_covariance > 0.0) {
            return bad("smoother noise terms must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = RoadFinderParams::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.min_frame_size(), (MIN_FRAME_WIDTH, 92));
        let g = p.vp_grid();
        assert_eq!((g.horizon, g.band, g.spacing, g.distthresh), (70, 20, 20, 40));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let p = RoadFinderParams {
            spacing: 0,
            ..RoadFinderParams::default()
        };
        assert!(matches!(p.validate(), Err(RoadFinderError::InvalidParams(_))));
        let mut p = RoadFinderParams::default();
        p.edges.low_threshold = 0.8;
        assert!(p.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let p: RoadFinderParams =
            serde_json::from_str(r#"{ "horizon": 50, "tracker": { "merge_dist_px": 8.0 } }"#).unwrap();
        assert_eq!(p.horizon, 50);
        assert_eq!(p.support, 20);
        assert_eq!(p.tracker.merge_dist_px, 8.0);
        assert_eq!(p.tracker.reactivation_frames, 15);
    }
}
