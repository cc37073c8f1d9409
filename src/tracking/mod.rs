//! Line tracking across frames.
//!
//! Each frame the tracker
//! 1. re-fits every active line with a small local search around its previous
//!    horizon and bottom crossings, dropping lines whose fitness collapses;
//! 2. seeds fresh lines from the segments supporting the current vanishing
//!    point, grouping near-colinear segments and fitting their edge pixels;
//! 3. combines both sets: fresh lines either confirm an active line, revive a
//!    recently lost one, or register a new identity;
//! 4. discards duplicate active lines, keeping the fitter one.
//!
//! Identities are slot indices of the [`RoadModel`] arena; see
//! [`road_model`] for the reuse rules.
pub mod fitting;
pub mod line;
pub mod pixels;
pub mod road_model;
pub mod tracker;
pub mod vanishing;

pub use fitting::{FittedLine, LineFitter, TotalLeastSquaresFitter};
pub use line::{Line, RoadGeometry};
pub use pixels::{get_pixels, get_pixels_quick, raster_line};
pub use road_model::{LineSlot, RoadModel};
pub use tracker::{discard_duplicates, is_duplicate, LineTracker, TrackingOutcome};
pub use vanishing::vanishing_point_from_lines;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Minimum fitness for a line to be created or stay active.
    pub active_threshold: f32,
    /// Residual (px) at which fitness drops by a factor of e.
    pub fit_residual_scale: f32,
    /// Minimum supporting pixels before a line is scored at all.
    pub min_line_points: usize,
    /// Half-width of the local search around tracked endpoints, px.
    pub track_search_px: i32,
    pub track_search_step: i32,
    /// Colinearity tolerances used when grouping seed segments.
    pub group_angle_deg: f32,
    pub group_dist_px: f32,
    /// Two lines whose horizon and bottom crossings are both this close and
    /// whose orientations agree within `merge_angle_deg` are duplicates.
    pub merge_dist_px: f32,
    pub merge_angle_deg: f32,
    /// Frames an inactive line may be revived for.
    pub reactivation_frames: u64,
    pub reactivation_dist_px: f32,
    pub score_history_len: usize,
    pub start_history_len: usize,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            active_threshold: 0.3,
            fit_residual_scale: 2.0,
            min_line_points: 15,
            track_search_px: 4,
            track_search_step: 1,
            group_angle_deg: 5.0,
            group_dist_px: 4.0,
            merge_dist_px: 12.0,
            merge_angle_deg: 6.0,
            reactivation_frames: 15,
            reactivation_dist_px: 20.0,
            score_history_len: 50,
            start_history_len: 5,
        }
    }
}
