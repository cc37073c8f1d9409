//! Road finder pipeline driving one frame end-to-end.
//!
//! Typical usage:
//! ```no_run
//! use road_finder::{RoadFinder, RoadFinderParams};
//! use road_finder::image::ImageU8;
//!
//! # fn example(gray: ImageU8) -> road_finder::error::Result<()> {
//! let finder = RoadFinder::new(RoadFinderParams::default())?;
//! finder.process(gray, None)?;
//! let (vp, confidence) = finder.current_vanishing_point();
//! println!("vp=({}, {}) confidence={confidence:.2}", vp.x, vp.y);
//! # Ok(())
//! # }
//! ```
//!
//! State is split over three mutexes: trajectory, tracking and the published
//! snapshot. A frame copies its detection stages out of the tracking domain,
//! detects without any lock, then takes tracking, trajectory and snapshot one
//! after another, never holding two at once.
//! [`RoadFinder::reset_road_model`] holds all three, taken in the fixed order
//! trajectory, tracking, snapshot. Readers only ever lock the domain they
//! read, so they never observe a half-updated snapshot.
use super::params::RoadFinderParams;
use super::state::{RoadSnapshot, TrackingState, TrajectoryState};
use crate::center::RoadCenter;
use crate::diagnostics::{
    EdgeStage, FrameReport, InputDescriptor, LineDescriptor, SegmentStage, SmootherStage,
    TimingBreakdown, VanishingPointStage,
};
use crate::error::{Result, RoadFinderError};
use crate::image::{CanvasU8, ImageF32, ImageU8};
use crate::segments::SegmentFrame;
use crate::tracking::{vanishing_point_from_lines, Line, RoadGeometry, TrackingOutcome};
use crate::types::ImagePoint;
use crate::visual::{draw_overlay, OverlayStyle};
use crate::vp::VanishingPointCandidate;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::time::Instant;

/// Monocular road finder.
///
/// `process` and every accessor take `&self`; share the finder between a
/// capture thread and readers behind an `Arc`.
pub struct RoadFinder {
    trajectory: Mutex<TrajectoryState>,
    tracking: Mutex<TrackingState>,
    published: Mutex<RoadSnapshot>,
}

/// What the tracking domain hands to the later domains.
struct FrameOutcome {
    epoch: u64,
    vanishing_point: Option<ImagePoint>,
    center: Option<RoadCenter>,
    confidence: f32,
    filtered_target_x: Option<f32>,
    lines: Vec<Line>,
}

impl RoadFinder {
    pub fn new(params: RoadFinderParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            trajectory: Mutex::new(TrajectoryState::default()),
            tracking: Mutex::new(TrackingState::new(params)),
            published: Mutex::new(RoadSnapshot::default()),
        })
    }

    /// Processes one frame and optionally draws the overlay into `canvas`.
    /// The canvas keeps its content; the overlay is drawn on top.
    pub fn process(&self, frame: ImageU8<'_>, canvas: Option<&mut CanvasU8<'_>>) -> Result<()> {
        self.process_with_diagnostics(frame, canvas).map(|_| ())
    }

    /// Like [`process`](Self::process) but returns a per-stage report.
    ///
    /// Edge detection, segment extraction and vanishing-point voting run
    /// without any lock held. The tracking lock covers only the line update,
    /// the center and the smoother.
    pub fn process_with_diagnostics(
        &self,
        frame: ImageU8<'_>,
        canvas: Option<&mut CanvasU8<'_>>,
    ) -> Result<FrameReport> {
        if let Some(c) = canvas.as_deref() {
            if !c.covers(frame.w, frame.h) {
                return Err(RoadFinderError::CanvasTooSmall {
                    canvas_width: c.w,
                    canvas_height: c.h,
                    width: frame.w,
                    height: frame.h,
                });
            }
        }
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let stages = self.tracking.lock().stages();
        let (min_w, min_h) = stages.params.min_frame_size();
        frame.validate(min_w, min_h)?;
        let geometry = RoadGeometry {
            horizon: stages.params.horizon,
            support: stages.params.support,
            width: frame.w,
            height: frame.h,
        };

        let start = Instant::now();
        let gray = ImageF32::from_u8(&frame);
        let extracted = stages.extractor.extract(&gray, geometry.horizon);
        timings.lap("segments", start);

        let start = Instant::now();
        let estimate = stages.estimator.estimate(
            &extracted.segments,
            stages.previous_vp,
            frame.w,
            frame.h,
        );
        timings.lap("vanishing_point", start);

        let mut report = Self::detection_report(&geometry, stages.epoch, &extracted, estimate);
        let outcome = {
            let mut guard = self.tracking.lock();
            (guard.epoch == stages.epoch).then(|| {
                Self::track_frame(&mut guard, &geometry, &extracted, &mut report, &mut timings)
            })
        };

        if let Some(x) = outcome.as_ref().and_then(|o| o.filtered_target_x) {
            let mut trajectory = self.trajectory.lock();
            if trajectory.epoch == stages.epoch {
                let w = geometry.width as f32;
                trajectory.accumulated += (x - 0.5 * w) / w;
            }
        }

        let (published, snapshot) = {
            let mut snapshot = self.published.lock();
            let fresh = match &outcome {
                Some(o) if snapshot.epoch == o.epoch => {
                    Self::publish(&mut snapshot, o);
                    true
                }
                _ => false,
            };
            (fresh, *snapshot)
        };
        if !published {
            debug!(
                "frame {} superseded by reset (epoch {} -> {})",
                report.frame_index, stages.epoch, snapshot.epoch
            );
        }

        if let Some(canvas) = canvas {
            let start = Instant::now();
            let lines = outcome.as_ref().map_or(&[][..], |o| o.lines.as_slice());
            draw_overlay(
                canvas,
                &report.segments.segments,
                lines,
                &snapshot,
                &geometry,
                &OverlayStyle::default(),
            );
            timings.lap("overlay", start);
        }

        timings.total_ms = crate::diagnostics::elapsed_ms(total_start);
        report.published = published;
        report.snapshot = snapshot;
        report.timings = timings;
        Ok(report)
    }

    /// Report of the lock-free detection stages; tracking fills in the rest.
    fn detection_report(
        geometry: &RoadGeometry,
        epoch: u64,
        extracted: &SegmentFrame,
        estimate: Option<VanishingPointCandidate>,
    ) -> FrameReport {
        FrameReport {
            input: InputDescriptor {
                width: geometry.width,
                height: geometry.height,
                horizon: geometry.horizon,
                support: geometry.support,
            },
            frame_index: 0,
            epoch,
            tracked: false,
            edges: EdgeStage {
                edge_pixels: extracted.edges.edges.count(),
            },
            segments: SegmentStage {
                raw: extracted.raw_count,
                kept: extracted.segments.len(),
                segments: extracted.segments.clone(),
            },
            vanishing_point: VanishingPointStage {
                estimate,
                from_lines: None,
                stability: 0.0,
            },
            tracking: TrackingOutcome::default(),
            lines: Vec::new(),
            center: None,
            smoother: SmootherStage::default(),
            published: false,
            snapshot: RoadSnapshot::default(),
            timings: TimingBreakdown::default(),
        }
    }

    /// Runs every stage that touches tracking state. Called with the tracking
    /// lock held.
    fn track_frame(
        state: &mut TrackingState,
        geometry: &RoadGeometry,
        extracted: &SegmentFrame,
        report: &mut FrameReport,
        timings: &mut TimingBreakdown,
    ) -> FrameOutcome {
        state.frames += 1;
        let estimate = report.vanishing_point.estimate.as_ref();

        let start = Instant::now();
        let edges = &extracted.edges.edges;
        let tracking = state.tracker.update(edges, estimate, geometry);
        let from_lines = vanishing_point_from_lines(state.tracker.active_lines());
        timings.lap("tracking", start);

        let vanishing_point = from_lines.or_else(|| estimate.map(|c| c.location()));
        state.stability.record(vanishing_point.is_some());
        if vanishing_point.is_some() {
            state.previous_vp = vanishing_point;
        }

        let start = Instant::now();
        let center = {
            let mut active = state.tracker.model_mut().active_lines_mut();
            state.center.compute_center(edges, &mut active, geometry)
        };
        let stability = state.stability.ratio();
        // No vanishing point means the road is lost, even when a single
        // remaining boundary still yields a center.
        let (confidence, filtered_target_x) = match &center {
            Some(c) if c.confidence > 0.0 && vanishing_point.is_some() => {
                (c.confidence * stability, Some(state.smoother.update(c.target.x)))
            }
            _ => {
                state.smoother.mark_lost();
                (0.0, None)
            }
        };
        timings.lap("center", start);

        if filtered_target_x.is_none() && tracking.lost > 0 {
            warn!("frame {}: road lost, keeping last estimate", state.frames);
        }
        debug!(
            "frame {}: vp={:?} active={} confidence={:.3}",
            state.frames, vanishing_point, tracking.active, confidence
        );

        let lines: Vec<Line> = state.tracker.active_lines().cloned().collect();
        report.frame_index = state.frames;
        report.tracked = true;
        report.vanishing_point.from_lines = from_lines;
        report.vanishing_point.stability = stability;
        report.tracking = tracking;
        report.lines = lines.iter().map(LineDescriptor::from).collect();
        report.center = center;
        report.smoother = SmootherStage {
            needs_init: state.smoother.needs_init(),
            lost_frames: state.smoother.lost_frames(),
        };
        FrameOutcome {
            epoch: state.epoch,
            vanishing_point,
            center,
            confidence,
            filtered_target_x,
            lines,
        }
    }

    /// Writes a frame's results into the snapshot. Loss of tracking zeroes
    /// the confidence and keeps everything else.
    fn publish(snapshot: &mut RoadSnapshot, outcome: &FrameOutcome) {
        snapshot.confidence = outcome.confidence;
        if let Some(vp) = outcome.vanishing_point {
            snapshot.vanishing_point = vp.round();
        }
        if let (Some(c), Some(x)) = (&outcome.center, outcome.filtered_target_x) {
            snapshot.center = c.center;
            snapshot.target = c.target;
            snapshot.filtered_target_x = x;
            snapshot.valid = true;
        }
    }

    /// Clears tracked lines, filter state, trajectory and the snapshot.
    /// Frames still in flight under the previous epoch are not published.
    pub fn reset_road_model(&self) {
        let mut trajectory = self.trajectory.lock();
        let mut tracking = self.tracking.lock();
        let mut published = self.published.lock();
        let epoch = tracking.epoch + 1;
        *trajectory = TrajectoryState {
            accumulated: 0.0,
            epoch,
        };
        tracking.clear(epoch);
        *published = RoadSnapshot {
            epoch,
            ..RoadSnapshot::default()
        };
        info!("road model reset (epoch {epoch})");
    }

    /// Validates and installs `params`, then resets as
    /// [`reset_road_model`](Self::reset_road_model) does.
    pub fn set_params(&self, params: RoadFinderParams) -> Result<()> {
        params.validate()?;
        let mut trajectory = self.trajectory.lock();
        let mut tracking = self.tracking.lock();
        let mut published = self.published.lock();
        let epoch = tracking.epoch + 1;
        *trajectory = TrajectoryState {
            accumulated: 0.0,
            epoch,
        };
        tracking.reconfigure(params, epoch);
        *published = RoadSnapshot {
            epoch,
            ..RoadSnapshot::default()
        };
        info!("parameters updated (epoch {epoch})");
        Ok(())
    }

    pub fn params(&self) -> RoadFinderParams {
        self.tracking.lock().params.clone()
    }

    /// Published vanishing point and confidence.
    pub fn current_vanishing_point(&self) -> (crate::types::PixelPoint, f32) {
        let s = self.published.lock();
        (s.vanishing_point, s.confidence)
    }

    pub fn current_center_point(&self) -> ImagePoint {
        self.published.lock().center
    }

    pub fn current_target_point(&self) -> ImagePoint {
        self.published.lock().target
    }

    pub fn filtered_target_x(&self) -> f32 {
        self.published.lock().filtered_target_x
    }

    /// Full published snapshot, read under a single lock.
    pub fn snapshot(&self) -> RoadSnapshot {
        *self.published.lock()
    }

    /// Sum of normalized lateral target offsets since the last reset.
    pub fn accumulated_trajectory(&self) -> f32 {
        self.trajectory.lock().accumulated
    }

    /// Copies of the currently active lines.
    pub fn tracked_lines(&self) -> Vec<Line> {
        self.tracking.lock().tracker.active_lines().cloned().collect()
    }

    /// Line identities handed out since construction; survives resets.
    pub fn identified_lines(&self) -> u64 {
        self.tracking.lock().tracker.identified_lines()
    }
}
