#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod error;
pub mod finder;
pub mod image;
pub mod types;

// Stage modules – public for tools and tests, but considered internals.
pub mod angle;
pub mod center;
pub mod config;
pub mod edges;
pub mod filters;
pub mod kalman;
pub mod segments;
pub mod tracking;
pub mod visual;
pub mod vp;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{Result, RoadFinderError};
pub use crate::finder::{RoadFinder, RoadFinderParams, RoadSnapshot};

pub use crate::diagnostics::FrameReport;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use road_finder::prelude::*;
///
/// # fn main() -> road_finder::Result<()> {
/// let (w, h) = (320usize, 240usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let finder = RoadFinder::new(RoadFinderParams::default())?;
/// finder.process(img, None)?;
/// let (vp, confidence) = finder.current_vanishing_point();
/// println!("vp=({}, {}) confidence={confidence:.2}", vp.x, vp.y);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{CanvasU8, ImageU8};
    pub use crate::types::{ImagePoint, PixelPoint};
    pub use crate::{RoadFinder, RoadFinderParams, RoadSnapshot};
}
