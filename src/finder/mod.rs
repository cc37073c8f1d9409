//! The [`RoadFinder`] facade: parameters, lock domains and the per-frame
//! pipeline.
pub mod params;
mod pipeline;
mod state;

pub use params::{RoadFinderParams, MIN_FRAME_WIDTH};
pub use pipeline::RoadFinder;
pub use state::RoadSnapshot;
