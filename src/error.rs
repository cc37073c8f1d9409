//! Error types for the road finder.
//!
//! Only boundary validation and file I/O fail with an error. Geometric
//! degeneracies inside the pipeline are dropped as `None`, and loss of
//! tracking is reported through a zero confidence.
use std::path::PathBuf;

/// Result type alias
pub type Result<T> = std::result::Result<T, RoadFinderError>;

#[derive(Debug, thiserror::Error)]
pub enum RoadFinderError {
    /// Zero-sized frame or empty pixel buffer
    #[error("input frame is empty")]
    EmptyFrame,

    /// Frame smaller than the configured geometry requires
    #[error("frame {width}x{height} is smaller than the required {min_width}x{min_height}")]
    FrameTooSmall {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },

    /// Pixel buffer shorter than its declared dimensions
    #[error("pixel buffer holds {actual} bytes, expected at least {expected}")]
    BufferTooShort { expected: usize, actual: usize },

    /// Visualization canvas cannot hold the input frame
    #[error("canvas {canvas_width}x{canvas_height} is smaller than the {width}x{height} input")]
    CanvasTooSmall {
        canvas_width: usize,
        canvas_height: usize,
        width: usize,
        height: usize,
    },

    /// Parameter set rejected by validation
    #[error("invalid parameter: {0}")]
    InvalidParams(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image error on {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
