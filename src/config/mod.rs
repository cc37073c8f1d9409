//! JSON configuration of the `road_sequence` tool.
//!
//! ```json
//! {
//!   "input_dir": "frames/",
//!   "params": { "horizon": 70, "support": 20 },
//!   "output": { "report_json": "out/report.json", "overlay_dir": "out/overlay" }
//! }
//! ```
//! `frames` lists files explicitly; otherwise every PNG/JPEG in `input_dir`
//! is processed in file-name order.
use crate::error::{Result, RoadFinderError};
use crate::finder::RoadFinderParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct SequenceToolConfig {
    #[serde(default)]
    pub frames: Vec<PathBuf>,
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    #[serde(default)]
    pub params: RoadFinderParams,
    /// Reset the road model every N frames; 0 never resets.
    #[serde(default)]
    pub reset_every: usize,
    pub output: SequenceOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct SequenceOutputConfig {
    pub report_json: PathBuf,
    #[serde(default)]
    pub overlay_dir: Option<PathBuf>,
}

impl SequenceToolConfig {
    /// Frames to process, explicit list first.
    pub fn frame_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.frames.is_empty() {
            return Ok(self.frames.clone());
        }
        let Some(dir) = &self.input_dir else {
            return Ok(Vec::new());
        };
        let entries = fs::read_dir(dir).map_err(|source| RoadFinderError::Io {
            path: dir.clone(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RoadFinderError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}

pub fn load_config(path: &Path) -> Result<SequenceToolConfig> {
    let data = fs::read_to_string(path).map_err(|source| RoadFinderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SequenceToolConfig =
        serde_json::from_str(&data).map_err(|source| RoadFinderError::Config {
            path: path.to_path_buf(),
            source,
        })?;
    config.params.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let cfg: SequenceToolConfig = serde_json::from_str(
            r#"{ "frames": ["a.png", "b.png"], "output": { "report_json": "r.json" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.frame_paths().unwrap().len(), 2);
        assert_eq!(cfg.params.horizon, 70);
        assert_eq!(cfg.reset_every, 0);
        assert!(cfg.output.overlay_dir.is_none());
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, RoadFinderError::Io { .. }));
    }

    #[test]
    fn image_extensions() {
        assert!(is_image(Path::new("f/0001.PNG")));
        assert!(is_image(Path::new("f/0001.jpeg")));
        assert!(!is_image(Path::new("f/notes.txt")));
    }
}
