//! Runs the road finder over a frame sequence described by a JSON config and
//! writes one report per frame, plus optional overlay images.
//!
//! Usage: `road_sequence <config.json>`
use log::{info, warn};
use road_finder::config::load_config;
use road_finder::image::io::{load_grayscale_image, save_grayscale_u8, write_json_file};
use road_finder::{FrameReport, RoadFinder};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SequenceReport {
    frames: Vec<FrameEntry>,
    identified_lines: u64,
    accumulated_trajectory: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameEntry {
    path: PathBuf,
    report: FrameReport,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: road_sequence <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path)).map_err(|e| e.to_string())?;
    let paths = config.frame_paths().map_err(|e| e.to_string())?;
    if paths.is_empty() {
        return Err("no input frames configured".to_string());
    }

    let finder = RoadFinder::new(config.params.clone()).map_err(|e| e.to_string())?;
    let mut frames = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        if config.reset_every > 0 && i > 0 && i % config.reset_every == 0 {
            finder.reset_road_model();
        }
        let gray = load_grayscale_image(path).map_err(|e| e.to_string())?;
        let mut overlay = gray.clone();
        let report = {
            let mut canvas = overlay.as_canvas();
            let canvas = config.output.overlay_dir.as_ref().map(|_| &mut canvas);
            match finder.process_with_diagnostics(gray.as_view(), canvas) {
                Ok(report) => report,
                Err(err) => {
                    warn!("skipping {}: {err}", path.display());
                    continue;
                }
            }
        };
        if let Some(dir) = &config.output.overlay_dir {
            let name = path
                .file_stem()
                .map(|s| format!("{}_overlay.png", s.to_string_lossy()))
                .unwrap_or_else(|| format!("{i:05}_overlay.png"));
            save_grayscale_u8(&overlay, &dir.join(name)).map_err(|e| e.to_string())?;
        }
        info!(
            "{}: confidence={:.3} target_x={:.1} active_lines={}",
            path.display(),
            report.snapshot.confidence,
            report.snapshot.filtered_target_x,
            report.tracking.active
        );
        frames.push(FrameEntry {
            path: path.clone(),
            report,
        });
    }

    let summary = SequenceReport {
        frames,
        identified_lines: finder.identified_lines(),
        accumulated_trajectory: finder.accumulated_trajectory(),
    };
    write_json_file(&config.output.report_json, &summary).map_err(|e| e.to_string())?;
    println!(
        "Processed {} frames -> {}",
        summary.frames.len(),
        config.output.report_json.display()
    );
    Ok(())
}
