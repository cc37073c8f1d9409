use road_finder::image::{CanvasU8, ImageU8};
use road_finder::{RoadFinder, RoadFinderParams};

const W: usize = 320;
const H: usize = 240;

/// Bright road triangle on a dark background, apex at `(apex_x, 70)`.
fn synthetic_road(apex_x: f32) -> Vec<u8> {
    let mut gray = vec![60u8; W * H];
    let apex_y = 70.0f32;
    for y in 71..H {
        let t = (y as f32 - apex_y) / (H as f32 - 1.0 - apex_y);
        let left = apex_x + t * (20.0 - apex_x);
        let right = apex_x + t * (300.0 - apex_x);
        for x in 0..W {
            let xf = x as f32;
            if xf >= left && xf <= right {
                gray[y * W + x] = 180;
            }
        }
    }
    gray
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> road_finder::Result<()> {
    let finder = RoadFinder::new(RoadFinderParams::default())?;
    for (i, apex) in [160.0, 162.0, 165.0, 168.0, 170.0].iter().enumerate() {
        let gray = synthetic_road(*apex);
        let mut overlay = gray.clone();
        let mut canvas = CanvasU8::new(W, H, &mut overlay);
        let report = finder.process_with_diagnostics(ImageU8::new(W, H, &gray), Some(&mut canvas))?;
        let (vp, confidence) = finder.current_vanishing_point();
        println!(
            "frame={} vp=({}, {}) confidence={:.3} target_x={:.1} lines={} latency_ms={:.3}",
            i,
            vp.x,
            vp.y,
            confidence,
            finder.filtered_target_x(),
            report.lines.len(),
            report.timings.total_ms
        );
    }
    println!(
        "identified_lines={} accumulated_trajectory={:.4}",
        finder.identified_lines(),
        finder.accumulated_trajectory()
    );
    Ok(())
}
