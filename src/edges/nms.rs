//! Non‑maximum suppression on gradient magnitude with direction alignment.
//!
//! For each pixel, responses not strictly greater than both neighbours along
//! the quantized gradient direction are suppressed. The outermost 1‑pixel
//! frame is ignored so neighbour lookups stay in bounds.
use super::grad::Grad;
use crate::image::ImageView;
use serde::Serialize;

/// A sparse edge sample surviving NMS.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeElement {
    pub x: u32,
    pub y: u32,
    pub magnitude: f32,
}

const TAN_22_5_DEG: f32 = 0.41421356237;

/// Thin the gradient magnitude to one-pixel ridges, keeping only samples at or
/// above `mag_thresh`.
pub fn run_nms(grad: &Grad, mag_thresh: f32) -> Vec<EdgeElement> {
    let w = grad.gx.w;
    let h = grad.gx.h;
    if w < 3 || h < 3 {
        return Vec::new();
    }

    let inner_pixels = (w - 2) * (h - 2);
    let mut edges = Vec::with_capacity(inner_pixels / 8 + 1);
    for y in 1..h - 1 {
        let mag_prev = grad.mag.row(y - 1);
        let mag_row = grad.mag.row(y);
        let mag_next = grad.mag.row(y + 1);
        let gx_row = grad.gx.row(y);
        let gy_row = grad.gy.row(y);

        for x in 1..w - 1 {
            let mag = mag_row[x];
            if mag < mag_thresh {
                continue;
            }

            let gx = gx_row[x];
            let gy = gy_row[x];
            let abs_gx = gx.abs();
            let abs_gy = gy.abs();
            let same_sign = (gx >= 0.0 && gy >= 0.0) || (gx <= 0.0 && gy <= 0.0);

            let (neighbor1, neighbor2) = if abs_gx >= abs_gy {
                if abs_gy <= abs_gx * TAN_22_5_DEG {
                    (mag_row[x - 1], mag_row[x + 1])
                } else if same_sign {
                    (mag_prev[x - 1], mag_next[x + 1])
                } else {
                    (mag_prev[x + 1], mag_next[x - 1])
                }
            } else if abs_gx <= abs_gy * TAN_22_5_DEG {
                (mag_prev[x], mag_next[x])
            } else if same_sign {
                (mag_prev[x - 1], mag_next[x + 1])
            } else {
                (mag_prev[x + 1], mag_next[x - 1])
            };

            // Ties on the leading side keep plateaus one pixel wide.
            if mag < neighbor1 || mag <= neighbor2 {
                continue;
            }

            edges.push(EdgeElement {
                x: x as u32,
                y: y as u32,
                magnitude: mag,
            });
        }
    }

    edges
}
