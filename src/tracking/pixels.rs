//! Edge-pixel collection along candidate lines.
//!
//! Lines handled here are never close to horizontal, so every search walks
//! rows: on row `y` the line crosses at `xc`, and a pixel `(x, y)` lies at
//! perpendicular distance `|x - xc| * |uy|` where `uy` is the vertical
//! component of the unit direction.
use super::fitting::FittedLine;
use crate::edges::EdgeMap;
use crate::types::{ImagePoint, PixelPoint};

/// Perpendicular reach when collecting edge pixels around a line.
pub const PIXEL_SEARCH_RADIUS: f32 = 1.5;

/// Integer raster of the segment `a`–`b` (Bresenham), endpoints included.
pub fn raster_line(a: PixelPoint, b: PixelPoint) -> Vec<PixelPoint> {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (a.x, a.y);
    let mut out = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        out.push(PixelPoint::new(x, y));
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    out
}

/// Edge pixels lying exactly on the raster of `a`–`b`.
pub fn get_pixels_quick(a: PixelPoint, b: PixelPoint, edges: &EdgeMap) -> Vec<PixelPoint> {
    raster_line(a, b)
        .into_iter()
        .filter(|p| edges.is_edge(p.x, p.y))
        .collect()
}

/// Edge pixels within [`PIXEL_SEARCH_RADIUS`] of the line through `a` and
/// `b`, restricted to the rows the two points span. One pixel per row, the
/// one nearest the line.
pub fn get_pixels(a: ImagePoint, b: ImagePoint, edges: &EdgeMap) -> Vec<PixelPoint> {
    let Some(line) = FittedLine::through(a, b) else {
        return Vec::new();
    };
    let y0 = a.y.min(b.y).round() as i32;
    let y1 = a.y.max(b.y).round() as i32;
    collect_rows(&line, y0, y1, edges).points
}

/// Edge evidence gathered row by row along a line.
#[derive(Clone, Debug, Default)]
pub struct RowSupport {
    /// Nearest edge pixel on each row that had one.
    pub points: Vec<PixelPoint>,
    /// Rows where the line was inside the frame.
    pub rows: usize,
}

impl RowSupport {
    /// Fraction of visited rows that carried an edge pixel.
    pub fn density(&self) -> f32 {
        if self.rows == 0 {
            0.0
        } else {
            self.points.len() as f32 / self.rows as f32
        }
    }
}

/// Walks rows `y0..=y1` (clipped to the frame) and gathers the nearest edge
/// pixel within [`PIXEL_SEARCH_RADIUS`] of `line` on each.
pub fn collect_rows(line: &FittedLine, y0: i32, y1: i32, edges: &EdgeMap) -> RowSupport {
    let mut support = RowSupport::default();
    let uy = line.direction[1].abs();
    if uy < 1e-3 || edges.w == 0 || edges.h == 0 {
        return support;
    }
    let reach = PIXEL_SEARCH_RADIUS / uy;
    let y0 = y0.max(0);
    let y1 = y1.min(edges.h as i32 - 1);
    let max_x = edges.w as f32 - 1.0;
    for y in y0..=y1 {
        let Some(xc) = line.x_at_row(y as f32) else {
            continue;
        };
        if xc < 0.0 || xc > max_x {
            continue;
        }
        support.rows += 1;
        let lo = (xc - reach).ceil() as i32;
        let hi = (xc + reach).floor() as i32;
        let mut best: Option<(f32, i32)> = None;
        for x in lo..=hi {
            if !edges.is_edge(x, y) {
                continue;
            }
            let d = (x as f32 - xc).abs();
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, x));
            }
        }
        if let Some((_, x)) = best {
            support.points.push(PixelPoint::new(x, y));
        }
    }
    support
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_includes_both_endpoints() {
        let pts = raster_line(PixelPoint::new(2, 3), PixelPoint::new(9, 5));
        assert_eq!(pts.first(), Some(&PixelPoint::new(2, 3)));
        assert_eq!(pts.last(), Some(&PixelPoint::new(9, 5)));
        assert_eq!(pts.len(), 8);
        let rev = raster_line(PixelPoint::new(9, 5), PixelPoint::new(2, 3));
        assert_eq!(rev.len(), 8);
    }

    #[test]
    fn quick_pixels_only_hit_the_raster() {
        let on = raster_line(PixelPoint::new(10, 10), PixelPoint::new(20, 40));
        let mut edges = EdgeMap::from_points(50, 50, on.iter().copied());
        edges.set(30, 20);
        let hits = get_pixels_quick(PixelPoint::new(10, 10), PixelPoint::new(20, 40), &edges);
        assert_eq!(hits.len(), on.len());
    }

    #[test]
    fn nearby_pixels_are_collected_once_per_row() {
        // Edge runs one column right of the query line.
        let edges = EdgeMap::from_points(40, 60, (0..60).map(|y| PixelPoint::new(21, y)));
        let pts = get_pixels(ImagePoint::new(20.0, 5.0), ImagePoint::new(20.0, 44.0), &edges);
        assert_eq!(pts.len(), 40);
        assert!(pts.iter().all(|p| p.x == 21));

        let far = get_pixels(ImagePoint::new(17.0, 5.0), ImagePoint::new(17.0, 44.0), &edges);
        assert!(far.is_empty());
    }

    #[test]
    fn rows_outside_the_frame_are_not_counted() {
        let edges = EdgeMap::new(50, 50);
        let line = FittedLine::through(ImagePoint::new(25.0, 0.0), ImagePoint::new(75.0, 50.0)).unwrap();
        let support = collect_rows(&line, 0, 49, &edges);
        assert_eq!(support.rows, 25);
        assert_eq!(support.density(), 0.0);
    }
}
