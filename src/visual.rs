//! Debug overlay drawn onto a grayscale canvas.
//!
//! Every primitive is clipped to the canvas; nothing here can index out of
//! bounds.
use crate::finder::RoadSnapshot;
use crate::image::CanvasU8;
use crate::segments::Segment;
use crate::tracking::{raster_line, Line, RoadGeometry};
use crate::types::{PixelPoint, ScreenPoint};

/// Gray levels used for each overlay element.
#[derive(Clone, Copy, Debug)]
pub struct OverlayStyle {
    pub segment: u8,
    pub line: u8,
    pub rows: u8,
    pub vanishing_point: u8,
    pub center: u8,
    pub target: u8,
    pub marker_radius: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            segment: 192,
            line: 255,
            rows: 128,
            vanishing_point: 255,
            center: 0,
            target: 255,
            marker_radius: 4,
        }
    }
}

/// Draws the reference rows, the frame's segments and active lines, then the
/// published estimate when it is valid.
pub fn draw_overlay(
    canvas: &mut CanvasU8<'_>,
    segments: &[Segment],
    lines: &[Line],
    snapshot: &RoadSnapshot,
    geometry: &RoadGeometry,
    style: &OverlayStyle,
) {
    let w = geometry.width as i32;
    // Horizon dashed, support row dotted.
    for x in (0..w).step_by(4) {
        canvas.put(x, geometry.horizon, style.rows);
        canvas.put(x + 1, geometry.horizon, style.rows);
    }
    for x in (0..w).step_by(3) {
        canvas.put(x, geometry.support_row(), style.rows);
    }

    for seg in segments {
        draw_segment(canvas, seg.p1, seg.p2, style.segment);
    }
    for line in lines.iter().filter(|l| l.is_active) {
        draw_segment(
            canvas,
            screen_pixel(line.on_screen_horizon_point),
            screen_pixel(line.on_screen_road_bottom_point),
            style.line,
        );
    }

    if !snapshot.valid {
        return;
    }
    let r = style.marker_radius;
    let vp = snapshot.vanishing_point;
    draw_cross(canvas, vp, r, style.vanishing_point);
    draw_box(canvas, snapshot.center.round(), r / 2, style.center);

    let target = PixelPoint::new(snapshot.filtered_target_x.round() as i32, geometry.horizon);
    let origin = PixelPoint::new(w / 2, geometry.bottom_row());
    draw_segment(canvas, origin, target, style.target);
    draw_cross(canvas, target, r, style.target);
}

fn screen_pixel(p: ScreenPoint) -> PixelPoint {
    PixelPoint::new(p.x.round() as i32, p.y.round() as i32)
}

/// Segment raster clipped to the canvas. Endpoints far outside the frame are
/// pulled in first so the raster stays short.
fn draw_segment(canvas: &mut CanvasU8<'_>, a: PixelPoint, b: PixelPoint, value: u8) {
    let limit = (canvas.w.max(canvas.h) as i32).saturating_mul(4);
    let clamp = |p: PixelPoint| PixelPoint::new(p.x.clamp(-limit, limit), p.y.clamp(-limit, limit));
    for p in raster_line(clamp(a), clamp(b)) {
        canvas.put(p.x, p.y, value);
    }
}

fn draw_cross(canvas: &mut CanvasU8<'_>, c: PixelPoint, r: i32, value: u8) {
    for d in -r..=r {
        canvas.put(c.x.saturating_add(d), c.y, value);
        canvas.put(c.x, c.y.saturating_add(d), value);
    }
}

fn draw_box(canvas: &mut CanvasU8<'_>, c: PixelPoint, r: i32, value: u8) {
    for d in -r..=r {
        let (x, y) = (c.x.saturating_add(d), c.y.saturating_add(d));
        canvas.put(x, c.y.saturating_sub(r), value);
        canvas.put(x, c.y.saturating_add(r), value);
        canvas.put(c.x.saturating_sub(r), y, value);
        canvas.put(c.x.saturating_add(r), y, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::FittedLine;
    use crate::types::ImagePoint;

    fn geometry() -> RoadGeometry {
        RoadGeometry {
            horizon: 20,
            support: 10,
            width: 64,
            height: 48,
        }
    }

    #[test]
    fn overlay_marks_lines_and_rows() {
        let mut buf = vec![10u8; 64 * 48];
        let mut canvas = CanvasU8::new(64, 48, &mut buf);
        let fit = FittedLine::through(ImagePoint::new(32.0, 20.0), ImagePoint::new(0.0, 47.0)).unwrap();
        let line = Line::from_fit(&fit, &geometry()).unwrap();
        let snapshot = RoadSnapshot {
            vanishing_point: PixelPoint::new(32, 20),
            center: ImagePoint::new(32.0, 30.0),
            filtered_target_x: 32.0,
            valid: true,
            ..RoadSnapshot::default()
        };
        draw_overlay(
            &mut canvas,
            &[],
            &[line],
            &snapshot,
            &geometry(),
            &OverlayStyle::default(),
        );
        assert_eq!(buf[47 * 64], 255);
        assert_eq!(buf[20 * 64 + 4], 128);
        assert_eq!(buf[30 * 64 + 32 - 2], 0);
    }

    #[test]
    fn far_off_screen_geometry_does_not_panic() {
        let mut buf = vec![0u8; 16 * 16];
        let mut canvas = CanvasU8::new(16, 16, &mut buf);
        let geometry = RoadGeometry {
            horizon: 4,
            support: 4,
            width: 16,
            height: 16,
        };
        let snapshot = RoadSnapshot {
            vanishing_point: PixelPoint::new(-5000, 90000),
            center: ImagePoint::new(1e9, -1e9),
            filtered_target_x: -1e7,
            valid: true,
            ..RoadSnapshot::default()
        };
        draw_overlay(&mut canvas, &[], &[], &snapshot, &geometry, &OverlayStyle::default());
        draw_segment(&mut canvas, PixelPoint::new(i32::MIN, 0), PixelPoint::new(i32::MAX, 15), 9);
    }
}
