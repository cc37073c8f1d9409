use super::fitting::FittedLine;
use crate::segments::Segment;
use crate::types::{ImagePoint, PixelPoint, ScreenPoint};
use serde::Serialize;

/// Rows a line is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoadGeometry {
    /// Horizon row.
    pub horizon: i32,
    /// Support offset below the horizon.
    pub support: i32,
    pub width: usize,
    pub height: usize,
}

impl RoadGeometry {
    #[inline]
    pub fn support_row(&self) -> i32 {
        self.horizon + self.support
    }

    #[inline]
    pub fn bottom_row(&self) -> i32 {
        self.height as i32 - 1
    }
}

/// A tracked road boundary.
///
/// Geometry is carried by three image-space points on the same infinite line:
/// its crossings of the horizon row, the support row and the bottom row. The
/// `on_screen_*` copies are clamped for drawing only.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Line {
    /// Stable identity; `None` until the road model registers the line.
    pub index: Option<usize>,
    pub length: f32,
    /// Undirected orientation in [0, π).
    pub angle: f32,
    /// Fitness of the latest update in [0, 1].
    pub score: f32,
    /// Edge pixels supporting the current fit.
    pub points: Vec<PixelPoint>,
    pub horizon_point: ImagePoint,
    pub horizon_support_point: ImagePoint,
    pub road_bottom_point: ImagePoint,
    pub on_screen_horizon_point: ScreenPoint,
    pub on_screen_horizon_support_point: ScreenPoint,
    pub on_screen_road_bottom_point: ScreenPoint,
    /// Bounded history of per-frame scores, oldest first.
    pub scores: Vec<f32>,
    /// Scores from the first frames of the line's life.
    pub start_scores: Vec<f32>,
    pub is_active: bool,
    /// Learned horizontal offset from the support point to the road center.
    pub offset: f32,
    /// Learned angle between this boundary and the center ray, radians.
    pub angle_to_center: f32,
    /// Support-row point the center was last derived from.
    pub point_to_servo: ImagePoint,
    /// True once `offset` and `angle_to_center` were learned from a
    /// two-sided observation.
    pub has_center_relation: bool,
    /// Segments that seeded the line.
    #[serde(skip)]
    pub segments: Vec<Segment>,
}

impl Line {
    /// Builds an active, unregistered line from a fit. `None` when the fit is
    /// too close to horizontal to cross the horizon and bottom rows.
    pub fn from_fit(fit: &FittedLine, geometry: &RoadGeometry) -> Option<Self> {
        let mut line = Line {
            is_active: true,
            ..Line::default()
        };
        line.set_geometry(fit, geometry).then_some(line)
    }

    /// Replaces the geometric state with the one implied by `fit`. Returns
    /// false and leaves the line untouched when the fit is degenerate.
    pub fn set_geometry(&mut self, fit: &FittedLine, geometry: &RoadGeometry) -> bool {
        let (Some(horizon), Some(support), Some(bottom)) = (
            fit.point_at_row(geometry.horizon as f32),
            fit.point_at_row(geometry.support_row() as f32),
            fit.point_at_row(geometry.bottom_row() as f32),
        ) else {
            return false;
        };
        if !(horizon.is_finite() && support.is_finite() && bottom.is_finite()) {
            return false;
        }
        let (w, h) = (geometry.width, geometry.height);
        self.horizon_point = horizon;
        self.horizon_support_point = support;
        self.road_bottom_point = bottom;
        self.angle = fit.angle();
        self.length = fit.extent;
        self.on_screen_horizon_point = ScreenPoint::from_image_clamped(horizon, w, h);
        self.on_screen_horizon_support_point = ScreenPoint::from_image_clamped(support, w, h);
        self.on_screen_road_bottom_point =
            ScreenPoint::from_image_clamped(visible_bottom(horizon, bottom, w), w, h);
        true
    }

    /// Line through the horizon and bottom points.
    pub fn fitted(&self) -> Option<FittedLine> {
        FittedLine::through(self.horizon_point, self.road_bottom_point)
    }

    /// Appends `score` to the bounded history.
    pub fn record_score(&mut self, score: f32, history_len: usize, start_len: usize) {
        self.score = score;
        self.scores.push(score);
        if self.scores.len() > history_len.max(1) {
            let excess = self.scores.len() - history_len.max(1);
            self.scores.drain(..excess);
        }
        if self.start_scores.len() < start_len {
            self.start_scores.push(score);
        }
    }

    /// Takes over the geometry, support pixels and seeding segments of
    /// `other`. Identity, activity and score history stay.
    pub fn adopt_geometry(&mut self, other: Line) {
        self.length = other.length;
        self.angle = other.angle;
        self.points = other.points;
        self.horizon_point = other.horizon_point;
        self.horizon_support_point = other.horizon_support_point;
        self.road_bottom_point = other.road_bottom_point;
        self.on_screen_horizon_point = other.on_screen_horizon_point;
        self.on_screen_horizon_support_point = other.on_screen_horizon_support_point;
        self.on_screen_road_bottom_point = other.on_screen_road_bottom_point;
        self.segments = other.segments;
    }

    /// Left boundary: it widens to the left below the horizon.
    pub fn is_left(&self) -> bool {
        self.road_bottom_point.x < self.horizon_point.x
    }
}

/// Where the line leaves the frame on its way from the horizon down to the
/// bottom row. Equals `bottom` when that lies inside the frame.
fn visible_bottom(horizon: ImagePoint, bottom: ImagePoint, width: usize) -> ImagePoint {
    let max_x = width.saturating_sub(1) as f32;
    let dx = bottom.x - horizon.x;
    let exit_x = if bottom.x < 0.0 {
        0.0
    } else if bottom.x > max_x {
        max_x
    } else {
        return bottom;
    };
    if dx.abs() < 1e-6 {
        return bottom;
    }
    let t = ((exit_x - horizon.x) / dx).clamp(0.0, 1.0);
    ImagePoint::new(exit_x, horizon.y + t * (bottom.y - horizon.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> RoadGeometry {
        RoadGeometry {
            horizon: 70,
            support: 20,
            width: 320,
            height: 240,
        }
    }

    #[test]
    fn geometry_from_fit_hits_the_three_rows() {
        let fit = FittedLine::through(ImagePoint::new(160.0, 70.0), ImagePoint::new(20.0, 239.0)).unwrap();
        let line = Line::from_fit(&fit, &geometry()).unwrap();
        assert!((line.horizon_point.x - 160.0).abs() < 1e-3);
        assert!((line.road_bottom_point.x - 20.0).abs() < 1e-3);
        let expected = 160.0 - 140.0 * 20.0 / 169.0;
        assert!((line.horizon_support_point.x - expected).abs() < 1e-3);
        assert!(line.is_left());
        assert!(line.is_active);
        assert!(line.index.is_none());
    }

    #[test]
    fn off_screen_bottom_is_clipped_to_the_frame_edge() {
        let fit = FittedLine::through(ImagePoint::new(160.0, 70.0), ImagePoint::new(-100.0, 239.0)).unwrap();
        let line = Line::from_fit(&fit, &geometry()).unwrap();
        assert!(line.road_bottom_point.x < 0.0);
        let s = line.on_screen_road_bottom_point;
        assert_eq!(s.x, 0.0);
        assert!(s.y > 70.0 && s.y < 239.0);
    }

    #[test]
    fn horizontal_fit_is_rejected() {
        let fit = FittedLine::through(ImagePoint::new(0.0, 100.0), ImagePoint::new(50.0, 100.0)).unwrap();
        assert!(Line::from_fit(&fit, &geometry()).is_none());
    }

    #[test]
    fn score_history_is_bounded() {
        let mut line = Line::default();
        for i in 0..10 {
            line.record_score(i as f32, 4, 2);
        }
        assert_eq!(line.scores, vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(line.start_scores, vec![0.0, 1.0]);
        assert_eq!(line.score, 9.0);
    }
}
