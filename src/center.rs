//! Road center and steering target from the active boundary lines.
//!
//! The center is measured on the support row (`horizon + support`). With
//! boundaries on both sides it is the score-weighted mean of left/right
//! midpoints, and every contributing line learns where the center sat
//! relative to it. With one side only, each line predicts the center from
//! what it learned; a line that never saw the other side assumes the road
//! heads toward its horizon crossing.
//!
//! The steering target is the ray from the bottom-center of the frame
//! through the center point, carried up to the horizon row.
use crate::angle::{line_angle, normalize_half_pi};
use crate::edges::EdgeMap;
use crate::tracking::{Line, RoadGeometry};
use crate::types::ImagePoint;
use serde::{Deserialize, Serialize};

/// Pixels next to a boundary that do not count as clutter.
const BOUNDARY_MARGIN_PX: f32 = 2.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterParams {
    /// Summed line score that maps to full confidence.
    pub score_normalizer: f32,
    /// Confidence factor when only one side of the road is visible.
    pub single_side_factor: f32,
    /// Weight of edge clutter between the boundaries, in [0, 1].
    pub clutter_weight: f32,
}

impl Default for CenterParams {
    fn default() -> Self {
        Self {
            score_normalizer: 2.0,
            single_side_factor: 0.5,
            clutter_weight: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RoadCenter {
    /// Road center on the support row.
    pub center: ImagePoint,
    /// Steering target on the horizon row.
    pub target: ImagePoint,
    pub confidence: f32,
    pub left_lines: usize,
    pub right_lines: usize,
    /// Edge density between the boundaries on the support row.
    pub clutter: f32,
}

#[derive(Clone, Debug, Default)]
pub struct RoadCenterEstimator {
    params: CenterParams,
}

impl RoadCenterEstimator {
    pub fn new(params: CenterParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CenterParams {
        &self.params
    }

    /// `None` when no active line is given.
    pub fn compute_center(
        &self,
        edges: &EdgeMap,
        lines: &mut [&mut Line],
        geometry: &RoadGeometry,
    ) -> Option<RoadCenter> {
        let (left, right): (Vec<usize>, Vec<usize>) = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_active)
            .map(|(i, _)| i)
            .partition(|&i| lines[i].is_left());
        if left.is_empty() && right.is_empty() {
            return None;
        }

        let support_row = geometry.support_row() as f32;
        let origin = ImagePoint::new(geometry.width as f32 * 0.5, geometry.bottom_row() as f32);
        let two_sided = !left.is_empty() && !right.is_empty();

        let center_x = if two_sided {
            let (mut sum, mut weight, mut plain) = (0.0f32, 0.0f32, 0.0f32);
            for &l in &left {
                for &r in &right {
                    let mid = 0.5 * (lines[l].horizon_support_point.x + lines[r].horizon_support_point.x);
                    let w = lines[l].score * lines[r].score;
                    sum += w * mid;
                    weight += w;
                    plain += mid;
                }
            }
            if weight > 1e-6 {
                sum / weight
            } else {
                plain / (left.len() * right.len()) as f32
            }
        } else {
            let (mut sum, mut weight, mut plain) = (0.0f32, 0.0f32, 0.0f32);
            let side = if left.is_empty() { &right } else { &left };
            for &i in side {
                let line = &lines[i];
                let estimate = if line.has_center_relation {
                    line.horizon_support_point.x + line.offset
                } else {
                    line.horizon_point.x
                };
                sum += line.score * estimate;
                weight += line.score;
                plain += estimate;
            }
            if weight > 1e-6 {
                sum / weight
            } else {
                plain / side.len() as f32
            }
        };
        if !center_x.is_finite() {
            return None;
        }
        let center = ImagePoint::new(center_x, support_row);

        if two_sided {
            let ray_angle = line_angle(origin, center);
            for &i in left.iter().chain(&right) {
                let line = &mut *lines[i];
                line.offset = center.x - line.horizon_support_point.x;
                if let Some(ray) = ray_angle {
                    line.angle_to_center = normalize_half_pi(line.angle - ray);
                }
                line.point_to_servo = center;
                line.has_center_relation = true;
            }
        } else {
            for &i in left.iter().chain(&right) {
                lines[i].point_to_servo = center;
            }
        }

        let rise = origin.y - support_row;
        let target_x = if rise > 1e-3 {
            origin.x + (center.x - origin.x) * (origin.y - geometry.horizon as f32) / rise
        } else {
            center.x
        };
        let target = ImagePoint::new(target_x, geometry.horizon as f32);

        let bounds = left
            .iter()
            .chain(&right)
            .map(|&i| lines[i].horizon_support_point.x)
            .chain(std::iter::once(center.x));
        let (lo, hi) = bounds.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        let clutter = edge_density(edges, geometry.support_row(), lo + BOUNDARY_MARGIN_PX, hi - BOUNDARY_MARGIN_PX);

        let total_score: f32 = left.iter().chain(&right).map(|&i| lines[i].score.max(0.0)).sum();
        let mut confidence = (total_score / self.params.score_normalizer.max(1e-3)).min(1.0);
        if !two_sided {
            confidence *= self.params.single_side_factor;
        }
        confidence *= 1.0 - self.params.clutter_weight.clamp(0.0, 1.0) * clutter;

        Some(RoadCenter {
            center,
            target,
            confidence: confidence.clamp(0.0, 1.0),
            left_lines: left.len(),
            right_lines: right.len(),
            clutter,
        })
    }
}

/// Fraction of edge pixels on `row` strictly between `lo` and `hi`.
fn edge_density(edges: &EdgeMap, row: i32, lo: f32, hi: f32) -> f32 {
    let x0 = lo.ceil().max(0.0) as i32;
    let x1 = hi.floor().min(edges.w as f32 - 1.0) as i32;
    if x1 < x0 {
        return 0.0;
    }
    let hits = (x0..=x1).filter(|&x| edges.is_edge(x, row)).count();
    hits as f32 / (x1 - x0 + 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::FittedLine;

    fn geometry() -> RoadGeometry {
        RoadGeometry {
            horizon: 70,
            support: 20,
            width: 320,
            height: 240,
        }
    }

    fn line(top_x: f32, bottom_x: f32, score: f32) -> Line {
        let fit = FittedLine::through(ImagePoint::new(top_x, 70.0), ImagePoint::new(bottom_x, 239.0)).unwrap();
        let mut line = Line::from_fit(&fit, &geometry()).unwrap();
        line.score = score;
        line
    }

    #[test]
    fn symmetric_boundaries_center_straight_ahead() {
        let est = RoadCenterEstimator::default();
        let edges = EdgeMap::new(320, 240);
        let mut left = line(160.0, 20.0, 0.9);
        let mut right = line(160.0, 300.0, 0.9);
        let c = est
            .compute_center(&edges, &mut [&mut left, &mut right], &geometry())
            .expect("center");
        assert!((c.center.x - 160.0).abs() < 1e-3);
        assert!((c.target.x - 160.0).abs() < 1e-3);
        assert_eq!(c.target.y, 70.0);
        assert!((c.confidence - 0.9).abs() < 1e-4);
        assert!(left.has_center_relation && right.has_center_relation);
        assert!(left.offset > 0.0 && right.offset < 0.0);
    }

    #[test]
    fn target_extrapolates_the_center_ray() {
        let est = RoadCenterEstimator::default();
        let edges = EdgeMap::new(320, 240);
        let mut left = line(200.0, 60.0, 0.8);
        let mut right = line(200.0, 340.0, 0.8);
        let c = est
            .compute_center(&edges, &mut [&mut left, &mut right], &geometry())
            .expect("center");
        assert!((c.center.x - 200.0).abs() < 1e-3);
        let expected = 160.0 + 40.0 * 169.0 / 149.0;
        assert!((c.target.x - expected).abs() < 1e-2, "{}", c.target.x);
    }

    #[test]
    fn single_side_reuses_learned_offset() {
        let est = RoadCenterEstimator::default();
        let edges = EdgeMap::new(320, 240);
        let mut left = line(180.0, 40.0, 0.9);
        let mut right = line(180.0, 320.0, 0.9);
        let both = est
            .compute_center(&edges, &mut [&mut left, &mut right], &geometry())
            .expect("center");
        let one = est.compute_center(&edges, &mut [&mut left], &geometry()).expect("center");
        assert!((one.center.x - both.center.x).abs() < 1e-3);
        assert!(one.confidence < both.confidence);
        assert_eq!((one.left_lines, one.right_lines), (1, 0));
    }

    #[test]
    fn inactive_or_missing_lines_give_no_center() {
        let est = RoadCenterEstimator::default();
        let edges = EdgeMap::new(320, 240);
        assert!(est.compute_center(&edges, &mut [], &geometry()).is_none());
        let mut l = line(160.0, 20.0, 0.9);
        l.is_active = false;
        assert!(est.compute_center(&edges, &mut [&mut l], &geometry()).is_none());
    }

    #[test]
    fn clutter_between_boundaries_lowers_confidence() {
        let est = RoadCenterEstimator::default();
        let clean = EdgeMap::new(320, 240);
        let mut noisy = EdgeMap::new(320, 240);
        for x in (150..170).step_by(2) {
            noisy.set(x, 90);
        }
        let mut a = line(160.0, 20.0, 0.9);
        let mut b = line(160.0, 300.0, 0.9);
        let c_clean = est.compute_center(&clean, &mut [&mut a, &mut b], &geometry()).unwrap();
        let c_noisy = est.compute_center(&noisy, &mut [&mut a, &mut b], &geometry()).unwrap();
        assert!(c_noisy.clutter > 0.0);
        assert!(c_noisy.confidence < c_clean.confidence);
    }
}
