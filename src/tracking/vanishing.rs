use super::line::Line;
use crate::angle::angular_difference;
use crate::types::ImagePoint;

/// Pairs closer than this in orientation are too ill-conditioned to
/// intersect.
const MIN_PAIR_ANGLE_DEG: f32 = 5.0;

/// Vanishing point implied by tracked lines: the mean of their pairwise
/// intersections, each weighted by the product of the two scores and the
/// sine of their crossing angle. `None` with fewer than two usable lines.
pub fn vanishing_point_from_lines<'a>(lines: impl IntoIterator<Item = &'a Line>) -> Option<ImagePoint> {
    let lines: Vec<&Line> = lines.into_iter().collect();
    let min_angle = MIN_PAIR_ANGLE_DEG.to_radians();
    let (mut sx, mut sy, mut sw) = (0.0f32, 0.0f32, 0.0f32);
    for (i, a) in lines.iter().enumerate() {
        for b in &lines[i + 1..] {
            let crossing = angular_difference(a.angle, b.angle);
            if crossing < min_angle {
                continue;
            }
            let Some(p) = intersect(a, b) else {
                continue;
            };
            let w = a.score * b.score * crossing.sin();
            if w <= 0.0 {
                continue;
            }
            sx += w * p.x;
            sy += w * p.y;
            sw += w;
        }
    }
    (sw > 0.0).then(|| ImagePoint::new(sx / sw, sy / sw))
}

fn intersect(a: &Line, b: &Line) -> Option<ImagePoint> {
    let (p, r) = (a.horizon_point, sub(a.road_bottom_point, a.horizon_point));
    let (q, s) = (b.horizon_point, sub(b.road_bottom_point, b.horizon_point));
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < 1e-6 {
        return None;
    }
    let qp = sub(q, p);
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let out = ImagePoint::new(p.x + t * r.x, p.y + t * r.y);
    out.is_finite().then_some(out)
}

#[inline]
fn sub(a: ImagePoint, b: ImagePoint) -> ImagePoint {
    ImagePoint::new(a.x - b.x, a.y - b.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::line_angle;

    fn line(top: (f32, f32), bottom: (f32, f32), score: f32) -> Line {
        let horizon_point = ImagePoint::new(top.0, top.1);
        let road_bottom_point = ImagePoint::new(bottom.0, bottom.1);
        Line {
            horizon_point,
            road_bottom_point,
            angle: line_angle(horizon_point, road_bottom_point).unwrap(),
            score,
            is_active: true,
            ..Line::default()
        }
    }

    #[test]
    fn two_boundaries_meet_at_their_apex() {
        let left = line((150.0, 70.0), (0.0, 239.0), 0.9);
        let right = line((170.0, 70.0), (320.0, 239.0), 0.8);
        let vp = vanishing_point_from_lines([&left, &right]).expect("vp");
        assert!((vp.x - 160.0).abs() < 0.5, "{vp:?}");
        assert!(vp.y < 70.0);
    }

    #[test]
    fn parallel_or_single_lines_give_nothing() {
        let a = line((100.0, 70.0), (0.0, 239.0), 0.9);
        let b = line((110.0, 70.0), (10.0, 239.0), 0.9);
        assert!(vanishing_point_from_lines([&a, &b]).is_none());
        assert!(vanishing_point_from_lines([&a]).is_none());
    }
}
