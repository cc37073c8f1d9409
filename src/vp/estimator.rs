use super::candidate::VanishingPointCandidate;
use super::VpParams;
use crate::angle::{angular_difference, line_angle};
use crate::segments::Segment;
use crate::types::{ImagePoint, PixelPoint};
use log::debug;

const TIE_EPS: f32 = 1e-6;

/// Candidate grid geometry, in source-image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VpGrid {
    /// First candidate row.
    pub horizon: i32,
    /// Rows extend this far below the horizon.
    pub band: i32,
    /// Distance between neighbouring candidates.
    pub spacing: u32,
    /// A segment supports a candidate when its line passes this close.
    pub distthresh: u32,
}

/// Bayesian vanishing-point voting over a regular candidate grid.
#[derive(Clone, Debug)]
pub struct VanishingPointEstimator {
    grid: VpGrid,
    params: VpParams,
}

impl VanishingPointEstimator {
    pub fn new(grid: VpGrid, params: VpParams) -> Self {
        Self { grid, params }
    }

    /// Candidate locations for a frame `width × height`.
    pub fn candidate_points(&self, width: usize, height: usize) -> Vec<PixelPoint> {
        let step = self.grid.spacing.max(1) as usize;
        let max_row = (self.grid.horizon + self.grid.band.max(0)).min(height as i32 - 1);
        let mut points = Vec::new();
        let mut y = self.grid.horizon.max(0);
        while y <= max_row {
            for x in (0..width).step_by(step) {
                points.push(PixelPoint::new(x as i32, y));
            }
            y += step as i32;
        }
        points
    }

    /// Score every candidate. Candidates without support are dropped and the
    /// remaining posteriors sum to one; an empty result means no estimate.
    pub fn evaluate(
        &self,
        segments: &[Segment],
        previous: Option<ImagePoint>,
        width: usize,
        height: usize,
    ) -> Vec<VanishingPointCandidate> {
        let dist = self.grid.distthresh.max(1) as f32;
        let sigma = dist / 3.0;
        let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);
        let angle_tol = self.params.angle_tol_deg.to_radians();
        let prior_sigma = self.params.prior_sigma.max(1e-3);
        let inv_two_prior_sq = 1.0 / (2.0 * prior_sigma * prior_sigma);

        let mut candidates = Vec::new();
        for point in self.candidate_points(width, height) {
            let mut cand = VanishingPointCandidate::new(point);
            let loc = cand.location();
            for seg in segments {
                let d = seg.line_distance(loc);
                if d >= dist {
                    continue;
                }
                let mid = seg.midpoint();
                if mid.y <= loc.y {
                    continue;
                }
                let Some(ray) = line_angle(loc, mid) else {
                    continue;
                };
                if angular_difference(ray, seg.angle) > angle_tol {
                    continue;
                }
                cand.likelihood += seg.length * (-d * d * inv_two_sigma_sq).exp();
                cand.supporting_segments.push(seg.clone());
            }
            if cand.likelihood <= 0.0 {
                continue;
            }
            cand.prior = match previous {
                Some(prev) => {
                    self.params.prior_floor + (-loc.distance_sq(&prev) * inv_two_prior_sq).exp()
                }
                None => 1.0,
            };
            cand.posterior = cand.prior * cand.likelihood;
            candidates.push(cand);
        }

        let total: f32 = candidates.iter().map(|c| c.posterior).sum();
        if total > 0.0 && total.is_finite() {
            for c in &mut candidates {
                c.posterior /= total;
            }
        } else {
            candidates.clear();
        }
        candidates
    }

    /// Best candidate, or `None` when support is too weak to commit to.
    pub fn estimate(
        &self,
        segments: &[Segment],
        previous: Option<ImagePoint>,
        width: usize,
        height: usize,
    ) -> Option<VanishingPointCandidate> {
        let candidates = self.evaluate(segments, previous, width, height);
        let count = candidates.len();
        let best = select_best(candidates, previous)?;
        if best.posterior < self.params.posterior_floor
            || best.likelihood < self.params.min_likelihood
        {
            debug!(
                "vp: rejected best=({}, {}) posterior={:.4} likelihood={:.1} candidates={}",
                best.point.x, best.point.y, best.posterior, best.likelihood, count
            );
            return None;
        }
        debug!(
            "vp: selected ({}, {}) posterior={:.4} likelihood={:.1} support={} candidates={}",
            best.point.x,
            best.point.y,
            best.posterior,
            best.likelihood,
            best.supporting_segments.len(),
            count
        );
        Some(best)
    }
}

/// Argmax of the posterior; ties go to the candidate nearest `previous`.
fn select_best(
    candidates: Vec<VanishingPointCandidate>,
    previous: Option<ImagePoint>,
) -> Option<VanishingPointCandidate> {
    let mut best: Option<VanishingPointCandidate> = None;
    for cand in candidates {
        let replace = match &best {
            None => true,
            Some(current) => {
                let diff = cand.posterior - current.posterior;
                if diff.abs() <= TIE_EPS * current.posterior.max(cand.posterior) {
                    match previous {
                        Some(prev) => {
                            cand.location().distance_sq(&prev)
                                < current.location().distance_sq(&prev)
                        }
                        None => false,
                    }
                } else {
                    diff > 0.0
                }
            }
        };
        if replace {
            best = Some(cand);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> VpGrid {
        VpGrid {
            horizon: 70,
            band: 20,
            spacing: 10,
            distthresh: 40,
        }
    }

    /// Segments on rays leaving `vp` towards the bottom of a 320×240 frame.
    fn converging_segments(vp: ImagePoint) -> Vec<Segment> {
        let mut segs = Vec::new();
        for &bottom_x in &[10.0f32, 60.0, 250.0, 310.0] {
            let dir = ((bottom_x - vp.x), (239.0 - vp.y));
            let at = |t: f32| {
                ImagePoint::new(vp.x + dir.0 * t, vp.y + dir.1 * t).round()
            };
            segs.push(Segment::from_endpoints(at(0.35), at(0.9), 1.0).unwrap());
        }
        segs
    }

    #[test]
    fn converging_segments_select_their_intersection() {
        let vp = ImagePoint::new(160.0, 80.0);
        let estimator = VanishingPointEstimator::new(grid(), VpParams::default());
        let best = estimator
            .estimate(&converging_segments(vp), None, 320, 240)
            .expect("vanishing point");
        assert!(best.location().distance(&vp) <= 40.0);
        assert_eq!(best.point, PixelPoint::new(160, 80));
        assert!(best.posterior >= VpParams::default().posterior_floor);
        assert_eq!(best.supporting_segments.len(), 4);
    }

    #[test]
    fn posteriors_are_normalized() {
        let vp = ImagePoint::new(150.0, 70.0);
        let estimator = VanishingPointEstimator::new(grid(), VpParams::default());
        let candidates = estimator.evaluate(&converging_segments(vp), None, 320, 240);
        assert!(!candidates.is_empty());
        let total: f32 = candidates.iter().map(|c| c.posterior).sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn no_segments_means_no_estimate() {
        let estimator = VanishingPointEstimator::new(grid(), VpParams::default());
        assert!(estimator.evaluate(&[], None, 320, 240).is_empty());
        assert!(estimator.estimate(&[], None, 320, 240).is_none());
    }

    #[test]
    fn weak_support_is_rejected() {
        let seg =
            Segment::from_endpoints(PixelPoint::new(100, 150), PixelPoint::new(96, 158), 1.0)
                .unwrap();
        let estimator = VanishingPointEstimator::new(grid(), VpParams::default());
        assert!(estimator.estimate(&[seg], None, 320, 240).is_none());
    }

    #[test]
    fn ties_prefer_previous_vanishing_point() {
        let a = VanishingPointCandidate {
            posterior: 0.5,
            ..VanishingPointCandidate::new(PixelPoint::new(100, 70))
        };
        let b = VanishingPointCandidate {
            posterior: 0.5,
            ..VanishingPointCandidate::new(PixelPoint::new(200, 70))
        };
        let best = select_best(vec![a, b], Some(ImagePoint::new(190.0, 70.0))).unwrap();
        assert_eq!(best.point, PixelPoint::new(200, 70));
    }

    #[test]
    fn grid_covers_band_below_horizon() {
        let estimator = VanishingPointEstimator::new(grid(), VpParams::default());
        let pts = estimator.candidate_points(40, 240);
        let rows: Vec<i32> = pts.iter().map(|p| p.y).collect();
        assert_eq!(pts.len(), 4 * 3);
        assert!(rows.iter().all(|&y| (70..=90).contains(&y)));
    }
}
