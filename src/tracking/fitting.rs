//! Least-squares line fitting over edge pixels.
use crate::angle::normalize_half_pi;
use crate::types::{ImagePoint, PixelPoint};

const EPS: f32 = 1e-6;

/// Infinite line through `centroid` along the unit `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FittedLine {
    pub centroid: ImagePoint,
    pub direction: [f32; 2],
    /// RMS perpendicular distance of the fitted points.
    pub rmse: f32,
    /// Span of the fitted points along `direction`.
    pub extent: f32,
}

impl FittedLine {
    /// Line through two points. `None` when they coincide.
    pub fn through(a: ImagePoint, b: ImagePoint) -> Option<Self> {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len = (dx * dx + dy * dy).sqrt();
        if !len.is_finite() || len < EPS {
            return None;
        }
        Some(Self {
            centroid: a.midpoint(&b),
            direction: [dx / len, dy / len],
            rmse: 0.0,
            extent: len,
        })
    }

    /// Column where the line crosses row `y`; `None` for near-horizontal lines.
    pub fn x_at_row(&self, y: f32) -> Option<f32> {
        if self.direction[1].abs() < 1e-3 {
            return None;
        }
        let t = (y - self.centroid.y) / self.direction[1];
        let x = self.centroid.x + t * self.direction[0];
        x.is_finite().then_some(x)
    }

    pub fn point_at_row(&self, y: f32) -> Option<ImagePoint> {
        self.x_at_row(y).map(|x| ImagePoint::new(x, y))
    }

    /// Perpendicular distance from `p` to the line.
    pub fn distance(&self, p: ImagePoint) -> f32 {
        let dx = p.x - self.centroid.x;
        let dy = p.y - self.centroid.y;
        (dx * -self.direction[1] + dy * self.direction[0]).abs()
    }

    /// Undirected orientation in [0, π).
    pub fn angle(&self) -> f32 {
        normalize_half_pi(self.direction[1].atan2(self.direction[0]))
    }
}

/// Capability interface for fitting a line to a point set.
pub trait LineFitter: Send + Sync {
    /// `None` for degenerate input (fewer than two distinct points).
    fn fit(&self, points: &[PixelPoint]) -> Option<FittedLine>;
}

/// Orthogonal (total) least squares: the principal axis of the point cloud.
#[derive(Clone, Copy, Debug, Default)]
pub struct TotalLeastSquaresFitter;

impl LineFitter for TotalLeastSquaresFitter {
    fn fit(&self, points: &[PixelPoint]) -> Option<FittedLine> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let (mut mx, mut my) = (0.0f64, 0.0f64);
        for p in points {
            mx += p.x as f64;
            my += p.y as f64;
        }
        mx /= n;
        my /= n;

        let (mut cxx, mut cxy, mut cyy) = (0.0f64, 0.0f64, 0.0f64);
        for p in points {
            let dx = p.x as f64 - mx;
            let dy = p.y as f64 - my;
            cxx += dx * dx;
            cxy += dx * dy;
            cyy += dy * dy;
        }
        cxx /= n;
        cxy /= n;
        cyy /= n;

        let trace = cxx + cyy;
        if trace <= EPS as f64 {
            return None;
        }
        let det_part = (cxx - cyy) * (cxx - cyy) + 4.0 * cxy * cxy;
        let lambda = 0.5 * (trace + det_part.max(0.0).sqrt());
        // Eigenvector of the larger eigenvalue; pick the better-conditioned form.
        let (mut dx, mut dy) = if (lambda - cxx).abs() > (lambda - cyy).abs() {
            (cxy, lambda - cxx)
        } else {
            (lambda - cyy, cxy)
        };
        let norm = (dx * dx + dy * dy).sqrt();
        if norm <= EPS as f64 {
            // Isotropic spread has no preferred axis unless the cloud is flat.
            if cyy > cxx {
                (dx, dy) = (0.0, 1.0);
            } else if cxx > cyy {
                (dx, dy) = (1.0, 0.0);
            } else {
                return None;
            }
        } else {
            dx /= norm;
            dy /= norm;
        }

        let (mut smin, mut smax, mut sq) = (f64::INFINITY, f64::NEG_INFINITY, 0.0f64);
        for p in points {
            let rx = p.x as f64 - mx;
            let ry = p.y as f64 - my;
            let s = rx * dx + ry * dy;
            smin = smin.min(s);
            smax = smax.max(s);
            let d = -rx * dy + ry * dx;
            sq += d * d;
        }
        let extent = (smax - smin) as f32;
        if extent < EPS {
            return None;
        }
        Some(FittedLine {
            centroid: ImagePoint::new(mx as f32, my as f32),
            direction: [dx as f32, dy as f32],
            rmse: (sq / n).sqrt() as f32,
            extent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_exact_oblique_line() {
        let points: Vec<PixelPoint> = (0..40).map(|i| PixelPoint::new(100 - i, 50 + 2 * i)).collect();
        let fit = TotalLeastSquaresFitter.fit(&points).expect("fit");
        assert!(fit.rmse < 1e-3);
        let x = fit.x_at_row(130.0).unwrap();
        assert!((x - 60.0).abs() < 1e-3, "x={x}");
        assert!((fit.angle() - (2.0f32).atan2(-1.0)).abs() < 1e-4);
    }

    #[test]
    fn vertical_points_fit_vertical_line() {
        let points: Vec<PixelPoint> = (0..10).map(|i| PixelPoint::new(7, i)).collect();
        let fit = TotalLeastSquaresFitter.fit(&points).expect("fit");
        assert!((fit.x_at_row(100.0).unwrap() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(TotalLeastSquaresFitter.fit(&[PixelPoint::new(1, 1)]).is_none());
        let same = vec![PixelPoint::new(4, 4); 5];
        assert!(TotalLeastSquaresFitter.fit(&same).is_none());
    }

    #[test]
    fn horizontal_line_has_no_row_crossing() {
        let fit = FittedLine::through(ImagePoint::new(0.0, 5.0), ImagePoint::new(10.0, 5.0)).unwrap();
        assert!(fit.x_at_row(20.0).is_none());
        assert!((fit.distance(ImagePoint::new(3.0, 8.0)) - 3.0).abs() < 1e-5);
    }
}
