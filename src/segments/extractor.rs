use super::options::LsdOptions;
use super::region_accumulator::RegionAccumulator;
use super::segment::Segment;
use crate::angle::{angular_difference, normalize_half_pi};
use crate::edges::Grad;
use crate::types::PixelPoint;
use nalgebra::{Matrix2, SymmetricEigen};

const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Region-growing segment extractor over precomputed gradients.
///
/// When a mask is supplied (typically the binary edge map) growth is confined
/// to its non-zero pixels, which keeps regions one ridge thick.
pub(super) struct LsdExtractor<'a> {
    grad: &'a Grad,
    width: usize,
    height: usize,
    mag_thresh: f32,
    angle_tol: f32,
    half_angle_tol: f32,
    min_len: f32,
    min_region: usize,
    min_aligned: f32,
    used: Vec<u8>,
    angle_cache: Vec<f32>,
    stack: Vec<usize>,
    region: RegionAccumulator,
    segments: Vec<Segment>,
    mask: Option<&'a [u8]>,
    enforce_polarity: bool,
    normal_span_limit: Option<f32>,
}

impl<'a> LsdExtractor<'a> {
    pub(super) fn new(grad: &'a Grad, mask: Option<&'a [u8]>, options: LsdOptions) -> Self {
        let width = grad.mag.w;
        let height = grad.mag.h;
        let n = width * height;
        if let Some(m) = mask {
            debug_assert!(
                m.len() >= n,
                "mask length {} must be at least width*height ({})",
                m.len(),
                n
            );
        }
        let angle_tol = options.angle_tolerance_deg.to_radians();
        Self {
            grad,
            width,
            height,
            mag_thresh: options.magnitude_threshold,
            angle_tol,
            half_angle_tol: angle_tol * 0.5,
            min_len: options.min_length_px,
            min_region: options.min_region_size.max(2),
            min_aligned: options.min_aligned_fraction,
            used: vec![0u8; n],
            angle_cache: vec![f32::NAN; n],
            stack: Vec::with_capacity(64),
            region: RegionAccumulator::with_capacity(128),
            segments: Vec::new(),
            mask,
            enforce_polarity: options.enforce_polarity,
            normal_span_limit: options
                .normal_span_limit_px
                .filter(|v| v.is_finite() && *v > 0.0),
        }
    }

    pub(super) fn extract(mut self) -> Vec<Segment> {
        for idx in 0..(self.width * self.height) {
            self.process_seed(idx);
        }
        self.segments
    }

    #[inline]
    fn allowed(&self, idx: usize) -> bool {
        self.mask.map_or(true, |m| m[idx] != 0)
    }

    fn process_seed(&mut self, idx: usize) {
        if self.used[idx] != 0 || !self.allowed(idx) {
            return;
        }
        let x = idx % self.width;
        let y = idx / self.width;
        if self.grad.mag.get(x, y) < self.mag_thresh {
            return;
        }

        self.region.reset();
        self.stack.clear();

        let seed_angle = self.angle_at(idx);
        self.used[idx] = 1;
        self.stack.push(idx);

        self.grow_region(seed_angle);

        if let Some(segment) = self.build_segment() {
            self.segments.push(segment);
        } else {
            // Members of a rejected region may still join another one; only
            // the seed is retired.
            self.region.release(&mut self.used);
            self.used[idx] = 2;
        }
        self.region.reset();
    }

    fn grow_region(&mut self, seed_angle: f32) {
        while let Some(idx) = self.stack.pop() {
            let x = idx % self.width;
            let y = idx / self.width;
            let angle = self.angle_at(idx);
            let aligned = self.angle_difference(angle, seed_angle) <= self.half_angle_tol;
            let mag = self.grad.mag.get(x, y);
            self.region.push(idx, x, y, mag, aligned);

            for (dx, dy) in NEIGH_OFFSETS {
                let xn = x as isize + dx;
                let yn = y as isize + dy;
                if xn < 0 || yn < 0 || xn >= self.width as isize || yn >= self.height as isize {
                    continue;
                }
                let neighbor_idx = yn as usize * self.width + xn as usize;
                if self.used[neighbor_idx] != 0 || !self.allowed(neighbor_idx) {
                    continue;
                }
                if self.grad.mag.get(xn as usize, yn as usize) < self.mag_thresh {
                    continue;
                }
                let neighbor_angle = self.angle_at(neighbor_idx);
                if self.angle_difference(neighbor_angle, seed_angle) <= self.angle_tol {
                    self.used[neighbor_idx] = 1;
                    self.stack.push(neighbor_idx);
                }
            }
        }
    }

    fn build_segment(&self) -> Option<Segment> {
        if self.region.len() < self.min_region {
            return None;
        }
        let m = self.region.moments()?;
        if !m.cx.is_finite() || !m.cy.is_finite() {
            return None;
        }

        let cov = Matrix2::new(m.cxx, m.cxy, m.cxy, m.cyy);
        let eig = SymmetricEigen::new(cov);
        let (vmax, lambda_max) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
            (eig.eigenvectors.column(0), eig.eigenvalues[0])
        } else {
            (eig.eigenvectors.column(1), eig.eigenvalues[1])
        };
        if !lambda_max.is_finite() || lambda_max <= 0.0 {
            return None;
        }

        let norm = (vmax[0] * vmax[0] + vmax[1] * vmax[1]).sqrt();
        if !norm.is_finite() || norm < 1e-6 {
            return None;
        }
        let tx = vmax[0] / norm;
        let ty = vmax[1] / norm;
        let nx = -ty;
        let ny = tx;

        let mut smin = f32::INFINITY;
        let mut smax = f32::NEG_INFINITY;
        let mut nmin = f32::INFINITY;
        let mut nmax = f32::NEG_INFINITY;
        for &idx in &self.region.indices {
            let dx = (idx % self.width) as f32 - m.cx;
            let dy = (idx / self.width) as f32 - m.cy;
            let s = dx * tx + dy * ty;
            smin = smin.min(s);
            smax = smax.max(s);
            let n = dx * nx + dy * ny;
            nmin = nmin.min(n);
            nmax = nmax.max(n);
        }

        let len = smax - smin;
        if !len.is_finite() || len <= 0.0 || len < self.min_len {
            return None;
        }
        if self.region.aligned_fraction() < self.min_aligned {
            return None;
        }
        if let Some(limit) = self.normal_span_limit {
            let normal_span = nmax - nmin;
            if !normal_span.is_finite() || normal_span > limit {
                return None;
            }
        }

        let p1 = PixelPoint::new(
            (m.cx + smin * tx).round() as i32,
            (m.cy + smin * ty).round() as i32,
        );
        let p2 = PixelPoint::new(
            (m.cx + smax * tx).round() as i32,
            (m.cy + smax * ty).round() as i32,
        );
        let strength = len * self.region.avg_mag().max(1e-3);
        Segment::from_endpoints(p1, p2, strength)
    }

    fn angle_at(&mut self, idx: usize) -> f32 {
        let cached = self.angle_cache[idx];
        if !cached.is_nan() {
            return cached;
        }
        let raw_angle = self.grad.direction(idx % self.width, idx / self.width);
        let angle = if self.enforce_polarity {
            normalize_signed_pi(raw_angle)
        } else {
            normalize_half_pi(raw_angle)
        };
        self.angle_cache[idx] = angle;
        angle
    }

    fn angle_difference(&self, a: f32, b: f32) -> f32 {
        if self.enforce_polarity {
            let mut diff = (a - b).abs();
            if diff > std::f32::consts::PI {
                diff = 2.0 * std::f32::consts::PI - diff;
            }
            diff
        } else {
            angular_difference(a, b)
        }
    }
}

#[inline]
fn normalize_signed_pi(angle: f32) -> f32 {
    let mut norm = angle.rem_euclid(2.0 * std::f32::consts::PI);
    if norm > std::f32::consts::PI {
        norm -= 2.0 * std::f32::consts::PI;
    }
    norm
}
