//! Running moments of a grown pixel region.
//!
//! Moments accumulate in f64 so the covariance stays well conditioned for
//! regions far from the origin.

pub(crate) struct RegionAccumulator {
    pub indices: Vec<usize>,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    aligned: usize,
    sum_mag: f64,
}

/// Centroid and 2×2 covariance of the region.
pub(crate) struct RegionMoments {
    pub cx: f32,
    pub cy: f32,
    pub cxx: f32,
    pub cxy: f32,
    pub cyy: f32,
}

impl RegionAccumulator {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
            sum_x: 0.0,
            sum_y: 0.0,
            sum_xx: 0.0,
            sum_yy: 0.0,
            sum_xy: 0.0,
            aligned: 0,
            sum_mag: 0.0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.indices.clear();
        self.sum_x = 0.0;
        self.sum_y = 0.0;
        self.sum_xx = 0.0;
        self.sum_yy = 0.0;
        self.sum_xy = 0.0;
        self.aligned = 0;
        self.sum_mag = 0.0;
    }

    pub(crate) fn push(&mut self, idx: usize, x: usize, y: usize, mag: f32, aligned: bool) {
        self.indices.push(idx);
        let xf = x as f64;
        let yf = y as f64;
        self.sum_x += xf;
        self.sum_y += yf;
        self.sum_xx += xf * xf;
        self.sum_yy += yf * yf;
        self.sum_xy += xf * yf;
        if aligned {
            self.aligned += 1;
        }
        self.sum_mag += mag as f64;
    }

    pub(crate) fn len(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn aligned_fraction(&self) -> f32 {
        if self.indices.is_empty() {
            0.0
        } else {
            self.aligned as f32 / self.indices.len() as f32
        }
    }

    pub(crate) fn avg_mag(&self) -> f32 {
        if self.indices.is_empty() {
            0.0
        } else {
            (self.sum_mag / self.indices.len() as f64) as f32
        }
    }

    pub(crate) fn moments(&self) -> Option<RegionMoments> {
        if self.indices.is_empty() {
            return None;
        }
        let n = self.indices.len() as f64;
        let cx = self.sum_x / n;
        let cy = self.sum_y / n;
        Some(RegionMoments {
            cx: cx as f32,
            cy: cy as f32,
            cxx: (self.sum_xx / n - cx * cx) as f32,
            cxy: (self.sum_xy / n - cx * cy) as f32,
            cyy: (self.sum_yy / n - cy * cy) as f32,
        })
    }

    /// Return region pixels to the pool.
    pub(crate) fn release(&self, used: &mut [u8]) {
        for &idx in &self.indices {
            used[idx] = 0;
        }
    }
}
