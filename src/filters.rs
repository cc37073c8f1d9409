//! Separable smoothing applied ahead of edge detection.
//!
//! Borders clamp to the image extents. The default kernel is the normalised
//! 5-tap binomial `[1, 4, 6, 4, 1] / 16`.
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order).
    fn taps(&self) -> &[f32];
}

/// Simple wrapper around a static filter kernel.
#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f32],
}

impl Default for StaticSeparableFilter {
    fn default() -> Self {
        GAUSSIAN_5TAP
    }
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f32]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f32] {
        self.taps
    }
}

pub const GAUSSIAN_5TAP: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.0625, 0.25, 0.375, 0.25, 0.0625]);

/// Convolve `src` horizontally then vertically with the filter taps.
pub fn apply(filter: &dyn SeparableFilter, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    if taps.is_empty() || src.w == 0 || src.h == 0 {
        return src.clone();
    }
    let half = (taps.len() / 2) as isize;
    let (w, h) = (src.w, src.h);

    let mut tmp = ImageF32::new(w, h);
    for y in 0..h {
        let row = src.row(y);
        let out = tmp.row_mut(y);
        for (x, dst) in out.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &t) in taps.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, w as isize - 1) as usize;
                acc += t * row[sx];
            }
            *dst = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        for (k, &t) in taps.iter().enumerate() {
            let sy = (y as isize + k as isize - half).clamp(0, h as isize - 1) as usize;
            let src_row = tmp.row(sy);
            let dst_row = &mut out.data[y * w..(y + 1) * w];
            for (d, &s) in dst_row.iter_mut().zip(src_row) {
                *d += t * s;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_image_is_preserved() {
        let mut img = ImageF32::new(7, 5);
        img.data.iter_mut().for_each(|v| *v = 0.5);
        let out = apply(&GAUSSIAN_5TAP, &img);
        assert!(out.data.iter().all(|v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn impulse_spreads_with_unit_mass() {
        let mut img = ImageF32::new(9, 9);
        img.set(4, 4, 1.0);
        let out = apply(&GAUSSIAN_5TAP, &img);
        let total: f32 = out.data.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(out.get(4, 4) > out.get(5, 4));
        assert!(out.get(5, 4) > out.get(6, 4));
    }
}
