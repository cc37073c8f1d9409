//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Working buffer for blur and gradient computation. Intensities converted
//! from 8-bit frames are scaled into `[0, 1]`.
use super::{ImageU8, ImageView};

#[derive(Clone, Debug, Default)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Convert an 8-bit frame to `[0, 1]` floats, honouring its stride.
    pub fn from_u8(gray: &ImageU8<'_>) -> Self {
        let mut out = ImageF32::new(gray.w, gray.h);
        for y in 0..gray.h {
            let src = gray.row(y);
            let start = y * out.stride;
            for (dst, &px) in out.data[start..start + gray.w].iter_mut().zip(src) {
                *dst = px as f32 / 255.0;
            }
        }
        out
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl crate::image::traits::ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_skips_row_padding() {
        let data = [0u8, 255, 9, 255, 0, 9];
        let view = ImageU8 {
            w: 2,
            h: 2,
            stride: 3,
            data: &data,
        };
        let img = ImageF32::from_u8(&view);
        assert_eq!(img.data, vec![0.0, 1.0, 1.0, 0.0]);
    }
}
