//! Borrowed 8-bit grayscale frame as delivered by the capture layer.
use crate::error::{Result, RoadFinderError};

#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Tightly packed view (`stride == w`).
    pub fn new(w: usize, h: usize, data: &'a [u8]) -> Self {
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Checks that the view describes a usable frame of at least
    /// `min_w × min_h` pixels backed by enough bytes.
    pub fn validate(&self, min_w: usize, min_h: usize) -> Result<()> {
        if self.w == 0 || self.h == 0 || self.data.is_empty() {
            return Err(RoadFinderError::EmptyFrame);
        }
        if self.w < min_w || self.h < min_h {
            return Err(RoadFinderError::FrameTooSmall {
                width: self.w,
                height: self.h,
                min_width: min_w,
                min_height: min_h,
            });
        }
        if self.stride < self.w {
            return Err(RoadFinderError::BufferTooShort {
                expected: self.w * self.h,
                actual: self.data.len(),
            });
        }
        let needed = self
            .stride
            .checked_mul(self.h - 1)
            .and_then(|n| n.checked_add(self.w))
            .ok_or(RoadFinderError::BufferTooShort {
                expected: usize::MAX,
                actual: self.data.len(),
            })?;
        if self.data.len() < needed {
            return Err(RoadFinderError::BufferTooShort {
                expected: needed,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

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
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_short_buffers() {
        let data = vec![0u8; 10];
        let img = ImageU8::new(4, 4, &data);
        assert!(matches!(
            img.validate(1, 1),
            Err(RoadFinderError::BufferTooShort { expected: 16, actual: 10 })
        ));
    }

    #[test]
    fn validate_rejects_overflowing_stride() {
        let data = vec![0u8; 64];
        let img = ImageU8 {
            w: 4,
            h: 4,
            stride: usize::MAX / 2,
            data: &data,
        };
        assert!(matches!(
            img.validate(1, 1),
            Err(RoadFinderError::BufferTooShort { actual: 64, .. })
        ));
    }

    #[test]
    fn validate_accepts_padded_stride() {
        let data = vec![0u8; 6 * 3 + 4];
        let img = ImageU8 {
            w: 4,
            h: 4,
            stride: 6,
            data: &data,
        };
        assert!(img.validate(4, 4).is_ok());
        assert!(matches!(
            img.validate(8, 4),
            Err(RoadFinderError::FrameTooSmall { .. })
        ));
    }
}
