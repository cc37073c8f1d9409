//! Binary edge map consumed by segment extraction and line-support search.
use crate::types::PixelPoint;

/// Binary edge image: non-zero bytes mark edge pixels.
#[derive(Clone, Debug, Default)]
pub struct EdgeMap {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl EdgeMap {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    /// Build a map with the listed pixels set; out-of-frame points are ignored.
    pub fn from_points(w: usize, h: usize, points: impl IntoIterator<Item = PixelPoint>) -> Self {
        let mut map = Self::new(w, h);
        for p in points {
            map.set(p.x, p.y);
        }
        map
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32) {
        if self.contains(x, y) {
            let idx = y as usize * self.w + x as usize;
            self.data[idx] = 255;
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h
    }

    /// Edge test with implicit zero padding outside the frame.
    #[inline]
    pub fn is_edge(&self, x: i32, y: i32) -> bool {
        self.contains(x, y) && self.data[y as usize * self.w + x as usize] != 0
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Slice usable as a region-growing mask (non-zero = allowed).
    pub fn as_mask(&self) -> &[u8] {
        &self.data
    }
}
