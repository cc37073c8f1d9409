//! Mutable 8-bit canvas used for debug overlays.
//!
//! The canvas shares the input's pixel format (single-channel u8) and must be
//! at least as large as the frame it mirrors; the frame occupies its top-left
//! corner. Writes outside the canvas are dropped.

#[derive(Debug)]
pub struct CanvasU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize,
    pub data: &'a mut [u8],
}

impl<'a> CanvasU8<'a> {
    pub fn new(w: usize, h: usize, data: &'a mut [u8]) -> Self {
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    /// True when the canvas can hold a `w × h` frame in its top-left corner.
    pub fn covers(&self, w: usize, h: usize) -> bool {
        self.w >= w
            && self.h >= h
            && self.stride >= self.w
            && self.h > 0
            && self
                .stride
                .checked_mul(self.h - 1)
                .and_then(|n| n.checked_add(self.w))
                .map_or(false, |needed| self.data.len() >= needed)
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let Some(idx) = (y as usize)
            .checked_mul(self.stride)
            .and_then(|i| i.checked_add(x as usize))
        else {
            return;
        };
        if let Some(px) = self.data.get_mut(idx) {
            *px = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_requires_enough_rows_and_bytes() {
        let mut data = vec![0u8; 8 * 6];
        let canvas = CanvasU8::new(8, 6, &mut data);
        assert!(canvas.covers(8, 6));
        assert!(canvas.covers(4, 4));
        assert!(!canvas.covers(9, 6));
        assert!(!canvas.covers(8, 7));
    }

    #[test]
    fn overflowing_stride_is_not_a_cover() {
        let mut data = vec![0u8; 64];
        let mut canvas = CanvasU8 {
            w: 4,
            h: 4,
            stride: usize::MAX / 2,
            data: &mut data,
        };
        assert!(!canvas.covers(4, 4));
        canvas.put(3, 3, 9);
        assert!(canvas.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn writes_outside_the_canvas_are_dropped() {
        let mut data = vec![0u8; 4 * 4];
        let mut canvas = CanvasU8::new(4, 4, &mut data);
        canvas.put(-1, 0, 7);
        canvas.put(4, 0, 7);
        canvas.put(0, 4, 7);
        canvas.put(2, 1, 7);
        assert_eq!(data.iter().filter(|&&v| v == 7).count(), 1);
        assert_eq!(data[4 + 2], 7);
    }
}
