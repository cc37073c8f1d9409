/// Geometry of a synthetic straight road: a bright triangle whose apex sits
/// on the horizon and whose base spans `[bottom_left, bottom_right]` on the
/// last row.
#[derive(Clone, Copy, Debug)]
pub struct RoadScene {
    pub width: usize,
    pub height: usize,
    pub apex_x: f32,
    pub apex_y: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
    pub road: u8,
    pub background: u8,
}

impl Default for RoadScene {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            apex_x: 160.0,
            apex_y: 70.0,
            bottom_left: 20.0,
            bottom_right: 300.0,
            road: 180,
            background: 60,
        }
    }
}

impl RoadScene {
    pub fn render(&self) -> Vec<u8> {
        assert!(self.width > 0 && self.height > 0, "image dimensions must be positive");
        let mut img = vec![self.background; self.width * self.height];
        let bottom = (self.height - 1) as f32;
        for y in 0..self.height {
            let yf = y as f32;
            if yf <= self.apex_y {
                continue;
            }
            let t = (yf - self.apex_y) / (bottom - self.apex_y);
            let left = self.apex_x + t * (self.bottom_left - self.apex_x);
            let right = self.apex_x + t * (self.bottom_right - self.apex_x);
            for x in 0..self.width {
                let xf = x as f32;
                if xf >= left && xf <= right {
                    img[y * self.width + x] = self.road;
                }
            }
        }
        img
    }

    /// Only the left boundary, painted as a 3 px wide stripe broken into
    /// dashes of `on` rows separated by `off` dark rows.
    pub fn render_dashed_left_boundary(&self, on: usize, off: usize) -> Vec<u8> {
        assert!(on > 0, "dashes need at least one row");
        let mut img = vec![self.background; self.width * self.height];
        let bottom = (self.height - 1) as f32;
        let first = self.apex_y.ceil() as usize;
        for y in first..self.height {
            if (y - first) % (on + off) >= on {
                continue;
            }
            let t = (y as f32 - self.apex_y) / (bottom - self.apex_y);
            let left = (self.apex_x + t * (self.bottom_left - self.apex_x)).round() as i64;
            for x in (left - 1)..=(left + 1) {
                if (0..self.width as i64).contains(&x) {
                    img[y * self.width + x as usize] = self.road;
                }
            }
        }
        img
    }
}

/// Featureless frame.
pub fn uniform_u8(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}
