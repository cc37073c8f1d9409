use std::collections::VecDeque;

/// Sliding record of whether a vanishing point was found in recent frames.
#[derive(Clone, Debug)]
pub struct VpStability {
    window: usize,
    history: VecDeque<bool>,
}

impl VpStability {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    pub fn record(&mut self, found: bool) {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(found);
    }

    /// Share of recorded frames with a vanishing point; 0 when empty.
    pub fn ratio(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().filter(|&&f| f).count() as f32 / self.history.len() as f32
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::VpStability;

    #[test]
    fn ratio_follows_window() {
        let mut s = VpStability::new(4);
        assert_eq!(s.ratio(), 0.0);
        for found in [true, false, true, true, true] {
            s.record(found);
        }
        assert!((s.ratio() - 0.75).abs() < 1e-6);
        s.clear();
        assert_eq!(s.ratio(), 0.0);
    }
}
