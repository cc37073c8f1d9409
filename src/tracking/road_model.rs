//! Arena of tracked lines.
//!
//! A line's slot index is its identity. Slots are never removed while their
//! line may still be reactivated; a line that drops out only flips
//! `is_active`, so its history stays addressable by index. A slot is reused
//! for a new identity once it has been inactive longer than the reactivation
//! window.
use super::line::Line;
use crate::types::ImagePoint;

/// Per-identity bookkeeping.
#[derive(Clone, Debug)]
pub struct LineSlot {
    pub line: Line,
    /// Frame index at which the line was last active.
    pub last_active_frame: u64,
    pub last_seen_horizon_point: ImagePoint,
    /// Last-seen bottom-row location.
    pub last_seen_location: ImagePoint,
    /// Frames in which a fresh detection matched this line.
    pub num_matches: u32,
    /// Identity number from the tracker's never-reset counter.
    pub identity: u64,
}

impl LineSlot {
    fn touch(&mut self, frame: u64) {
        self.last_active_frame = frame;
        self.last_seen_horizon_point = self.line.horizon_point;
        self.last_seen_location = self.line.road_bottom_point;
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoadModel {
    slots: Vec<LineSlot>,
}

impl RoadModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn slots(&self) -> &[LineSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&LineSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut LineSlot> {
        self.slots.get_mut(index)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.line.is_active).count()
    }

    pub fn active_lines(&self) -> impl Iterator<Item = &Line> {
        self.slots.iter().map(|s| &s.line).filter(|l| l.is_active)
    }

    pub fn active_lines_mut(&mut self) -> Vec<&mut Line> {
        self.slots
            .iter_mut()
            .map(|s| &mut s.line)
            .filter(|l| l.is_active)
            .collect()
    }

    /// Indices of active slots.
    pub fn active_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.line.is_active)
            .map(|(i, _)| i)
            .collect()
    }

    /// Registers `line` under a new identity and returns its slot index.
    /// Reuses the first slot whose line expired before `frame - window`.
    pub fn insert(&mut self, mut line: Line, frame: u64, window: u64, identity: u64) -> usize {
        let reusable = self
            .slots
            .iter()
            .position(|s| !s.line.is_active && frame.saturating_sub(s.last_active_frame) > window);
        let index = reusable.unwrap_or(self.slots.len());
        line.index = Some(index);
        line.is_active = true;
        let mut slot = LineSlot {
            line,
            last_active_frame: frame,
            last_seen_horizon_point: ImagePoint::default(),
            last_seen_location: ImagePoint::default(),
            num_matches: 0,
            identity,
        };
        slot.touch(frame);
        if index == self.slots.len() {
            self.slots.push(slot);
        } else {
            self.slots[index] = slot;
        }
        index
    }

    /// Refreshes last-seen bookkeeping of every active slot.
    pub fn touch_active(&mut self, frame: u64) {
        for slot in self.slots.iter_mut().filter(|s| s.line.is_active) {
            slot.touch(frame);
        }
    }

    /// Inactive slot still inside the reactivation window whose last-seen
    /// horizon and bottom points are both within `dist` of `line`'s.
    pub fn find_reactivatable(
        &self,
        line: &Line,
        frame: u64,
        window: u64,
        dist: f32,
    ) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                !s.line.is_active && frame.saturating_sub(s.last_active_frame) <= window
            })
            .filter(|(_, s)| {
                s.last_seen_horizon_point.distance(&line.horizon_point) <= dist
                    && s.last_seen_location.distance(&line.road_bottom_point) <= dist
            })
            .min_by(|(_, a), (_, b)| {
                let da = a.last_seen_location.distance(&line.road_bottom_point);
                let db = b.last_seen_location.distance(&line.road_bottom_point);
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_at(x: f32) -> Line {
        Line {
            horizon_point: ImagePoint::new(x, 70.0),
            road_bottom_point: ImagePoint::new(x - 100.0, 239.0),
            is_active: true,
            ..Line::default()
        }
    }

    #[test]
    fn expired_slots_are_reused_and_recent_ones_are_not() {
        let mut model = RoadModel::new();
        let a = model.insert(line_at(100.0), 1, 5, 1);
        let b = model.insert(line_at(200.0), 1, 5, 2);
        assert_eq!((a, b), (0, 1));
        model.slot_mut(a).unwrap().line.is_active = false;

        let c = model.insert(line_at(150.0), 4, 5, 3);
        assert_eq!(c, 2, "slot 0 is still inside the window");

        let d = model.insert(line_at(300.0), 10, 5, 4);
        assert_eq!(d, 0);
        assert_eq!(model.slot(0).unwrap().identity, 4);
        assert_eq!(model.slot(0).unwrap().line.index, Some(0));
    }

    #[test]
    fn reactivation_requires_proximity_and_recency() {
        let mut model = RoadModel::new();
        let a = model.insert(line_at(100.0), 1, 5, 1);
        model.slot_mut(a).unwrap().line.is_active = false;

        assert_eq!(model.find_reactivatable(&line_at(104.0), 3, 5, 10.0), Some(a));
        assert_eq!(model.find_reactivatable(&line_at(130.0), 3, 5, 10.0), None);
        assert_eq!(model.find_reactivatable(&line_at(104.0), 9, 5, 10.0), None);
    }
}
