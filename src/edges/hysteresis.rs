//! Double-threshold hysteresis linking weak NMS responses to strong ones.
use super::map::EdgeMap;
use super::nms::EdgeElement;

const STRONG: u8 = 2;
const WEAK: u8 = 1;

/// Keep every NMS sample at or above `high`, plus samples at or above `low`
/// that are 8-connected (through other kept samples) to a strong one.
pub fn link_edges(w: usize, h: usize, elements: &[EdgeElement], low: f32, high: f32) -> EdgeMap {
    let mut labels = vec![0u8; w * h];
    let mut stack = Vec::new();
    for e in elements {
        let idx = e.y as usize * w + e.x as usize;
        if e.magnitude >= high {
            labels[idx] = STRONG;
            stack.push(idx);
        } else if e.magnitude >= low {
            labels[idx] = WEAK;
        }
    }

    let mut out = EdgeMap::new(w, h);
    while let Some(idx) = stack.pop() {
        if out.data[idx] != 0 {
            continue;
        }
        out.data[idx] = 255;
        let x = (idx % w) as isize;
        let y = (idx / w) as isize;
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let nidx = ny as usize * w + nx as usize;
                if labels[nidx] != 0 && out.data[nidx] == 0 {
                    stack.push(nidx);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(x: u32, y: u32, magnitude: f32) -> EdgeElement {
        EdgeElement { x, y, magnitude }
    }

    #[test]
    fn weak_pixels_survive_only_when_connected() {
        let elements = vec![
            element(2, 2, 1.0),
            element(3, 3, 0.3),
            element(4, 4, 0.3),
            element(8, 8, 0.3),
        ];
        let map = link_edges(10, 10, &elements, 0.2, 0.8);
        assert!(map.is_edge(2, 2));
        assert!(map.is_edge(3, 3));
        assert!(map.is_edge(4, 4));
        assert!(!map.is_edge(8, 8));
        assert_eq!(map.count(), 3);
    }
}
