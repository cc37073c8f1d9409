use super::*;
use crate::angle::line_angle;
use crate::tracking::pixels::raster_line;
use crate::types::PixelPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const W: usize = 320;
const H: usize = 240;

fn geometry() -> RoadGeometry {
    RoadGeometry {
        horizon: 70,
        support: 20,
        width: W,
        height: H,
    }
}

fn boundaries() -> (Vec<PixelPoint>, Vec<PixelPoint>) {
    let apex = PixelPoint::new(160, 70);
    (
        raster_line(apex, PixelPoint::new(20, 239)),
        raster_line(apex, PixelPoint::new(300, 239)),
    )
}

fn road_edges() -> EdgeMap {
    let (left, right) = boundaries();
    EdgeMap::from_points(W, H, left.into_iter().chain(right))
}

fn road_estimate() -> VanishingPointCandidate {
    let (left, right) = boundaries();
    let seg = |pts: &[PixelPoint], a: usize, b: usize| {
        Segment::from_endpoints(pts[a], pts[b], 1.0).expect("segment")
    };
    VanishingPointCandidate {
        supporting_segments: vec![
            seg(&left, 30, 160),
            seg(&right, 30, 160),
            // Second piece of the left boundary; grouped with the first.
            seg(&left, 110, 165),
        ],
        ..VanishingPointCandidate::new(PixelPoint::new(160, 70))
    }
}

fn line(top: f32, bottom: f32, score: f32) -> Line {
    let horizon_point = ImagePoint::new(top, 70.0);
    let road_bottom_point = ImagePoint::new(bottom, 239.0);
    Line {
        horizon_point,
        road_bottom_point,
        angle: line_angle(horizon_point, road_bottom_point).unwrap_or(0.0),
        score,
        is_active: true,
        ..Line::default()
    }
}

#[test]
fn cold_start_registers_one_line_per_boundary() {
    let mut tracker = LineTracker::new(TrackerParams::default());
    let outcome = tracker.update(&road_edges(), Some(&road_estimate()), &geometry());
    assert_eq!(outcome.detected, 2);
    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.active, 2);
    assert_eq!(tracker.identified_lines(), 2);

    let lines: Vec<&Line> = tracker.active_lines().collect();
    let left = lines.iter().find(|l| l.is_left()).expect("left line");
    let right = lines.iter().find(|l| !l.is_left()).expect("right line");
    assert!((left.road_bottom_point.x - 20.0).abs() < 2.0, "{:?}", left.road_bottom_point);
    assert!((right.road_bottom_point.x - 300.0).abs() < 2.0, "{:?}", right.road_bottom_point);
    assert!((left.horizon_point.x - 160.0).abs() < 2.0);
    assert!(left.score > 0.5);
    assert_eq!(left.segments.len(), 2);
}

#[test]
fn tracked_lines_keep_their_identity() {
    let mut tracker = LineTracker::new(TrackerParams::default());
    let edges = road_edges();
    let estimate = road_estimate();
    tracker.update(&edges, Some(&estimate), &geometry());
    let before: Vec<Option<usize>> = tracker.active_lines().map(|l| l.index).collect();

    let outcome = tracker.update(&edges, Some(&estimate), &geometry());
    assert_eq!(outcome.tracked, 2);
    assert_eq!(outcome.matched, 2);
    assert_eq!(outcome.created, 0);
    let after: Vec<Option<usize>> = tracker.active_lines().map(|l| l.index).collect();
    assert_eq!(before, after);
    assert!(tracker.active_lines().all(|l| l.scores.len() == 2));
}

#[test]
fn short_dropout_reactivates_the_same_identities() {
    let mut tracker = LineTracker::new(TrackerParams::default());
    let edges = road_edges();
    let estimate = road_estimate();
    let blank = EdgeMap::new(W, H);

    tracker.update(&edges, Some(&estimate), &geometry());
    tracker.update(&edges, Some(&estimate), &geometry());
    let left_index = tracker.active_lines().find(|l| l.is_left()).and_then(|l| l.index);

    let lost = tracker.update(&blank, None, &geometry());
    assert_eq!(lost.lost, 2);
    assert_eq!(lost.active, 0);
    tracker.update(&blank, None, &geometry());

    let back = tracker.update(&edges, Some(&estimate), &geometry());
    assert_eq!(back.reactivated, 2);
    assert_eq!(back.created, 0);
    assert_eq!(tracker.identified_lines(), 2);
    let left = tracker.active_lines().find(|l| l.is_left()).expect("left line");
    assert_eq!(left.index, left_index);
    assert_eq!(left.scores.len(), 3, "history resumes across the gap");
}

#[test]
fn long_dropout_creates_new_identities() {
    let params = TrackerParams {
        reactivation_frames: 2,
        ..TrackerParams::default()
    };
    let mut tracker = LineTracker::new(params);
    let edges = road_edges();
    let estimate = road_estimate();
    let blank = EdgeMap::new(W, H);

    tracker.update(&edges, Some(&estimate), &geometry());
    for _ in 0..5 {
        tracker.update(&blank, None, &geometry());
    }
    let outcome = tracker.update(&edges, Some(&estimate), &geometry());
    assert_eq!(outcome.reactivated, 0);
    assert_eq!(outcome.created, 2);
    assert_eq!(tracker.identified_lines(), 4);
    // Expired slots are recycled.
    assert_eq!(tracker.model().slots().len(), 2);
    assert!(tracker.model().slots().iter().all(|s| s.identity > 2));
}

#[test]
fn reset_clears_lines_but_not_the_identity_counter() {
    let mut tracker = LineTracker::new(TrackerParams::default());
    tracker.update(&road_edges(), Some(&road_estimate()), &geometry());
    tracker.reset();
    assert_eq!(tracker.active_lines().count(), 0);
    assert_eq!(tracker.identified_lines(), 2);

    tracker.update(&road_edges(), Some(&road_estimate()), &geometry());
    assert_eq!(tracker.identified_lines(), 4);
}

#[test]
fn close_lines_collapse_to_the_fitter_one() {
    let params = TrackerParams::default();
    let weak = line(160.0, 20.0, 0.4);
    let strong = line(163.0, 24.0, 0.9);
    let other = line(160.0, 300.0, 0.6);
    let kept = discard_duplicates(vec![weak, strong, other], &params);
    assert_eq!(kept.len(), 2);
    assert!(kept.iter().any(|l| (l.score - 0.9).abs() < 1e-6));
    assert!(kept.iter().all(|l| (l.score - 0.4).abs() > 1e-6));
}

#[test]
fn no_duplicates_survive_random_line_sets() {
    let params = TrackerParams::default();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let lines: Vec<Line> = (0..40)
            .map(|_| {
                line(
                    rng.gen_range(140.0..180.0),
                    rng.gen_range(-40.0..360.0),
                    rng.gen_range(0.0..1.0),
                )
            })
            .collect();
        let kept = discard_duplicates(lines.clone(), &params);
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(!is_duplicate(a, b, &params));
            }
        }
        // Every dropped line is represented by a kept duplicate that scores
        // at least as high.
        for l in &lines {
            assert!(kept
                .iter()
                .any(|k| (k.score == l.score && k.horizon_point == l.horizon_point)
                    || (is_duplicate(k, l, &params) && k.score >= l.score)));
        }
    }
}
