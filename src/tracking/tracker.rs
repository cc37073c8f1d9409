use super::fitting::{FittedLine, LineFitter, TotalLeastSquaresFitter};
use super::line::{Line, RoadGeometry};
use super::pixels::{collect_rows, get_pixels, get_pixels_quick, RowSupport};
use super::road_model::RoadModel;
use super::TrackerParams;
use crate::angle::angular_difference;
use crate::edges::EdgeMap;
use crate::segments::Segment;
use crate::types::ImagePoint;
use crate::vp::VanishingPointCandidate;
use log::debug;
use serde::Serialize;

/// Per-frame tracking counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrackingOutcome {
    /// Active lines that survived the local search.
    pub tracked: usize,
    /// Active lines whose fitness collapsed.
    pub lost: usize,
    /// Fresh lines seeded from the vanishing point.
    pub detected: usize,
    /// Fresh lines that matched an active line.
    pub matched: usize,
    pub reactivated: usize,
    pub created: usize,
    /// Active lines discarded as duplicates.
    pub merged: usize,
    pub active: usize,
}

/// Scores candidate lines against an edge map and fits them.
struct LineSearch {
    params: TrackerParams,
    fitter: Box<dyn LineFitter>,
}

impl LineSearch {
    /// Fitness in [0, 1]: support density damped by the fit residual.
    fn fitness(&self, fit: &FittedLine, edges: &EdgeMap, geometry: &RoadGeometry) -> (f32, RowSupport) {
        let support = collect_rows(fit, geometry.horizon, geometry.bottom_row(), edges);
        if support.points.len() < self.params.min_line_points.max(2) {
            return (0.0, support);
        }
        let sq: f32 = support
            .points
            .iter()
            .map(|p| {
                let d = fit.distance(p.to_image());
                d * d
            })
            .sum();
        let rmse = (sq / support.points.len() as f32).sqrt();
        let scale = self.params.fit_residual_scale.max(1e-3);
        (support.density() * (-rmse / scale).exp(), support)
    }

    /// Refits on `support` and keeps whichever of `fit` and the refit scores
    /// higher.
    fn refine(
        &self,
        fit: FittedLine,
        score: f32,
        support: RowSupport,
        edges: &EdgeMap,
        geometry: &RoadGeometry,
    ) -> (FittedLine, f32, RowSupport) {
        if let Some(refit) = self.fitter.fit(&support.points) {
            let (refit_score, refit_support) = self.fitness(&refit, edges, geometry);
            if refit_score >= score {
                return (refit, refit_score, refit_support);
            }
        }
        (fit, score, support)
    }

    /// Local search around the line's horizon and bottom crossings. Updates
    /// the line in place and returns false when it should be deactivated.
    fn track_line(&self, line: &mut Line, edges: &EdgeMap, geometry: &RoadGeometry) -> bool {
        let r = self.params.track_search_px.max(0);
        let step = self.params.track_search_step.max(1) as usize;
        let (hp, bp) = (line.horizon_point, line.road_bottom_point);

        let mut best: Option<(FittedLine, f32, RowSupport, i32)> = None;
        for dt in (-r..=r).step_by(step) {
            for db in (-r..=r).step_by(step) {
                let top = ImagePoint::new(hp.x + dt as f32, hp.y);
                let bottom = ImagePoint::new(bp.x + db as f32, bp.y);
                let Some(fit) = FittedLine::through(top, bottom) else {
                    continue;
                };
                let (score, support) = self.fitness(&fit, edges, geometry);
                let shift = dt.abs() + db.abs();
                let better = match &best {
                    None => true,
                    Some((_, s, _, best_shift)) => {
                        score > *s + 1e-6 || ((score - *s).abs() <= 1e-6 && shift < *best_shift)
                    }
                };
                if better {
                    best = Some((fit, score, support, shift));
                }
            }
        }

        let Some((fit, score, support, _)) = best else {
            return false;
        };
        if score < self.params.active_threshold {
            return false;
        }
        let (fit, score, support) = self.refine(fit, score, support, edges, geometry);
        if !line.set_geometry(&fit, geometry) {
            return false;
        }
        line.points = support.points;
        line.record_score(score, self.params.score_history_len, self.params.start_history_len);
        true
    }

    /// Grows a line from `segments[seed]`: groups the unused segments
    /// colinear with it, fits their edge pixels and scores the fit over the
    /// full horizon-to-bottom span. Grouped segments are marked used.
    fn find_line(
        &self,
        seed: usize,
        segments: &[Segment],
        used: &mut [bool],
        edges: &EdgeMap,
        geometry: &RoadGeometry,
    ) -> Option<Line> {
        let seed_segment = &segments[seed];
        used[seed] = true;
        let angle_tol = self.params.group_angle_deg.to_radians();
        let mut group = vec![seed_segment.clone()];
        for (j, s) in segments.iter().enumerate() {
            if !used[j] && seed_segment.is_colinear_with(s, angle_tol, self.params.group_dist_px) {
                used[j] = true;
                group.push(s.clone());
            }
        }

        let mut pixels = Vec::new();
        for s in &group {
            // Shallow segments cross few rows; fall back to their raster.
            let mut found = get_pixels(s.p1.to_image(), s.p2.to_image(), edges);
            if found.len() < 2 {
                found = get_pixels_quick(s.p1, s.p2, edges);
            }
            if found.len() >= 2 {
                pixels.extend(found);
            } else {
                pixels.extend([s.p1, s.p2]);
            }
        }
        let fit = self.fitter.fit(&pixels)?;
        let (score, support) = self.fitness(&fit, edges, geometry);
        let (fit, score, support) = self.refine(fit, score, support, edges, geometry);
        if score < self.params.active_threshold {
            return None;
        }
        let mut line = Line::from_fit(&fit, geometry)?;
        line.points = support.points;
        line.segments = group;
        line.record_score(score, self.params.score_history_len, self.params.start_history_len);
        Some(line)
    }

    /// Fresh lines from the segments supporting `vp`, longest seeds first,
    /// sorted by descending score.
    fn lines_from_vanishing_point(
        &self,
        vp: &VanishingPointCandidate,
        edges: &EdgeMap,
        geometry: &RoadGeometry,
    ) -> Vec<Line> {
        let mut segments = vp.supporting_segments.clone();
        segments.sort_by(|a, b| b.length.total_cmp(&a.length));
        let mut used = vec![false; segments.len()];
        let mut lines = Vec::new();
        for seed in 0..segments.len() {
            if used[seed] {
                continue;
            }
            if let Some(line) = self.find_line(seed, &segments, &mut used, edges, geometry) {
                lines.push(line);
            }
        }
        lines.sort_by(|a, b| b.score.total_cmp(&a.score));
        lines
    }
}

/// True when `a` and `b` describe the same boundary.
pub fn is_duplicate(a: &Line, b: &Line, params: &TrackerParams) -> bool {
    a.horizon_point.distance(&b.horizon_point) <= params.merge_dist_px
        && a.road_bottom_point.distance(&b.road_bottom_point) <= params.merge_dist_px
        && angular_difference(a.angle, b.angle) <= params.merge_angle_deg.to_radians()
}

/// Ordering used when two duplicates compete: higher score, then more
/// support, then the older identity.
fn preferred_order(a: &Line, b: &Line) -> std::cmp::Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.points.len().cmp(&a.points.len()))
        .then_with(|| a.index.unwrap_or(usize::MAX).cmp(&b.index.unwrap_or(usize::MAX)))
}

/// Indices into `lines` that survive duplicate removal, in preference order.
fn surviving(lines: &[&Line], params: &TrackerParams) -> Vec<usize> {
    let mut order: Vec<usize> = (0..lines.len()).collect();
    order.sort_by(|&i, &j| preferred_order(lines[i], lines[j]));
    let mut kept: Vec<usize> = Vec::with_capacity(order.len());
    for i in order {
        if kept.iter().all(|&k| !is_duplicate(lines[k], lines[i], params)) {
            kept.push(i);
        }
    }
    kept
}

/// Collapses duplicate lines, keeping the preferred line of every group.
/// No two returned lines are duplicates of each other.
pub fn discard_duplicates(lines: Vec<Line>, params: &TrackerParams) -> Vec<Line> {
    let refs: Vec<&Line> = lines.iter().collect();
    let mut keep = vec![false; lines.len()];
    for i in surviving(&refs, params) {
        keep[i] = true;
    }
    lines
        .into_iter()
        .zip(keep)
        .filter_map(|(l, k)| k.then_some(l))
        .collect()
}

/// Frame-to-frame line tracker over a [`RoadModel`].
pub struct LineTracker {
    search: LineSearch,
    model: RoadModel,
    frame_index: u64,
    identified_lines: u64,
}

impl LineTracker {
    pub fn new(params: TrackerParams) -> Self {
        Self::with_fitter(params, Box::new(TotalLeastSquaresFitter))
    }

    pub fn with_fitter(params: TrackerParams, fitter: Box<dyn LineFitter>) -> Self {
        Self {
            search: LineSearch { params, fitter },
            model: RoadModel::new(),
            frame_index: 0,
            identified_lines: 0,
        }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.search.params
    }

    pub fn model(&self) -> &RoadModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut RoadModel {
        &mut self.model
    }

    /// Identities handed out since construction. Never reset.
    pub fn identified_lines(&self) -> u64 {
        self.identified_lines
    }

    pub fn active_lines(&self) -> impl Iterator<Item = &Line> {
        self.model.active_lines()
    }

    /// Swaps the tuning and drops every tracked line.
    pub fn set_params(&mut self, params: TrackerParams) {
        self.search.params = params;
        self.reset();
    }

    /// Drops every tracked line. The identity counter keeps counting.
    pub fn reset(&mut self) {
        self.model.clear();
    }

    /// Runs one tracking step against `edges`. `estimate` seeds fresh lines.
    pub fn update(
        &mut self,
        edges: &EdgeMap,
        estimate: Option<&VanishingPointCandidate>,
        geometry: &RoadGeometry,
    ) -> TrackingOutcome {
        self.frame_index += 1;
        let mut outcome = TrackingOutcome::default();

        for idx in self.model.active_indices() {
            let Some(slot) = self.model.slot_mut(idx) else {
                continue;
            };
            if self.search.track_line(&mut slot.line, edges, geometry) {
                outcome.tracked += 1;
            } else {
                slot.line.is_active = false;
                outcome.lost += 1;
                debug!("line {idx} lost at frame {}", self.frame_index);
            }
        }

        let fresh = estimate
            .map(|vp| self.search.lines_from_vanishing_point(vp, edges, geometry))
            .unwrap_or_default();
        outcome.detected = fresh.len();
        self.combine(fresh, &mut outcome);
        outcome.merged = self.discard_active_duplicates();
        self.model.touch_active(self.frame_index);
        outcome.active = self.model.active_count();
        debug!(
            "frame {}: tracked={} lost={} detected={} matched={} reactivated={} created={} merged={}",
            self.frame_index,
            outcome.tracked,
            outcome.lost,
            outcome.detected,
            outcome.matched,
            outcome.reactivated,
            outcome.created,
            outcome.merged
        );
        outcome
    }

    /// Merges freshly detected lines into the model. A fresh line that
    /// duplicates an active one replaces its geometry when it scores higher;
    /// one near a recently lost line revives that identity; anything else is
    /// registered under a new identity.
    fn combine(&mut self, fresh: Vec<Line>, outcome: &mut TrackingOutcome) {
        let frame = self.frame_index;
        let params = self.search.params.clone();
        for line in fresh {
            let matched = self
                .model
                .active_indices()
                .into_iter()
                .find(|&i| self.model.slot(i).is_some_and(|s| is_duplicate(&s.line, &line, &params)));
            if let Some(i) = matched {
                if let Some(slot) = self.model.slot_mut(i) {
                    slot.num_matches += 1;
                    if line.score > slot.line.score {
                        let score = line.score;
                        slot.line.adopt_geometry(line);
                        slot.line.score = score;
                        if let Some(last) = slot.line.scores.last_mut() {
                            *last = score;
                        }
                    }
                }
                outcome.matched += 1;
                continue;
            }

            if let Some(i) = self.model.find_reactivatable(
                &line,
                frame,
                params.reactivation_frames,
                params.reactivation_dist_px,
            ) {
                if let Some(slot) = self.model.slot_mut(i) {
                    let score = line.score;
                    slot.line.adopt_geometry(line);
                    slot.line.is_active = true;
                    slot.line.record_score(score, params.score_history_len, params.start_history_len);
                    slot.num_matches += 1;
                    debug!("line {i} reactivated after {} frames", frame - slot.last_active_frame);
                }
                outcome.reactivated += 1;
                continue;
            }

            self.identified_lines += 1;
            let i = self
                .model
                .insert(line, frame, params.reactivation_frames, self.identified_lines);
            debug!("line {i} created as identity {}", self.identified_lines);
            outcome.created += 1;
        }
    }

    /// Deactivates the less preferred line of every duplicate pair among
    /// active lines. Returns how many were deactivated.
    fn discard_active_duplicates(&mut self) -> usize {
        let indices = self.model.active_indices();
        let kept: Vec<usize> = {
            let lines: Vec<&Line> = indices
                .iter()
                .filter_map(|&i| self.model.slot(i).map(|s| &s.line))
                .collect();
            surviving(&lines, &self.search.params)
                .into_iter()
                .map(|k| indices[k])
                .collect()
        };
        let mut merged = 0;
        for i in indices {
            if kept.contains(&i) {
                continue;
            }
            if let Some(slot) = self.model.slot_mut(i) {
                slot.line.is_active = false;
                merged += 1;
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests;
