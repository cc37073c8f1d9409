//! Vanishing-point estimation by Bayesian voting on a candidate grid.
//!
//! Candidates sit on a regular grid starting at the horizon row and extending
//! `band` pixels below it. Each candidate collects the segments whose infinite
//! line passes within `distthresh` pixels, whose midpoint lies below it, and
//! whose orientation agrees with the ray from the candidate to that midpoint.
//!
//! - Likelihood: length-weighted Gaussian of the line distance
//!   (σ = distthresh / 3).
//! - Prior: uniform without history; otherwise a Gaussian around the previous
//!   vanishing point plus a floor so the estimate can move.
//! - Posterior: prior × likelihood, normalized over supported candidates.
//!
//! The argmax is accepted only above a posterior floor and a minimum
//! likelihood; otherwise the frame has no estimate (loss of tracking).

mod candidate;
mod estimator;
mod stability;

pub use candidate::VanishingPointCandidate;
pub use estimator::{VanishingPointEstimator, VpGrid};
pub use stability::VpStability;

use serde::{Deserialize, Serialize};

/// Tuning of the vanishing-point vote.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VpParams {
    /// Allowed disagreement between a segment and the candidate ray (degrees).
    pub angle_tol_deg: f32,
    /// Spread of the temporal prior around the previous vanishing point (px).
    pub prior_sigma: f32,
    /// Prior mass kept for candidates far from the previous estimate.
    pub prior_floor: f32,
    /// Minimum normalized posterior of the winning candidate.
    pub posterior_floor: f32,
    /// Minimum supporting length (px, distance weighted) of the winner.
    pub min_likelihood: f32,
    /// Frames remembered when rating vanishing-point stability.
    pub stability_window: usize,
}

impl Default for VpParams {
    fn default() -> Self {
        Self {
            angle_tol_deg: 10.0,
            prior_sigma: 40.0,
            prior_floor: 0.1,
            posterior_floor: 0.01,
            min_likelihood: 30.0,
            stability_window: 10,
        }
    }
}
