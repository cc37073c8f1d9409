//! Temporal smoothing of the steering target.
//!
//! [`ScalarKalmanFilter`] is the capability the smoother needs; the default
//! [`ConstantVelocityKalman`] tracks position and velocity of a single
//! coordinate.
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

pub trait ScalarKalmanFilter: Send + Sync {
    /// Restarts the filter at `measurement` with the initial covariance.
    fn init(&mut self, measurement: f32);
    /// Time update; returns the predicted value.
    fn predict(&mut self) -> f32;
    /// Measurement update; returns the corrected value.
    fn correct(&mut self, measurement: f32) -> f32;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherParams {
    /// Process noise on position and velocity.
    pub process_noise: f32,
    pub measurement_noise: f32,
    pub initial_covariance: f32,
    /// Consecutive zero-confidence frames after which the filter restarts
    /// from the next measurement.
    pub reinit_after_lost: u32,
}

impl Default for SmootherParams {
    fn default() -> Self {
        Self {
            process_noise: 0.01,
            measurement_noise: 1.0,
            initial_covariance: 1.0,
            reinit_after_lost: 10,
        }
    }
}

/// Constant-velocity model: state `[x, dx]`, one frame per step.
#[derive(Clone, Debug)]
pub struct ConstantVelocityKalman {
    state: Vector2<f32>,
    covariance: Matrix2<f32>,
    transition: Matrix2<f32>,
    process_noise: Matrix2<f32>,
    measurement_noise: f32,
    initial_covariance: f32,
}

impl ConstantVelocityKalman {
    pub fn new(params: &SmootherParams) -> Self {
        Self {
            state: Vector2::zeros(),
            covariance: Matrix2::identity() * params.initial_covariance,
            transition: Matrix2::new(1.0, 1.0, 0.0, 1.0),
            process_noise: Matrix2::identity() * params.process_noise,
            measurement_noise: params.measurement_noise.max(1e-6),
            initial_covariance: params.initial_covariance,
        }
    }
}

impl ScalarKalmanFilter for ConstantVelocityKalman {
    fn init(&mut self, measurement: f32) {
        self.state = Vector2::new(measurement, 0.0);
        self.covariance = Matrix2::identity() * self.initial_covariance;
    }

    fn predict(&mut self) -> f32 {
        self.state = self.transition * self.state;
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;
        self.state[0]
    }

    fn correct(&mut self, measurement: f32) -> f32 {
        // H = [1, 0]
        let innovation = measurement - self.state[0];
        let s = self.covariance[(0, 0)] + self.measurement_noise;
        let gain = self.covariance.column(0) / s;
        self.state += gain * innovation;
        let kh = Matrix2::new(gain[0], 0.0, gain[1], 0.0);
        self.covariance = (Matrix2::identity() - kh) * self.covariance;
        self.state[0]
    }
}

/// Wraps a filter with initialization and loss handling.
pub struct TemporalSmoother {
    filter: Box<dyn ScalarKalmanFilter>,
    needs_init: bool,
    lost_frames: u32,
    reinit_after_lost: u32,
}

impl TemporalSmoother {
    pub fn new(params: &SmootherParams) -> Self {
        Self::with_filter(params, Box::new(ConstantVelocityKalman::new(params)))
    }

    pub fn with_filter(params: &SmootherParams, filter: Box<dyn ScalarKalmanFilter>) -> Self {
        Self {
            filter,
            needs_init: true,
            lost_frames: 0,
            reinit_after_lost: params.reinit_after_lost.max(1),
        }
    }

    /// Feeds a measurement and returns the filtered value. The first
    /// measurement after (re)initialization passes through unchanged.
    pub fn update(&mut self, measurement: f32) -> f32 {
        self.lost_frames = 0;
        if self.needs_init {
            self.filter.init(measurement);
            self.needs_init = false;
            measurement
        } else {
            self.filter.predict();
            self.filter.correct(measurement)
        }
    }

    /// Records a frame without a usable measurement.
    pub fn mark_lost(&mut self) {
        self.lost_frames = self.lost_frames.saturating_add(1);
        if self.lost_frames >= self.reinit_after_lost {
            self.needs_init = true;
        }
    }

    /// Forces the next measurement to restart the filter.
    pub fn reset(&mut self) {
        self.needs_init = true;
        self.lost_frames = 0;
    }

    pub fn needs_init(&self) -> bool {
        self.needs_init
    }

    pub fn lost_frames(&self) -> u32 {
        self.lost_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn variance(values: &[f32]) -> f32 {
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32
    }

    #[test]
    fn step_input_converges() {
        let mut smoother = TemporalSmoother::new(&SmootherParams::default());
        assert_eq!(smoother.update(0.0), 0.0);
        let mut out = 0.0;
        for _ in 0..200 {
            out = smoother.update(100.0);
        }
        assert!((out - 100.0).abs() < 1.0, "out={out}");
    }

    #[test]
    fn noise_is_attenuated() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut smoother = TemporalSmoother::new(&SmootherParams::default());
        let mut raw = Vec::new();
        let mut filtered = Vec::new();
        for i in 0..400 {
            let z = 50.0 + rng.gen_range(-5.0..5.0);
            let f = smoother.update(z);
            if i >= 100 {
                raw.push(z);
                filtered.push(f);
            }
        }
        assert!(variance(&filtered) < 0.5 * variance(&raw));
    }

    #[test]
    fn prolonged_loss_restarts_at_the_next_measurement() {
        let params = SmootherParams {
            reinit_after_lost: 3,
            ..SmootherParams::default()
        };
        let mut smoother = TemporalSmoother::new(&params);
        for _ in 0..20 {
            smoother.update(10.0);
        }
        smoother.mark_lost();
        smoother.mark_lost();
        assert!(!smoother.needs_init());
        smoother.mark_lost();
        assert!(smoother.needs_init());
        assert_eq!(smoother.update(90.0), 90.0);
        assert_eq!(smoother.lost_frames(), 0);
    }

    #[test]
    fn short_loss_keeps_filter_state() {
        let mut smoother = TemporalSmoother::new(&SmootherParams::default());
        for _ in 0..20 {
            smoother.update(10.0);
        }
        smoother.mark_lost();
        let out = smoother.update(90.0);
        assert!(out < 90.0 && out > 10.0);
    }
}
