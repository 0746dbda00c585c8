// src/analysis/calibration.rs
//
// Standing baseline for the jump detector. The person stands still for a
// short warm-up window; the median ankle and hip heights over that window
// fix the reference and the lift/land thresholds for the rest of the
// session.

use super::signal::SkipSignal;
use crate::smoother::median;
use crate::types::SkipConfig;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationBaseline {
    pub ankle_y: f32,
    pub hip_y: f32,
    pub lower_limb_length: f32,
    pub lift_threshold: f32,
    pub land_threshold: f32,
}

impl CalibrationBaseline {
    /// Computes the baseline from raw calibration samples. `None` when either
    /// sample set is empty.
    pub fn from_samples(
        ankle_samples: &[f32],
        hip_samples: &[f32],
        config: &SkipConfig,
    ) -> Option<Self> {
        let ankle_y = median(ankle_samples)?;
        let hip_y = median(hip_samples)?;

        let lower_limb_length = (ankle_y - hip_y).max(config.min_lower_limb);
        let lift_threshold =
            (config.lift_fraction_of_lower_limb * lower_limb_length).max(config.min_lift_abs);
        let land_threshold = lift_threshold * config.land_ratio;

        Some(Self {
            ankle_y,
            hip_y,
            lower_limb_length,
            lift_threshold,
            land_threshold,
        })
    }

    /// Upward ankle displacement relative to the standing baseline, clamped
    /// at zero.
    pub fn lift(&self, ankle_y: f32) -> f32 {
        (self.ankle_y - ankle_y).max(0.0)
    }
}

pub struct Calibrator {
    started_ms: f64,
    window_ms: f64,
    min_samples: usize,
    ankle_samples: Vec<f32>,
    hip_samples: Vec<f32>,
}

impl Calibrator {
    pub fn new(started_ms: f64, config: &SkipConfig) -> Self {
        Self {
            started_ms,
            window_ms: config.calibration_secs * 1000.0,
            min_samples: config.min_calibration_samples,
            ankle_samples: Vec::new(),
            hip_samples: Vec::new(),
        }
    }

    /// Adds one sample; returns the baseline once both the time window has
    /// elapsed and enough samples were collected.
    pub fn push(
        &mut self,
        signal: &SkipSignal,
        timestamp_ms: f64,
        config: &SkipConfig,
    ) -> Option<CalibrationBaseline> {
        self.ankle_samples.push(signal.ankle_y);
        self.hip_samples.push(signal.hip_y);

        if timestamp_ms - self.started_ms < self.window_ms
            || self.ankle_samples.len() < self.min_samples
        {
            return None;
        }

        let baseline =
            CalibrationBaseline::from_samples(&self.ankle_samples, &self.hip_samples, config)?;
        info!(
            "✓ Calibration complete after {} samples: ankle={:.4}, hip={:.4}, lift>={:.4}, land<={:.4}",
            self.ankle_samples.len(),
            baseline.ankle_y,
            baseline.hip_y,
            baseline.lift_threshold,
            baseline.land_threshold
        );
        Some(baseline)
    }

    pub fn sample_count(&self) -> usize {
        self.ankle_samples.len()
    }
}
