// src/detection/jump.rs
//
// Displacement hysteresis on the smoothed ankle height. Take-off needs the
// lift to reach the calibrated threshold with both ankles level (rejects
// single-leg lifts and tracking glitches on one side); landing needs the
// lift to fall to half of it. Airborne phases shorter than the minimum
// airtime are discarded as detector noise.

use super::types::{JumpRecord, JumpStage, Landing};
use crate::analysis::calibration::CalibrationBaseline;
use crate::analysis::signal::SkipSignal;
use crate::smoother::ExponentialSmoother;
use crate::types::SkipConfig;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct JumpThresholds {
    pub lift: f32,
    pub land: f32,
    pub ankle_asymmetry_max: f32,
    pub min_airtime_ms: f64,
}

impl JumpThresholds {
    pub fn new(baseline: &CalibrationBaseline, config: &SkipConfig) -> Self {
        Self {
            lift: baseline.lift_threshold,
            land: baseline.land_threshold,
            ankle_asymmetry_max: config.ankle_asymmetry_max,
            min_airtime_ms: config.min_airtime_ms,
        }
    }
}

/// Pure step of the jump machine over an already smoothed lift value.
pub fn transition(
    stage: JumpStage,
    lift: f32,
    ankle_asymmetry: f32,
    timestamp_ms: f64,
    thresholds: &JumpThresholds,
) -> (JumpStage, Option<Landing>) {
    match stage {
        JumpStage::Grounded => {
            if lift >= thresholds.lift && ankle_asymmetry <= thresholds.ankle_asymmetry_max {
                (
                    JumpStage::Airborne {
                        since_ms: timestamp_ms,
                        peak_lift: lift,
                    },
                    None,
                )
            } else {
                (JumpStage::Grounded, None)
            }
        }
        JumpStage::Airborne {
            since_ms,
            peak_lift,
        } => {
            let peak_lift = peak_lift.max(lift);
            if lift <= thresholds.land {
                let airtime_ms = timestamp_ms - since_ms;
                let landing = Landing {
                    airtime_ms,
                    peak_lift,
                    counted: airtime_ms >= thresholds.min_airtime_ms,
                };
                (JumpStage::Grounded, Some(landing))
            } else {
                (
                    JumpStage::Airborne {
                        since_ms,
                        peak_lift,
                    },
                    None,
                )
            }
        }
    }
}

pub struct JumpDetector {
    baseline: CalibrationBaseline,
    thresholds: JumpThresholds,
    smoother: ExponentialSmoother,
    stage: JumpStage,
    test_start_ms: f64,
    jumps: Vec<JumpRecord>,
    last_lift: f32,
}

impl JumpDetector {
    pub fn new(baseline: CalibrationBaseline, config: &SkipConfig, test_start_ms: f64) -> Self {
        Self {
            thresholds: JumpThresholds::new(&baseline, config),
            baseline,
            smoother: ExponentialSmoother::new(config.ema_alpha),
            stage: JumpStage::Grounded,
            test_start_ms,
            jumps: Vec::new(),
            last_lift: 0.0,
        }
    }

    pub fn update(&mut self, signal: &SkipSignal, timestamp_ms: f64) -> Option<JumpRecord> {
        let smoothed_ankle = self.smoother.smooth(signal.ankle_y);
        let lift = self.baseline.lift(smoothed_ankle);
        self.last_lift = lift;

        let (next, landing) = transition(
            self.stage,
            lift,
            signal.ankle_asymmetry(),
            timestamp_ms,
            &self.thresholds,
        );
        self.stage = next;

        let landing = landing?;
        if !landing.counted {
            debug!(
                "Discarded airborne phase of {:.0}ms (min {:.0}ms)",
                landing.airtime_ms, self.thresholds.min_airtime_ms
            );
            return None;
        }

        let record = JumpRecord {
            offset_s: (timestamp_ms - self.test_start_ms) / 1000.0,
            index: self.jumps.len() as u32 + 1,
            airtime_ms: (landing.airtime_ms * 10.0).round() / 10.0,
            peak_lift: (landing.peak_lift * 10_000.0).round() / 10_000.0,
        };
        info!(
            "🦘 Jump #{} at {:.2}s | airtime={:.1}ms peak_lift={:.4}",
            record.index, record.offset_s, record.airtime_ms, record.peak_lift
        );
        self.jumps.push(record);
        Some(record)
    }

    pub fn jump_count(&self) -> u32 {
        self.jumps.len() as u32
    }

    pub fn jumps(&self) -> &[JumpRecord] {
        &self.jumps
    }

    pub fn stage(&self) -> JumpStage {
        self.stage
    }

    pub fn last_lift(&self) -> f32 {
        self.last_lift
    }
}
