// src/detection/pushup.rs
//
// Two-threshold hysteresis on the elbow angle. Arms straight (> up) arms
// the machine; arms bent (< down) from the armed state completes one rep,
// graded by how straight the body was at that moment.

use super::types::{PushupStage, RepEvent, RepQuality};
use crate::analysis::signal::PushupSignal;
use crate::types::PushupConfig;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct PushupThresholds {
    pub up_angle: f32,
    pub down_angle: f32,
    pub good_posture_angle: f32,
}

impl From<&PushupConfig> for PushupThresholds {
    fn from(config: &PushupConfig) -> Self {
        Self {
            up_angle: config.up_angle_deg,
            down_angle: config.down_angle_deg,
            good_posture_angle: config.good_posture_angle_deg,
        }
    }
}

/// Pure step of the push-up machine. Returns the next stage and, when this
/// frame completed a rep, its quality.
pub fn transition(
    stage: PushupStage,
    signal: &PushupSignal,
    thresholds: &PushupThresholds,
) -> (PushupStage, Option<RepQuality>) {
    if signal.elbow_angle > thresholds.up_angle {
        return (PushupStage::Up, None);
    }
    if signal.elbow_angle < thresholds.down_angle && stage == PushupStage::Up {
        let quality =
            RepQuality::from_torso_angle(signal.torso_angle, thresholds.good_posture_angle);
        return (PushupStage::Down, Some(quality));
    }
    (stage, None)
}

pub struct PushupCounter {
    thresholds: PushupThresholds,
    stage: PushupStage,
    correct: u32,
    bad: u32,
    last_posture_good: Option<bool>,
}

impl PushupCounter {
    pub fn new(thresholds: PushupThresholds) -> Self {
        Self {
            thresholds,
            stage: PushupStage::Unknown,
            correct: 0,
            bad: 0,
            last_posture_good: None,
        }
    }

    pub fn update(&mut self, signal: &PushupSignal, timestamp_ms: f64) -> Option<RepEvent> {
        self.last_posture_good = Some(signal.torso_angle >= self.thresholds.good_posture_angle);

        let (next, quality) = transition(self.stage, signal, &self.thresholds);
        if next != self.stage {
            debug!(
                "Stage {} → {} (elbow={:.0}°)",
                self.stage.as_str(),
                next.as_str(),
                signal.elbow_angle
            );
        }
        self.stage = next;

        let quality = quality?;
        match quality {
            RepQuality::Correct => self.correct += 1,
            RepQuality::Bad => self.bad += 1,
        }

        let event = RepEvent {
            index: self.total(),
            quality,
            timestamp_ms,
            elbow_angle: signal.elbow_angle,
            torso_angle: signal.torso_angle,
        };
        info!(
            "💪 Push-up #{} ({:?}) at {:.2}s | elbow={:.0}° torso={:.0}°",
            event.index,
            quality,
            timestamp_ms / 1000.0,
            signal.elbow_angle,
            signal.torso_angle
        );
        Some(event)
    }

    #[cfg(test)]
    pub fn stage(&self) -> PushupStage {
        self.stage
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn bad(&self) -> u32 {
        self.bad
    }

    pub fn total(&self) -> u32 {
        self.correct + self.bad
    }

    /// Posture verdict of the most recent frame that carried a signal.
    pub fn posture_good(&self) -> Option<bool> {
        self.last_posture_good
    }
}
