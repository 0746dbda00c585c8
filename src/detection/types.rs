// src/detection/types.rs
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushupStage {
    Unknown,
    Up,
    Down,
}

impl PushupStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushupStage::Unknown => "UNKNOWN",
            PushupStage::Up => "UP",
            PushupStage::Down => "DOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepQuality {
    Correct,
    Bad,
}

impl RepQuality {
    pub fn from_torso_angle(torso_angle: f32, good_posture_angle: f32) -> Self {
        if torso_angle >= good_posture_angle {
            RepQuality::Correct
        } else {
            RepQuality::Bad
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepEvent {
    /// 1-based, across both qualities
    pub index: u32,
    pub quality: RepQuality,
    pub timestamp_ms: f64,
    pub elbow_angle: f32,
    pub torso_angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpStage {
    Grounded,
    Airborne { since_ms: f64, peak_lift: f32 },
}

impl JumpStage {
    pub fn is_airborne(&self) -> bool {
        matches!(self, JumpStage::Airborne { .. })
    }
}

/// Outcome of an airborne phase ending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub airtime_ms: f64,
    pub peak_lift: f32,
    /// false when the airtime was too short to be a real jump
    pub counted: bool,
}

/// One counted jump, as written to the per-jump log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JumpRecord {
    /// seconds since the test window started
    pub offset_s: f64,
    pub index: u32,
    pub airtime_ms: f64,
    pub peak_lift: f32,
}
