use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub model: ModelConfig,
    pub display: DisplayConfig,
    pub pushup: PushupConfig,
    pub skip: SkipConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub device_id: i32,
    /// Replay a recorded video instead of opening the camera.
    pub input_path: Option<String>,
    pub fallback_width: i32,
    pub fallback_height: i32,
    pub fallback_fps: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            input_path: None,
            fallback_width: 640,
            fallback_height: 480,
            fallback_fps: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    Nhwc,
    Nchw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    pub input_width: usize,
    pub input_height: usize,
    pub layout: TensorLayout,
    pub num_threads: usize,
    pub use_cuda: bool,
    /// Pose presence below this score is reported as "no detection".
    pub min_detection_confidence: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/pose_landmark_full.onnx".to_string(),
            input_width: 256,
            input_height: 256,
            layout: TensorLayout::Nhwc,
            num_threads: 2,
            use_cuda: false,
            min_detection_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
    pub quit_key: char,
    pub wait_key_ms: i32,
    pub draw_skeleton: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quit_key: 'q',
            wait_key_ms: 1,
            draw_skeleton: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySide {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushupConfig {
    pub duration_secs: f64,
    /// A joint is usable only when its visibility is strictly above this.
    pub min_visibility: f32,
    pub up_angle_deg: f32,
    pub down_angle_deg: f32,
    /// Shoulder-hip-knee angle at or above which a rep counts as correct.
    pub good_posture_angle_deg: f32,
    pub side: BodySide,
    pub mirror: bool,
    pub log_path: String,
    pub video_path: String,
    pub fourcc: String,
}

impl Default for PushupConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60.0,
            min_visibility: 0.7,
            up_angle_deg: 160.0,
            down_angle_deg: 70.0,
            good_posture_angle_deg: 150.0,
            side: BodySide::Left,
            mirror: false,
            log_path: "pushup_log.csv".to_string(),
            video_path: "pushup_session.avi".to_string(),
            fourcc: "XVID".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipConfig {
    pub duration_secs: f64,
    pub calibration_secs: f64,
    pub min_calibration_samples: usize,
    pub ema_alpha: f32,
    pub min_airtime_ms: f64,
    pub ankle_asymmetry_max: f32,
    pub lift_fraction_of_lower_limb: f32,
    pub min_lift_abs: f32,
    /// Landing threshold as a fraction of the lift threshold.
    pub land_ratio: f32,
    pub min_lower_limb: f32,
    pub min_visibility: f32,
    pub mirror: bool,
    pub output_dir: String,
    pub fourcc: String,
    pub write_jump_log: bool,
}

impl Default for SkipConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60.0,
            calibration_secs: 2.0,
            min_calibration_samples: 10,
            ema_alpha: 0.25,
            min_airtime_ms: 120.0,
            ankle_asymmetry_max: 0.035,
            lift_fraction_of_lower_limb: 0.12,
            min_lift_abs: 0.02,
            land_ratio: 0.5,
            min_lower_limb: 1e-3,
            min_visibility: 0.0,
            mirror: true,
            output_dir: "skipping_sessions".to_string(),
            fourcc: "mp4v".to_string(),
            write_jump_log: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "rep_counter=info,ort=warn".to_string(),
        }
    }
}
