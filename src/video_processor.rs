// src/video_processor.rs

use crate::landmarks::LandmarkFrame;
use crate::overlay;
use crate::pipeline::{CapturedFrame, FrameSink, FrameSource, Hud, SinkControl};
use crate::types::{CaptureConfig, DisplayConfig};
use anyhow::{bail, Context, Result};
use opencv::{
    core::{self, Mat},
    highgui,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTrait, VideoCaptureTraitConst, VideoWriter},
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureInput {
    Camera(i32),
    File(PathBuf),
}

impl CaptureInput {
    pub fn from_config(config: &CaptureConfig) -> Self {
        match &config.input_path {
            Some(path) => CaptureInput::File(PathBuf::from(path)),
            None => CaptureInput::Camera(config.device_id),
        }
    }
}

pub struct VideoReader {
    cap: VideoCapture,
    pub fps: f64,
    pub width: i32,
    pub height: i32,
    pub total_frames: i32,
    current_frame: u64,
    from_file: bool,
    mirror: bool,
    started_at: Instant,
}

impl VideoReader {
    pub fn open(input: &CaptureInput, config: &CaptureConfig, mirror: bool) -> Result<Self> {
        let cap = match input {
            CaptureInput::Camera(index) => {
                info!("Opening camera {}", index);
                VideoCapture::new(*index, videoio::CAP_ANY)
                    .with_context(|| format!("Failed to open camera {}", index))?
            }
            CaptureInput::File(path) => {
                info!("Opening video: {}", path.display());
                let path_str = path
                    .to_str()
                    .with_context(|| format!("Non UTF-8 video path {}", path.display()))?;
                VideoCapture::from_file(path_str, videoio::CAP_ANY)?
            }
        };

        if !cap.is_opened()? {
            match input {
                CaptureInput::Camera(index) => bail!("Could not open camera {}", index),
                CaptureInput::File(path) => bail!("Failed to open video file {}", path.display()),
            }
        }

        let native = |prop: i32| VideoCaptureTraitConst::get(&cap, prop).unwrap_or(0.0);
        let fps = positive_or(native(videoio::CAP_PROP_FPS), config.fallback_fps);
        let width = positive_or(
            native(videoio::CAP_PROP_FRAME_WIDTH),
            config.fallback_width as f64,
        ) as i32;
        let height = positive_or(
            native(videoio::CAP_PROP_FRAME_HEIGHT),
            config.fallback_height as f64,
        ) as i32;
        let total_frames = native(videoio::CAP_PROP_FRAME_COUNT).max(0.0) as i32;

        info!(
            "Video properties: {}x{} @ {:.1} FPS{}",
            width,
            height,
            fps,
            if total_frames > 0 {
                format!(", {} frames", total_frames)
            } else {
                String::new()
            }
        );

        Ok(Self {
            cap,
            fps,
            width,
            height,
            total_frames,
            current_frame: 0,
            from_file: matches!(input, CaptureInput::File(_)),
            mirror,
            started_at: Instant::now(),
        })
    }

    pub fn progress(&self) -> f32 {
        if self.total_frames == 0 {
            return 0.0;
        }
        (self.current_frame as f32 / self.total_frames as f32) * 100.0
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

impl FrameSource for VideoReader {
    type Frame = Mat;

    fn next_frame(&mut self) -> Result<Option<CapturedFrame<Mat>>> {
        let mut mat = Mat::default();
        if !VideoCaptureTrait::read(&mut self.cap, &mut mat)? || mat.empty() {
            return Ok(None);
        }

        // Recordings are timed by frame index so replays are deterministic
        let timestamp_ms = if self.from_file {
            self.current_frame as f64 * 1000.0 / self.fps
        } else {
            self.started_at.elapsed().as_secs_f64() * 1000.0
        };
        self.current_frame += 1;

        let image = if self.mirror {
            let mut flipped = Mat::default();
            core::flip(&mat, &mut flipped, 1)?;
            flipped
        } else {
            mat
        };

        Ok(Some(CapturedFrame {
            image,
            index: self.current_frame,
            timestamp_ms,
        }))
    }
}

impl Drop for VideoReader {
    fn drop(&mut self) {
        if let Err(e) = self.cap.release() {
            warn!("Failed to release capture: {}", e);
        }
    }
}

/// Annotates, records and optionally displays every presented frame.
pub struct VideoOutput {
    writer: VideoWriter,
    path: PathBuf,
    window: Option<String>,
    display: DisplayConfig,
}

impl VideoOutput {
    pub fn create(
        path: &Path,
        fourcc: &str,
        width: i32,
        height: i32,
        fps: f64,
        display: &DisplayConfig,
        window_title: &str,
    ) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let code: Vec<char> = fourcc.chars().collect();
        if code.len() != 4 {
            bail!("FOURCC must be 4 characters, got '{}'", fourcc);
        }
        let fourcc = VideoWriter::fourcc(code[0], code[1], code[2], code[3])?;

        let path_str = path
            .to_str()
            .with_context(|| format!("Non UTF-8 output path {}", path.display()))?;
        let writer = VideoWriter::new(path_str, fourcc, fps, core::Size::new(width, height), true)
            .with_context(|| format!("Failed to create video writer {}", path.display()))?;
        if !writer.is_opened()? {
            bail!("Video writer could not open {}", path.display());
        }
        info!("Output video: {}", path.display());

        let window = if display.enabled {
            highgui::named_window(window_title, highgui::WINDOW_AUTOSIZE)?;
            Some(window_title.to_string())
        } else {
            None
        };

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            window,
            display: display.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSink<Mat> for VideoOutput {
    fn present(
        &mut self,
        frame: &mut Mat,
        hud: &Hud,
        landmarks: Option<&LandmarkFrame>,
    ) -> Result<SinkControl> {
        if let (true, Some(landmarks)) = (self.display.draw_skeleton, landmarks) {
            overlay::draw_skeleton(frame, landmarks)?;
        }
        overlay::draw_hud(frame, hud)?;

        self.writer.write(&*frame)?;

        if let Some(window) = &self.window {
            highgui::imshow(window, &*frame)?;
            let key = highgui::wait_key(self.display.wait_key_ms.max(1))?;
            if key >= 0 && (key & 0xFF) == self.display.quit_key as i32 {
                return Ok(SinkControl::Quit);
            }
        }

        Ok(SinkControl::Continue)
    }
}

impl Drop for VideoOutput {
    fn drop(&mut self) {
        if let Err(e) = self.writer.release() {
            warn!("Failed to finalize {}: {}", self.path.display(), e);
        }
        if self.window.is_some() {
            if let Err(e) = highgui::destroy_all_windows() {
                warn!("Failed to close display window: {}", e);
            }
        }
    }
}
