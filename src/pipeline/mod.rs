// src/pipeline/mod.rs
//
// The single-threaded capture loop:
//   read frame → detect landmarks → update session → render overlay → write/display
//
// Capture, detection and presentation are traits so the loop can be driven
// by a camera + ONNX model in production and by scripted frames in tests.

pub mod hud;
pub mod metrics;

pub use hud::Hud;
pub use metrics::{MetricsSummary, PipelineMetrics};

use crate::landmarks::LandmarkFrame;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CapturedFrame<F> {
    pub image: F,
    /// 1-based
    pub index: u64,
    pub timestamp_ms: f64,
}

pub trait FrameSource {
    type Frame;

    /// `Ok(None)` once the device or file has no more frames.
    fn next_frame(&mut self) -> Result<Option<CapturedFrame<Self::Frame>>>;
}

/// External body-landmark detector.
pub trait LandmarkOracle<F> {
    /// `Ok(None)` when no person is found in the frame.
    fn detect(&mut self, frame: &F) -> Result<Option<LandmarkFrame>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    Quit,
}

pub trait FrameSink<F> {
    fn present(
        &mut self,
        frame: &mut F,
        hud: &Hud,
        landmarks: Option<&LandmarkFrame>,
    ) -> Result<SinkControl>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    WaitingForPerson,
    Calibrating,
    Active,
    Finished,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::WaitingForPerson => "WAITING",
            SessionPhase::Calibrating => "CALIBRATING",
            SessionPhase::Active => "ACTIVE",
            SessionPhase::Finished => "FINISHED",
        }
    }
}

/// A timed exercise session fed one frame at a time.
pub trait Workout {
    fn update(&mut self, landmarks: Option<&LandmarkFrame>, timestamp_ms: f64) -> SessionPhase;

    fn hud(&self, timestamp_ms: f64) -> Hud;

    fn phase(&self) -> SessionPhase;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Completed,
    QuitRequested,
    SourceExhausted,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub end_reason: EndReason,
    pub metrics: MetricsSummary,
    pub last_timestamp_ms: f64,
}

pub fn run<S, O, K, W>(
    source: &mut S,
    oracle: &mut O,
    sink: &mut K,
    workout: &mut W,
) -> Result<RunReport>
where
    S: FrameSource,
    O: LandmarkOracle<S::Frame>,
    K: FrameSink<S::Frame>,
    W: Workout,
{
    let mut metrics = PipelineMetrics::new();
    let mut last_timestamp_ms = 0.0;
    let mut last_phase = workout.phase();

    let end_reason = loop {
        let Some(mut frame) = source.next_frame()? else {
            info!("Capture ended after {} frames", metrics.total_frames);
            break EndReason::SourceExhausted;
        };
        last_timestamp_ms = frame.timestamp_ms;

        let landmarks = match oracle.detect(&frame.image) {
            Ok(landmarks) => landmarks,
            Err(e) => {
                metrics.record_oracle_failure();
                debug!("Pose detection failed on frame {}: {}", frame.index, e);
                None
            }
        };
        metrics.record_frame(landmarks.is_some());

        let phase = workout.update(landmarks.as_ref(), frame.timestamp_ms);
        if phase != last_phase {
            info!(
                "Session {} → {} at {:.2}s (frame {})",
                last_phase.as_str(),
                phase.as_str(),
                frame.timestamp_ms / 1000.0,
                frame.index
            );
            last_phase = phase;
        }
        if phase == SessionPhase::Finished {
            break EndReason::Completed;
        }

        let hud = workout.hud(frame.timestamp_ms);
        if sink.present(&mut frame.image, &hud, landmarks.as_ref())? == SinkControl::Quit {
            info!("Quit requested at frame {}", frame.index);
            break EndReason::QuitRequested;
        }
    };

    Ok(RunReport {
        end_reason,
        metrics: metrics.summary(),
        last_timestamp_ms,
    })
}
