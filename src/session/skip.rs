// src/session/skip.rs
//
// Jump-rope workout: first person detection starts a standing calibration,
// the frame that completes calibration opens the timed test window, and
// every frame inside the window feeds the jump detector.

use super::summary::SkipSummary;
use crate::analysis::calibration::Calibrator;
use crate::analysis::signal::extract_skip;
use crate::detection::{JumpDetector, JumpRecord};
use crate::landmarks::LandmarkFrame;
use crate::pipeline::hud::{self, Hud};
use crate::pipeline::{SessionPhase, Workout};
use crate::types::SkipConfig;
use tracing::{debug, info, warn};

pub struct SkipSession {
    config: SkipConfig,
    phase: SessionPhase,
    calibrator: Option<Calibrator>,
    detector: Option<JumpDetector>,
    test_end_ms: Option<f64>,
    pose_visible: bool,
    /// Set on the frame that moved the session out of waiting.
    just_detected: bool,
}

impl SkipSession {
    pub fn new(config: SkipConfig) -> Self {
        Self {
            config,
            phase: SessionPhase::WaitingForPerson,
            calibrator: None,
            detector: None,
            test_end_ms: None,
            pose_visible: false,
            just_detected: false,
        }
    }

    pub fn jump_count(&self) -> u32 {
        self.detector.as_ref().map_or(0, |d| d.jump_count())
    }

    pub fn jumps(&self) -> &[JumpRecord] {
        match &self.detector {
            Some(detector) => detector.jumps(),
            None => &[],
        }
    }

    pub fn remaining_secs(&self, timestamp_ms: f64) -> f64 {
        self.test_end_ms
            .map_or(self.config.duration_secs, |end| ((end - timestamp_ms) / 1000.0).max(0.0))
    }

    pub fn summary(&self) -> SkipSummary {
        SkipSummary {
            total_jumps: self.jump_count(),
        }
    }
}

impl Workout for SkipSession {
    fn update(&mut self, landmarks: Option<&LandmarkFrame>, timestamp_ms: f64) -> SessionPhase {
        let signal = landmarks.and_then(|frame| extract_skip(frame, self.config.min_visibility));
        if self.pose_visible && signal.is_none() && self.phase != SessionPhase::Finished {
            warn!("Pose lost at {:.2}s", timestamp_ms / 1000.0);
        }
        self.pose_visible = signal.is_some();
        self.just_detected = false;

        match self.phase {
            SessionPhase::WaitingForPerson => {
                if signal.is_some() {
                    info!("🏁 Person detected, starting calibration");
                    self.calibrator = Some(Calibrator::new(timestamp_ms, &self.config));
                    self.phase = SessionPhase::Calibrating;
                    self.just_detected = true;
                }
            }
            SessionPhase::Calibrating => {
                let baseline = match (signal, self.calibrator.as_mut()) {
                    (Some(signal), Some(calibrator)) => {
                        let baseline = calibrator.push(&signal, timestamp_ms, &self.config);
                        debug!("Calibration sample {}", calibrator.sample_count());
                        baseline
                    }
                    _ => None,
                };
                if let Some(baseline) = baseline {
                    self.detector = Some(JumpDetector::new(baseline, &self.config, timestamp_ms));
                    self.test_end_ms = Some(timestamp_ms + self.config.duration_secs * 1000.0);
                    self.calibrator = None;
                    self.phase = SessionPhase::Active;
                    info!("⏱ {}s test window started", self.config.duration_secs);
                }
            }
            SessionPhase::Active => {
                if let (Some(signal), Some(detector)) = (signal, self.detector.as_mut()) {
                    detector.update(&signal, timestamp_ms);
                    debug!(
                        "lift={:.4} airborne={}",
                        detector.last_lift(),
                        detector.stage().is_airborne()
                    );
                }
                if self.remaining_secs(timestamp_ms) <= 0.0 {
                    info!("⏱ Test finished with {} jumps", self.jump_count());
                    self.phase = SessionPhase::Finished;
                }
            }
            SessionPhase::Finished => {}
        }
        self.phase
    }

    fn hud(&self, timestamp_ms: f64) -> Hud {
        let overlay = Hud::new();
        if self.just_detected {
            return overlay.text(
                "Person detected - Starting calibration",
                (20, 40),
                0.9,
                hud::GREEN,
                2,
            );
        }
        if !self.pose_visible {
            return match self.phase {
                SessionPhase::WaitingForPerson => {
                    overlay.text("Waiting for person...", (20, 40), 1.0, hud::RED, 2)
                }
                _ => overlay.text("Pose lost!", (20, 40), 1.0, hud::ORANGE, 2),
            };
        }
        match self.phase {
            SessionPhase::Calibrating => {
                overlay.text("Calibrating... stand still", (20, 40), 0.9, hud::YELLOW, 2)
            }
            SessionPhase::Active | SessionPhase::Finished => overlay
                .text(
                    format!("Time Left: {}s", self.remaining_secs(timestamp_ms) as u64),
                    (20, 40),
                    1.0,
                    hud::CYAN,
                    2,
                )
                .text(format!("Jumps: {}", self.jump_count()), (20, 80), 1.2, hud::RED, 3),
            SessionPhase::WaitingForPerson => overlay,
        }
    }

    fn phase(&self) -> SessionPhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, PoseLandmark, NUM_LANDMARKS};
    use crate::pipeline::testing::{RecordingSink, ScriptedOracle, SimulatedSource};
    use crate::pipeline::{run, EndReason};
    use crate::session::summary::{finish_skip, tests::temp_dir, SkipOutputPaths};

    const FRAME_MS: f64 = 1000.0 / 30.0;

    fn standing_pose(ankle_y: f32) -> LandmarkFrame {
        let mut points = vec![Landmark::new(0.5, 0.3, 0.9); NUM_LANDMARKS];
        points[PoseLandmark::LeftAnkle.index()].y = ankle_y;
        points[PoseLandmark::RightAnkle.index()].y = ankle_y;
        points[PoseLandmark::LeftHip.index()].y = 0.5;
        points[PoseLandmark::RightHip.index()].y = 0.5;
        LandmarkFrame::new(points)
    }

    fn config(duration_secs: f64) -> SkipConfig {
        SkipConfig {
            duration_secs,
            ..Default::default()
        }
    }

    #[test]
    fn test_phases_and_hud_messages() {
        let mut session = SkipSession::new(config(5.0));
        assert_eq!(session.update(None, 0.0), SessionPhase::WaitingForPerson);
        assert!(session.hud(0.0).contains_text("Waiting for person..."));

        let pose = standing_pose(0.9);
        assert_eq!(session.update(Some(&pose), 100.0), SessionPhase::Calibrating);
        assert!(session.hud(100.0).contains_text("Starting calibration"));

        session.update(Some(&pose), 133.0);
        assert!(session.hud(133.0).contains_text("Calibrating... stand still"));
        session.update(None, 166.0);
        assert!(session.hud(166.0).contains_text("Pose lost!"));
        assert_eq!(session.phase(), SessionPhase::Calibrating);
    }

    #[test]
    fn test_calibration_needs_window_then_activates() {
        let mut session = SkipSession::new(config(5.0));
        let pose = standing_pose(0.9);
        session.update(Some(&pose), 0.0);

        let mut t = 0.0;
        while session.phase() == SessionPhase::Calibrating {
            t += FRAME_MS;
            session.update(Some(&pose), t);
            assert!(t < 3000.0, "calibration never completed");
        }
        assert_eq!(session.phase(), SessionPhase::Active);
        assert!(t >= 2000.0);
        assert!(session.hud(t).contains_text("Time Left: 5s"));
        assert!(session.hud(t).contains_text("Jumps: 0"));
    }

    #[test]
    fn test_window_ends_without_pose() {
        let mut session = SkipSession::new(config(1.0));
        let pose = standing_pose(0.9);
        session.update(Some(&pose), 0.0);
        for i in 1..=12 {
            session.update(Some(&pose), i as f64 * 200.0);
        }
        assert_eq!(session.phase(), SessionPhase::Active);

        // Person walks off; the clock still runs out
        assert_eq!(session.update(None, 2900.0), SessionPhase::Active);
        assert_eq!(session.update(None, 3000.0), SessionPhase::Finished);
        assert_eq!(session.summary().total_jumps, 0);
    }

    #[test]
    fn test_timed_session_counts_and_persists_jumps() {
        // Calibration frames 1..=61 standing; test window opens at 2.0s and
        // lasts 10s. Inside it, cycles of 10 standing + 10 airborne frames.
        let mut source = SimulatedSource::new(30.0, 10_000, |index, _| {
            if index <= 61 {
                return Some(standing_pose(0.9));
            }
            let phase = (index - 62) % 20;
            Some(standing_pose(if phase < 10 { 0.9 } else { 0.78 }))
        });
        let mut sink = RecordingSink::default();
        let mut session = SkipSession::new(config(10.0));

        let mut oracle = ScriptedOracle::default();
        let report = run(&mut source, &mut oracle, &mut sink, &mut session).unwrap();

        assert_eq!(report.end_reason, EndReason::Completed);
        assert_eq!(report.metrics.total_frames, 361);
        assert_eq!(session.jump_count(), 14);
        let jumps = session.jumps();
        assert!(jumps.windows(2).all(|w| w[0].offset_s < w[1].offset_s));
        assert!(jumps.iter().all(|j| j.airtime_ms >= 120.0));
        assert!(jumps.iter().all(|j| j.offset_s > 0.0 && j.offset_s <= 10.0));

        let paths = SkipOutputPaths::new(&temp_dir(), "scenario");
        finish_skip(&report, &session, &paths, true).unwrap();
        assert_eq!(std::fs::read_to_string(&paths.csv).unwrap(), "Total_Jumps\n14\n");
        assert_eq!(std::fs::read_to_string(&paths.jumps).unwrap().lines().count(), 14);
    }

    #[test]
    fn test_quit_mid_test_keeps_count() {
        let mut source = SimulatedSource::new(30.0, 10_000, |index, _| {
            let phase = index.saturating_sub(62) % 20;
            Some(standing_pose(if index > 61 && phase >= 10 { 0.78 } else { 0.9 }))
        });
        let mut sink = RecordingSink {
            quit_after: Some(150),
            ..Default::default()
        };
        let mut session = SkipSession::new(config(60.0));

        let mut oracle = ScriptedOracle::default();
        let report = run(&mut source, &mut oracle, &mut sink, &mut session).unwrap();

        assert_eq!(report.end_reason, EndReason::QuitRequested);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert!(session.jump_count() >= 3);
        assert_eq!(session.summary().total_jumps, session.jump_count());

        let paths = SkipOutputPaths::new(&temp_dir(), "quit");
        finish_skip(&report, &session, &paths, false).unwrap();
        let csv = std::fs::read_to_string(&paths.csv).unwrap();
        assert_eq!(csv, format!("Total_Jumps\n{}\n", session.jump_count()));
    }
}
