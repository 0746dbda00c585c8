// src/session/pushup.rs
//
// Push-up workout: waits until the whole working side of the body is in
// view, then counts reps for a fixed window measured in whole seconds.

use super::summary::PushupSummary;
use crate::analysis::signal::{extract_pushup, pushup_required_joints};
use crate::detection::{PushupCounter, PushupThresholds, RepEvent};
use crate::landmarks::LandmarkFrame;
use crate::pipeline::hud::{self, Hud};
use crate::pipeline::{SessionPhase, Workout};
use crate::types::PushupConfig;
use chrono::{DateTime, Local};
use tracing::info;

pub struct PushupSession {
    config: PushupConfig,
    counter: PushupCounter,
    started_ms: Option<f64>,
    finished: bool,
    events: Vec<RepEvent>,
}

impl PushupSession {
    pub fn new(config: PushupConfig) -> Self {
        Self {
            counter: PushupCounter::new(PushupThresholds::from(&config)),
            config,
            started_ms: None,
            finished: false,
            events: Vec::new(),
        }
    }

    /// Whole seconds since the session started.
    fn elapsed_secs(&self, timestamp_ms: f64) -> f64 {
        self.started_ms
            .map(|start| ((timestamp_ms - start) / 1000.0).floor().max(0.0))
            .unwrap_or(0.0)
    }

    pub fn remaining_secs(&self, timestamp_ms: f64) -> u64 {
        (self.config.duration_secs - self.elapsed_secs(timestamp_ms)).max(0.0) as u64
    }

    pub fn counter(&self) -> &PushupCounter {
        &self.counter
    }

    pub fn events(&self) -> &[RepEvent] {
        &self.events
    }

    pub fn summary(&self, at: DateTime<Local>) -> PushupSummary {
        PushupSummary::new(at, self.counter.correct(), self.counter.bad())
    }
}

impl Workout for PushupSession {
    fn update(&mut self, landmarks: Option<&LandmarkFrame>, timestamp_ms: f64) -> SessionPhase {
        if self.finished {
            return SessionPhase::Finished;
        }

        if self.started_ms.is_none() {
            let in_frame = landmarks.map_or(false, |frame| {
                frame.all_visible(
                    &pushup_required_joints(self.config.side),
                    self.config.min_visibility,
                )
            });
            if in_frame {
                info!(
                    "🏁 Person in frame, {}s push-up session started",
                    self.config.duration_secs
                );
                self.started_ms = Some(timestamp_ms);
            }
            return self.phase();
        }

        let signal = landmarks.and_then(|frame| {
            extract_pushup(frame, self.config.side, self.config.min_visibility)
        });
        if let Some(signal) = signal {
            if let Some(event) = self.counter.update(&signal, timestamp_ms) {
                self.events.push(event);
            }
        }

        if self.elapsed_secs(timestamp_ms) >= self.config.duration_secs {
            info!(
                "⏱ Session finished: {} correct, {} bad",
                self.counter.correct(),
                self.counter.bad()
            );
            self.finished = true;
        }
        self.phase()
    }

    fn hud(&self, timestamp_ms: f64) -> Hud {
        if self.started_ms.is_none() {
            return Hud::new().text(
                "Stand in frame to start workout",
                (50, 200),
                0.8,
                hud::RED,
                2,
            );
        }

        let mut overlay = Hud::new()
            .panel(0, 0, 400, 140, hud::PANEL_BLUE)
            .text("Correct", (15, 40), 0.8, hud::GREEN, 2)
            .text(self.counter.correct().to_string(), (150, 45), 1.5, hud::WHITE, 2)
            .text("Bad", (15, 90), 0.8, hud::RED, 2)
            .text(self.counter.bad().to_string(), (150, 95), 1.5, hud::WHITE, 2)
            .text(
                format!("Time: {}s", self.remaining_secs(timestamp_ms)),
                (250, 80),
                1.0,
                hud::CYAN,
                2,
            );

        match self.counter.posture_good() {
            Some(true) => {
                overlay = overlay.text("Posture OK", (15, 130), 0.6, hud::GREEN, 2);
            }
            Some(false) => {
                overlay = overlay.text("Straighten body", (15, 130), 0.6, hud::RED, 2);
            }
            None => {}
        }
        overlay
    }

    fn phase(&self) -> SessionPhase {
        if self.finished {
            SessionPhase::Finished
        } else if self.started_ms.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::WaitingForPerson
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, PoseLandmark, NUM_LANDMARKS};
    use crate::pipeline::testing::{RecordingSink, ScriptedOracle, SimulatedSource};
    use crate::pipeline::{run, EndReason};
    use crate::session::summary::{finish_pushup, tests::temp_dir};

    /// Left-side pose with the given elbow angle; the body is either a
    /// straight line through the hip or bent at about 117°.
    fn pushup_pose(elbow_deg: f32, straight_body: bool, visibility: f32) -> LandmarkFrame {
        let mut points = vec![Landmark::new(0.5, 0.9, visibility); NUM_LANDMARKS];
        let (shoulder, elbow) = ((0.3, 0.4), (0.3, 0.5));
        let theta = elbow_deg.to_radians();
        let wrist = (elbow.0 + 0.1 * theta.sin(), elbow.1 - 0.1 * theta.cos());
        let knee = if straight_body { (0.7, 0.4) } else { (0.6, 0.6) };

        points[PoseLandmark::LeftShoulder.index()] =
            Landmark::new(shoulder.0, shoulder.1, visibility);
        points[PoseLandmark::LeftElbow.index()] = Landmark::new(elbow.0, elbow.1, visibility);
        points[PoseLandmark::LeftWrist.index()] = Landmark::new(wrist.0, wrist.1, visibility);
        points[PoseLandmark::LeftHip.index()] = Landmark::new(0.5, 0.4, visibility);
        points[PoseLandmark::LeftKnee.index()] = Landmark::new(knee.0, knee.1, visibility);
        points[PoseLandmark::LeftAnkle.index()] = Landmark::new(0.9, 0.4, visibility);
        LandmarkFrame::new(points)
    }

    #[test]
    fn test_pose_geometry() {
        let pose = pushup_pose(60.0, false, 1.0);
        let signal = extract_pushup(&pose, crate::types::BodySide::Left, 0.7).unwrap();
        assert!((signal.elbow_angle - 60.0).abs() < 0.1);
        assert!(signal.torso_angle < 150.0);
    }

    #[test]
    fn test_waits_for_full_visibility() {
        let mut session = PushupSession::new(PushupConfig::default());
        assert_eq!(
            session.update(Some(&pushup_pose(170.0, true, 0.7)), 0.0),
            SessionPhase::WaitingForPerson
        );
        assert_eq!(session.update(None, 33.0), SessionPhase::WaitingForPerson);
        assert!(session.hud(33.0).contains_text("Stand in frame to start workout"));

        assert_eq!(
            session.update(Some(&pushup_pose(170.0, true, 0.9)), 66.0),
            SessionPhase::Active
        );
        assert!(session.hud(66.0).contains_text("Time: 60s"));
    }

    #[test]
    fn test_start_frame_does_not_count() {
        let mut session = PushupSession::new(PushupConfig::default());
        // Starts on an "up" frame; without a later up frame the down
        // frame cannot complete a rep
        session.update(Some(&pushup_pose(170.0, true, 0.9)), 0.0);
        session.update(Some(&pushup_pose(60.0, true, 0.9)), 33.0);
        assert_eq!(session.counter().total(), 0);

        session.update(Some(&pushup_pose(170.0, true, 0.9)), 66.0);
        session.update(Some(&pushup_pose(60.0, true, 0.9)), 99.0);
        assert_eq!(session.counter().correct(), 1);
    }

    #[test]
    fn test_pose_loss_keeps_counters() {
        let mut session = PushupSession::new(PushupConfig::default());
        session.update(Some(&pushup_pose(170.0, true, 0.9)), 0.0);
        session.update(Some(&pushup_pose(170.0, true, 0.9)), 100.0);
        session.update(Some(&pushup_pose(60.0, false, 0.9)), 200.0);
        for i in 0..30 {
            session.update(None, 300.0 + i as f64 * 33.0);
        }
        assert_eq!(session.counter().bad(), 1);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert!(session.hud(1500.0).contains_text("Straighten body"));
    }

    #[test]
    fn test_timer_uses_whole_seconds() {
        let mut session = PushupSession::new(PushupConfig {
            duration_secs: 3.0,
            ..Default::default()
        });
        session.update(Some(&pushup_pose(170.0, true, 0.9)), 1000.0);
        assert_eq!(session.remaining_secs(1999.0), 3);
        assert_eq!(session.remaining_secs(2000.0), 2);
        assert_eq!(session.update(None, 3999.0), SessionPhase::Active);
        assert_eq!(session.update(None, 4000.0), SessionPhase::Finished);
        assert_eq!(session.remaining_secs(9000.0), 0);
    }

    #[test]
    fn test_sixty_second_session_writes_one_row() {
        // 30 fps; one rep per second, every third rep with a bent body
        let mut source = SimulatedSource::new(30.0, 5000, |index, _| {
            let rep = (index - 1) / 30;
            let elbow = if (index - 1) % 30 < 15 { 170.0 } else { 60.0 };
            Some(pushup_pose(elbow, rep % 3 != 2, 0.95))
        });
        let mut sink = RecordingSink::default();
        let mut session = PushupSession::new(PushupConfig::default());

        let mut oracle = ScriptedOracle::default();
        let report = run(&mut source, &mut oracle, &mut sink, &mut session).unwrap();

        assert_eq!(report.end_reason, EndReason::Completed);
        assert!(report.last_timestamp_ms >= 60_000.0);
        assert!(report.last_timestamp_ms < 60_000.0 + 1000.0 / 30.0);
        assert_eq!(report.metrics.total_frames, 1801);
        assert_eq!(sink.presented, 1800);
        assert_eq!(session.counter().correct(), 40);
        assert_eq!(session.counter().bad(), 20);
        assert_eq!(session.events().len(), 60);

        let path = temp_dir().join("pushup_log.csv");
        assert!(finish_pushup(&report, &session, &path, Local::now()).unwrap());
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Date-Time,Correct Pushups,Bad Pushups");
        assert!(lines[1].ends_with(",40,20"), "got {}", lines[1]);
    }
}
