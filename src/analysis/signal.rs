// src/analysis/signal.rs
//
// Turns raw landmarks into the scalar features the rep state machines
// consume. Missing or low-confidence joints yield `None`, never a panic:
// the frame simply carries no signal.

use crate::landmarks::{LandmarkFrame, PoseLandmark};
use crate::types::BodySide;

/// Angle at `b` formed by the segments b→a and b→c, in degrees [0, 180].
pub fn calculate_angle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let radians = (c.1 - b.1).atan2(c.0 - b.0) - (a.1 - b.1).atan2(a.0 - b.0);
    let angle = radians.to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Joints that must all be visible before a push-up session starts.
pub fn pushup_required_joints(side: BodySide) -> [PoseLandmark; 6] {
    [
        PoseLandmark::shoulder(side),
        PoseLandmark::elbow(side),
        PoseLandmark::wrist(side),
        PoseLandmark::hip(side),
        PoseLandmark::knee(side),
        PoseLandmark::ankle(side),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushupSignal {
    /// shoulder-elbow-wrist
    pub elbow_angle: f32,
    /// shoulder-hip-knee, a proxy for a straight body line
    pub torso_angle: f32,
}

pub fn extract_pushup(
    frame: &LandmarkFrame,
    side: BodySide,
    min_visibility: f32,
) -> Option<PushupSignal> {
    let shoulder = frame.visible(PoseLandmark::shoulder(side), min_visibility)?;
    let elbow = frame.visible(PoseLandmark::elbow(side), min_visibility)?;
    let wrist = frame.visible(PoseLandmark::wrist(side), min_visibility)?;
    let hip = frame.visible(PoseLandmark::hip(side), min_visibility)?;
    let knee = frame.visible(PoseLandmark::knee(side), min_visibility)?;

    let elbow_angle = calculate_angle(shoulder.xy(), elbow.xy(), wrist.xy());
    let torso_angle = calculate_angle(shoulder.xy(), hip.xy(), knee.xy());

    if !elbow_angle.is_finite() || !torso_angle.is_finite() {
        return None;
    }

    Some(PushupSignal {
        elbow_angle,
        torso_angle,
    })
}

/// Vertical positions used by the jump detector. Larger y is lower in the
/// image, so a jump shows up as the ankles' y decreasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipSignal {
    pub left_ankle_y: f32,
    pub right_ankle_y: f32,
    pub ankle_y: f32,
    pub hip_y: f32,
}

impl SkipSignal {
    pub fn ankle_asymmetry(&self) -> f32 {
        (self.left_ankle_y - self.right_ankle_y).abs()
    }
}

pub fn extract_skip(frame: &LandmarkFrame, min_visibility: f32) -> Option<SkipSignal> {
    let visible_y = |joint: PoseLandmark| {
        frame
            .get(joint)
            .filter(|lm| min_visibility <= 0.0 || lm.visibility > min_visibility)
            .map(|lm| lm.y)
            .filter(|y| y.is_finite())
    };

    let left_ankle_y = visible_y(PoseLandmark::LeftAnkle)?;
    let right_ankle_y = visible_y(PoseLandmark::RightAnkle)?;
    let left_hip_y = visible_y(PoseLandmark::LeftHip)?;
    let right_hip_y = visible_y(PoseLandmark::RightHip)?;

    Some(SkipSignal {
        left_ankle_y,
        right_ankle_y,
        ankle_y: (left_ankle_y + right_ankle_y) / 2.0,
        hip_y: (left_hip_y + right_hip_y) / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, NUM_LANDMARKS};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_right_angle() {
        let angle = calculate_angle((0.0, 1.0), (0.0, 0.0), (1.0, 0.0));
        assert!(approx(angle, 90.0), "got {}", angle);
    }

    #[test]
    fn test_straight_line_is_180() {
        let angle = calculate_angle((0.0, 0.0), (0.5, 0.5), (1.0, 1.0));
        assert!(approx(angle, 180.0), "got {}", angle);
    }

    #[test]
    fn test_reflex_angle_is_folded() {
        // Raw atan2 difference here is 270°, folded to 90°
        let angle = calculate_angle((0.0, -1.0), (0.0, 0.0), (-1.0, 0.0));
        assert!(approx(angle, 90.0), "got {}", angle);
    }

    #[test]
    fn test_angle_is_symmetric_in_endpoints() {
        let a = (0.2, 0.3);
        let b = (0.5, 0.5);
        let c = (0.9, 0.4);
        assert!(approx(calculate_angle(a, b, c), calculate_angle(c, b, a)));
    }

    fn pushup_frame(visibility: f32) -> LandmarkFrame {
        let mut points = vec![Landmark::new(0.0, 0.0, visibility); NUM_LANDMARKS];
        // Arm bent at the elbow (90°), body straight through the hip (180°)
        points[PoseLandmark::LeftShoulder.index()] = Landmark::new(0.3, 0.4, visibility);
        points[PoseLandmark::LeftElbow.index()] = Landmark::new(0.3, 0.5, visibility);
        points[PoseLandmark::LeftWrist.index()] = Landmark::new(0.4, 0.5, visibility);
        points[PoseLandmark::LeftHip.index()] = Landmark::new(0.5, 0.4, visibility);
        points[PoseLandmark::LeftKnee.index()] = Landmark::new(0.7, 0.4, visibility);
        LandmarkFrame::new(points)
    }

    #[test]
    fn test_extract_pushup_angles() {
        let signal = extract_pushup(&pushup_frame(0.9), BodySide::Left, 0.7).unwrap();
        assert!(approx(signal.elbow_angle, 90.0));
        assert!(approx(signal.torso_angle, 180.0));
    }

    #[test]
    fn test_extract_pushup_low_visibility_is_absent() {
        assert!(extract_pushup(&pushup_frame(0.6), BodySide::Left, 0.7).is_none());
    }

    #[test]
    fn test_extract_pushup_missing_joints_is_absent() {
        let frame = LandmarkFrame::new(vec![Landmark::new(0.5, 0.5, 1.0); 12]);
        assert!(extract_pushup(&frame, BodySide::Left, 0.7).is_none());
        assert!(extract_pushup(&LandmarkFrame::default(), BodySide::Left, 0.7).is_none());
    }

    #[test]
    fn test_extract_skip_averages_sides() {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.9); NUM_LANDMARKS];
        points[PoseLandmark::LeftAnkle.index()].y = 0.90;
        points[PoseLandmark::RightAnkle.index()].y = 0.92;
        points[PoseLandmark::LeftHip.index()].y = 0.50;
        points[PoseLandmark::RightHip.index()].y = 0.54;
        let signal = extract_skip(&LandmarkFrame::new(points), 0.0).unwrap();
        assert!(approx(signal.ankle_y, 0.91));
        assert!(approx(signal.hip_y, 0.52));
        assert!(approx(signal.ankle_asymmetry(), 0.02));
    }

    #[test]
    fn test_extract_skip_missing_ankles_is_absent() {
        let frame = LandmarkFrame::new(vec![Landmark::new(0.5, 0.5, 1.0); 25]);
        assert!(extract_skip(&frame, 0.0).is_none());
    }
}
