// src/landmarks.rs
//
// Body joints as produced by a 33-point MediaPipe/BlazePose model.
// Coordinates are normalized to the frame: x, y in [0, 1], origin top-left.

use crate::types::BodySide;

pub const NUM_LANDMARKS: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn shoulder(side: BodySide) -> Self {
        match side {
            BodySide::Left => Self::LeftShoulder,
            BodySide::Right => Self::RightShoulder,
        }
    }

    pub fn elbow(side: BodySide) -> Self {
        match side {
            BodySide::Left => Self::LeftElbow,
            BodySide::Right => Self::RightElbow,
        }
    }

    pub fn wrist(side: BodySide) -> Self {
        match side {
            BodySide::Left => Self::LeftWrist,
            BodySide::Right => Self::RightWrist,
        }
    }

    pub fn hip(side: BodySide) -> Self {
        match side {
            BodySide::Left => Self::LeftHip,
            BodySide::Right => Self::RightHip,
        }
    }

    pub fn knee(side: BodySide) -> Self {
        match side {
            BodySide::Left => Self::LeftKnee,
            BodySide::Right => Self::RightKnee,
        }
    }

    pub fn ankle(side: BodySide) -> Self {
        match side {
            BodySide::Left => Self::LeftAnkle,
            BodySide::Right => Self::RightAnkle,
        }
    }
}

/// Skeleton edges used for the overlay.
pub const POSE_CONNECTIONS: [(PoseLandmark, PoseLandmark); 20] = [
    (PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder),
    (PoseLandmark::LeftShoulder, PoseLandmark::LeftElbow),
    (PoseLandmark::LeftElbow, PoseLandmark::LeftWrist),
    (PoseLandmark::RightShoulder, PoseLandmark::RightElbow),
    (PoseLandmark::RightElbow, PoseLandmark::RightWrist),
    (PoseLandmark::LeftShoulder, PoseLandmark::LeftHip),
    (PoseLandmark::RightShoulder, PoseLandmark::RightHip),
    (PoseLandmark::LeftHip, PoseLandmark::RightHip),
    (PoseLandmark::LeftHip, PoseLandmark::LeftKnee),
    (PoseLandmark::LeftKnee, PoseLandmark::LeftAnkle),
    (PoseLandmark::RightHip, PoseLandmark::RightKnee),
    (PoseLandmark::RightKnee, PoseLandmark::RightAnkle),
    (PoseLandmark::LeftAnkle, PoseLandmark::LeftHeel),
    (PoseLandmark::LeftHeel, PoseLandmark::LeftFootIndex),
    (PoseLandmark::LeftAnkle, PoseLandmark::LeftFootIndex),
    (PoseLandmark::RightAnkle, PoseLandmark::RightHeel),
    (PoseLandmark::RightHeel, PoseLandmark::RightFootIndex),
    (PoseLandmark::RightAnkle, PoseLandmark::RightFootIndex),
    (PoseLandmark::Nose, PoseLandmark::LeftEye),
    (PoseLandmark::Nose, PoseLandmark::RightEye),
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    pub fn xy(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// One frame's worth of detected joints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkFrame {
    points: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn get(&self, joint: PoseLandmark) -> Option<&Landmark> {
        self.points.get(joint.index())
    }

    /// The joint exists and its visibility is strictly above `min_visibility`.
    pub fn visible(&self, joint: PoseLandmark, min_visibility: f32) -> Option<&Landmark> {
        self.get(joint).filter(|lm| lm.visibility > min_visibility)
    }

    pub fn all_visible(&self, joints: &[PoseLandmark], min_visibility: f32) -> bool {
        joints
            .iter()
            .all(|&j| self.visible(j, min_visibility).is_some())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A full frame with every joint at the same point and visibility.
    pub(crate) fn uniform_frame(visibility: f32) -> LandmarkFrame {
        LandmarkFrame::new(vec![Landmark::new(0.5, 0.5, visibility); NUM_LANDMARKS])
    }

    #[test]
    fn test_visibility_is_strict() {
        let frame = uniform_frame(0.7);
        assert!(frame.visible(PoseLandmark::LeftElbow, 0.7).is_none());
        assert!(frame.visible(PoseLandmark::LeftElbow, 0.69).is_some());
    }

    #[test]
    fn test_truncated_frame_is_missing_joints() {
        let frame = LandmarkFrame::new(vec![Landmark::new(0.1, 0.1, 1.0); 20]);
        assert!(frame.get(PoseLandmark::LeftShoulder).is_some());
        assert!(frame.get(PoseLandmark::LeftHip).is_none());
        assert!(!frame.all_visible(&[PoseLandmark::LeftShoulder, PoseLandmark::LeftHip], 0.5));
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(PoseLandmark::elbow(BodySide::Left).index(), 13);
        assert_eq!(PoseLandmark::knee(BodySide::Right).index(), 26);
        assert_eq!(PoseLandmark::ankle(BodySide::Right).index(), 28);
    }
}
