//! Head pose estimation from face-mesh geometry.

use crate::{
    constants::{
        PITCH_NOSE_ANGLE_WEIGHT, PITCH_RATIO_BASELINE, PITCH_RATIO_SCALE, PITCH_RATIO_WEIGHT,
        VERTICAL_RATIO_EPSILON, YAW_GAIN,
    },
    landmarks::FacePoints,
};

/// Head orientation in degrees
///
/// Positive pitch is the head tilted down; positive yaw is the nose moved
/// toward increasing image x.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleSample {
    pub pitch: f64,
    pub yaw: f64,
}

impl AngleSample {
    #[must_use]
    pub const fn new(pitch: f64, yaw: f64) -> Self {
        Self { pitch, yaw }
    }

    /// Component-wise difference, used to express a sample relative to neutral
    #[must_use]
    pub fn relative_to(self, neutral: Self) -> Self {
        Self {
            pitch: self.pitch - neutral.pitch,
            yaw: self.yaw - neutral.yaw,
        }
    }
}

/// Landmark-geometry head pose estimator
///
/// Yaw comes from the nose tip's horizontal offset against the eye line.
/// Pitch blends the nose vector's tilt with how far down the face the nose
/// tip sits between the eyes and the chin.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseEstimator;

impl PoseEstimator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Estimate pitch and yaw from the face key points
    #[must_use]
    pub fn estimate(&self, face: &FacePoints) -> AngleSample {
        let eye_center = (face.left_eye + face.right_eye) / 2.0;
        let eye_distance = (face.right_eye - face.left_eye).norm();

        let nose_offset = face.nose_tip.x - eye_center.x;
        let yaw = nose_offset.atan2(eye_distance).to_degrees() * YAW_GAIN;

        let nose_vector = face.nose_tip - face.nose_bridge;
        let nose_angle = nose_vector.y.atan2(-nose_vector.z).to_degrees();

        let vertical_ratio =
            (face.nose_tip.y - eye_center.y) / (face.chin.y - eye_center.y + VERTICAL_RATIO_EPSILON);

        let pitch = nose_angle * PITCH_NOSE_ANGLE_WEIGHT
            + (vertical_ratio - PITCH_RATIO_BASELINE) * PITCH_RATIO_SCALE * PITCH_RATIO_WEIGHT;

        AngleSample { pitch, yaw }
    }
}
