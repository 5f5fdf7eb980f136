//! Landmark types consumed by the detectors.
//!
//! A face or hand landmark set is an ordered slice of normalized 3-D points
//! with stable semantic indices. These types pick out the handful of points
//! each detector reads, validating that the set is long enough up front so
//! the detectors themselves stay infallible.

use crate::{
    constants::{
        FACE_CHIN, FACE_FOREHEAD, FACE_LEFT_EYE, FACE_NOSE_BRIDGE, FACE_NOSE_TIP, FACE_RIGHT_EYE,
        MIN_FACE_LANDMARKS, NUM_HAND_LANDMARKS,
    },
    Error, Result,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A single landmark, normalized to the frame dimensions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl LandmarkPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Point as a column vector
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// The face points used by head pose estimation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePoints {
    pub nose_tip: Vector3<f64>,
    pub nose_bridge: Vector3<f64>,
    pub chin: Vector3<f64>,
    pub left_eye: Vector3<f64>,
    pub right_eye: Vector3<f64>,
    pub forehead: Vector3<f64>,
}

impl FacePoints {
    /// Pick the key points out of a full face mesh
    ///
    /// # Errors
    ///
    /// Returns `Error::Landmarks` if the mesh is too short to contain every key point
    pub fn from_mesh(mesh: &[LandmarkPoint]) -> Result<Self> {
        if mesh.len() < MIN_FACE_LANDMARKS {
            return Err(Error::Landmarks(format!(
                "Face mesh has {} points, need at least {}",
                mesh.len(),
                MIN_FACE_LANDMARKS
            )));
        }

        let at = |idx: usize| mesh[idx].to_vector();
        Ok(Self {
            nose_tip: at(FACE_NOSE_TIP),
            nose_bridge: at(FACE_NOSE_BRIDGE),
            chin: at(FACE_CHIN),
            left_eye: at(FACE_LEFT_EYE),
            right_eye: at(FACE_RIGHT_EYE),
            forehead: at(FACE_FOREHEAD),
        })
    }
}

/// A validated 21-point hand landmark set, borrowed from the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks<'a> {
    points: &'a [LandmarkPoint],
}

impl<'a> HandLandmarks<'a> {
    /// Wrap a hand landmark set
    ///
    /// # Errors
    ///
    /// Returns `Error::Landmarks` if fewer than 21 points are supplied
    pub fn new(points: &'a [LandmarkPoint]) -> Result<Self> {
        if points.len() < NUM_HAND_LANDMARKS {
            return Err(Error::Landmarks(format!(
                "Hand has {} points, need {}",
                points.len(),
                NUM_HAND_LANDMARKS
            )));
        }
        Ok(Self { points })
    }

    /// Landmark at a hand index; always in range after validation
    #[must_use]
    pub fn point(&self, idx: usize) -> LandmarkPoint {
        self.points[idx]
    }

    #[must_use]
    pub const fn points(&self) -> &'a [LandmarkPoint] {
        self.points
    }
}

/// Everything the landmark extractor produced for one captured frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Capture time in seconds on a monotonic clock
    #[serde(rename = "t")]
    pub timestamp: f64,
    /// Face mesh, if a face was detected
    #[serde(default)]
    pub face: Option<Vec<LandmarkPoint>>,
    /// One landmark set per detected hand
    #[serde(default)]
    pub hands: Vec<Vec<LandmarkPoint>>,
}

impl Frame {
    #[must_use]
    pub const fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            face: None,
            hands: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_face(mut self, face: Vec<LandmarkPoint>) -> Self {
        self.face = Some(face);
        self
    }

    #[must_use]
    pub fn with_hand(mut self, hand: Vec<LandmarkPoint>) -> Self {
        self.hands.push(hand);
        self
    }
}
