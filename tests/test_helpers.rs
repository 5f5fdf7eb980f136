//! Helper functions and utilities for tests
#![allow(dead_code)]

use gesture_engine::{
    config::DetectionConfig,
    constants::{FACE_CHIN, FACE_FOREHEAD, FACE_LEFT_EYE, FACE_NOSE_BRIDGE, FACE_NOSE_TIP, FACE_RIGHT_EYE},
    engine::GestureEngine,
    landmarks::{Frame, LandmarkPoint},
    protocol::GestureEvent,
};

/// Points in a full face mesh
pub const FACE_MESH_SIZE: usize = 478;

/// Nose offset giving a yaw of about 33 degrees
pub const TURN_DX: f64 = 0.06;

/// Nose drop giving a pitch change of well over 12 degrees
pub const TILT_DY: f64 = 0.08;

/// Synthetic face mesh with the nose tip moved by (`dx`, `dy`)
///
/// Eyes sit at y=0.4, the chin at y=0.7 and the resting nose tip at
/// (0.5, 0.5), slightly toward the camera.
pub fn face_mesh(dx: f64, dy: f64) -> Vec<LandmarkPoint> {
    let mut mesh = vec![LandmarkPoint::new(0.5, 0.5, 0.0); FACE_MESH_SIZE];
    mesh[FACE_LEFT_EYE] = LandmarkPoint::new(0.4, 0.4, 0.0);
    mesh[FACE_RIGHT_EYE] = LandmarkPoint::new(0.6, 0.4, 0.0);
    mesh[FACE_NOSE_BRIDGE] = LandmarkPoint::new(0.5, 0.4, 0.0);
    mesh[FACE_NOSE_TIP] = LandmarkPoint::new(0.5 + dx, 0.5 + dy, -0.05);
    mesh[FACE_CHIN] = LandmarkPoint::new(0.5, 0.7, 0.0);
    mesh[FACE_FOREHEAD] = LandmarkPoint::new(0.5, 0.2, 0.0);
    mesh
}

/// Upright hand with knuckles on y=0.5, shifted by `offset_x`
fn hand(offset_x: f64, tip_y: f64, thumb_x: f64) -> Vec<LandmarkPoint> {
    let mut points = vec![LandmarkPoint::new(0.5 + offset_x, 0.8, 0.0); 21];
    for (mcp, x) in [(5, 0.45), (9, 0.50), (13, 0.55), (17, 0.60)] {
        points[mcp] = LandmarkPoint::new(x + offset_x, 0.5, 0.0);
        points[mcp + 3] = LandmarkPoint::new(x + offset_x, tip_y, 0.0);
    }
    points[4] = LandmarkPoint::new(thumb_x + offset_x, 0.55, 0.0);
    points
}

/// Closed fist
pub fn fist_hand() -> Vec<LandmarkPoint> {
    hand(0.0, 0.6, 0.52)
}

/// Open palm whose middle knuckle sits at `palm_x`
pub fn palm_hand(palm_x: f64) -> Vec<LandmarkPoint> {
    hand(palm_x - 0.5, 0.3, 0.35)
}

/// Detection config without smoothing lag
pub fn fast_config(calibration_frames: usize) -> DetectionConfig {
    DetectionConfig {
        calibration_frames,
        smoothing_window: 1,
        ..DetectionConfig::default()
    }
}

/// Engine calibrated on a centered face at t=0
pub fn calibrated_engine() -> GestureEngine {
    let mut engine = GestureEngine::new(&fast_config(1)).unwrap();
    engine.process_frame(&Frame::new(0.0).with_face(face_mesh(0.0, 0.0)));
    assert!(engine.is_calibrated());
    engine
}

/// Feed face frames `(t, dx, dy)` and collect every event name
pub fn run_face(engine: &mut GestureEngine, frames: &[(f64, f64, f64)]) -> Vec<(f64, String)> {
    frames
        .iter()
        .flat_map(|&(t, dx, dy)| {
            engine
                .process_frame(&Frame::new(t).with_face(face_mesh(dx, dy)))
                .events
                .into_iter()
                .map(move |event: GestureEvent| (t, event.name()))
                .collect::<Vec<_>>()
        })
        .collect()
}
