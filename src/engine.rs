//! Per-frame gesture recognition pipeline.
//!
//! [`GestureEngine`] owns one instance of every stage and runs a frame
//! through them in order:
//!
//! 1. face mesh → pitch/yaw ([`PoseEstimator`])
//! 2. smoothing ([`AngleFilter`])
//! 3. calibration, which gates head gesture detection
//! 4. head gesture state machine
//! 5. hand gesture classifier (not gated by calibration)

use crate::{
    calibration::{CalibrationPhase, Calibrator},
    config::DetectionConfig,
    filters::{create_filter, AngleFilter},
    hand_gesture::HandGestureClassifier,
    head_gesture::{HeadGestureParams, HeadGestureStateMachine},
    landmarks::{FacePoints, Frame},
    pose_estimation::{AngleSample, PoseEstimator},
    protocol::{Command, GestureEvent, StatusState},
    Error, Result,
};
use log::{debug, info, warn};

/// Calibration status of the engine
pub type EngineStatus = CalibrationPhase;

/// Result of processing one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// Gestures detected in this frame, head first
    pub events: Vec<GestureEvent>,
    /// Smoothed absolute pose, when a face was present
    pub pose: Option<AngleSample>,
    /// Set on the frame that completed calibration
    pub status_change: Option<StatusState>,
}

/// Gesture recognition engine
pub struct GestureEngine {
    pose_estimator: PoseEstimator,
    smoother: Box<dyn AngleFilter>,
    calibrator: Calibrator,
    head: HeadGestureStateMachine,
    hands: HandGestureClassifier,
}

impl GestureEngine {
    /// Build an engine from detection parameters
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for a zero window, zero calibration
    /// frames, or an unknown smoothing filter
    pub fn new(config: &DetectionConfig) -> Result<Self> {
        if config.calibration_frames == 0 {
            return Err(Error::ConfigError(
                "Calibration frames must be greater than 0".to_string(),
            ));
        }

        let smoother = create_filter(&config.smoothing_filter, config.smoothing_window)?;
        info!(
            "Gesture engine using {} smoothing over {} frames, calibrating on {} frames",
            smoother.name(),
            config.smoothing_window,
            config.calibration_frames
        );

        Ok(Self {
            pose_estimator: PoseEstimator::new(),
            smoother,
            calibrator: Calibrator::new(config.calibration_frames),
            head: HeadGestureStateMachine::new(HeadGestureParams::from(config)),
            hands: HandGestureClassifier::new(config),
        })
    }

    /// Run one frame through the pipeline
    ///
    /// A missing or unusable face skips the head path for this frame; the
    /// same goes for each hand.
    pub fn process_frame(&mut self, frame: &Frame) -> FrameOutcome {
        let now = frame.timestamp;
        let mut outcome = FrameOutcome::default();

        if let Some(mesh) = &frame.face {
            match FacePoints::from_mesh(mesh) {
                Ok(face) => self.process_face(&face, now, &mut outcome),
                Err(e) => debug!("Skipping face at t={now:.3}: {e}"),
            }
        }

        if let Some(gesture) = self.hands.process(&frame.hands, now) {
            debug!("Hand gesture {gesture} at t={now:.3}");
            outcome.events.push(gesture.into());
        }

        outcome
    }

    fn process_face(&mut self, face: &FacePoints, now: f64, outcome: &mut FrameOutcome) {
        let raw = self.pose_estimator.estimate(face);
        if !(raw.pitch.is_finite() && raw.yaw.is_finite()) {
            warn!("Dropping non-finite pose at t={now:.3}: {raw:?}");
            return;
        }

        let smoothed = self.smoother.apply(raw);
        outcome.pose = Some(smoothed);

        if let Some(neutral) = self.calibrator.neutral() {
            if let Some(gesture) = self.head.update(smoothed, neutral, now) {
                debug!("Head gesture {gesture} at t={now:.3}");
                outcome.events.push(gesture.into());
            }
        } else if self.calibrator.push(smoothed).is_some() {
            // The completing sample only establishes the baseline
            outcome.status_change = Some(StatusState::Ready);
        }
    }

    /// Start a new calibration pass
    ///
    /// The calibrator, smoothing window and head gesture state are reset
    /// together so no stale sample leaks into the new baseline.
    pub fn recalibrate(&mut self) {
        info!("Recalibrating neutral pose");
        self.calibrator.recalibrate();
        self.smoother.reset();
        self.head.reset();
    }

    /// Apply an inbound command, returning the status to report if any
    pub fn handle_command(&mut self, command: Command) -> Option<StatusState> {
        match command {
            Command::Recalibrate => {
                self.recalibrate();
                Some(StatusState::Calibrating)
            }
            Command::Unknown => {
                debug!("Ignoring unknown command");
                None
            }
        }
    }

    /// Current calibration phase
    #[must_use]
    pub const fn status(&self) -> EngineStatus {
        self.calibrator.phase()
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.calibrator.is_ready()
    }

    /// Calibration status as reported on the wire
    #[must_use]
    pub const fn status_state(&self) -> StatusState {
        if self.calibrator.is_ready() {
            StatusState::Ready
        } else {
            StatusState::Calibrating
        }
    }

    #[must_use]
    pub const fn head_state_machine(&self) -> &HeadGestureStateMachine {
        &self.head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::MIN_FACE_LANDMARKS,
        head_gesture::{Direction, GestureMode, HeadGesture},
        landmarks::LandmarkPoint,
    };

    fn config(calibration_frames: usize) -> DetectionConfig {
        DetectionConfig {
            calibration_frames,
            smoothing_window: 1,
            ..DetectionConfig::default()
        }
    }

    /// Symmetric face with the nose shifted by `dx`
    fn face(dx: f64) -> Vec<LandmarkPoint> {
        let mut mesh = vec![LandmarkPoint::new(0.5, 0.5, 0.0); MIN_FACE_LANDMARKS];
        mesh[33] = LandmarkPoint::new(0.4, 0.4, 0.0);
        mesh[263] = LandmarkPoint::new(0.6, 0.4, 0.0);
        mesh[168] = LandmarkPoint::new(0.5, 0.4, 0.0);
        mesh[1] = LandmarkPoint::new(0.5 + dx, 0.5, -0.05);
        mesh[152] = LandmarkPoint::new(0.5, 0.7, 0.0);
        mesh[10] = LandmarkPoint::new(0.5, 0.2, 0.0);
        mesh
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut bad = config(0);
        assert!(GestureEngine::new(&bad).is_err());
        bad = config(3);
        bad.smoothing_filter = "kalman".to_string();
        assert!(GestureEngine::new(&bad).is_err());
    }

    #[test]
    fn test_calibration_gates_head_gestures() {
        let mut engine = GestureEngine::new(&config(2)).unwrap();
        assert_eq!(engine.status_state(), StatusState::Calibrating);

        let outcome = engine.process_frame(&Frame::new(0.0).with_face(face(0.0)));
        assert!(outcome.pose.is_some());
        assert_eq!(outcome.status_change, None);

        let outcome = engine.process_frame(&Frame::new(0.125).with_face(face(0.0)));
        assert_eq!(outcome.status_change, Some(StatusState::Ready));
        assert!(engine.is_calibrated());
    }

    #[test]
    fn test_missing_face_does_not_advance_calibration() {
        let mut engine = GestureEngine::new(&config(1)).unwrap();
        let outcome = engine.process_frame(&Frame::new(0.0));
        assert_eq!(outcome, FrameOutcome::default());
        assert_eq!(
            engine.status(),
            CalibrationPhase::Calibrating { collected: 0, required: 1 }
        );

        // A truncated mesh is skipped the same way
        engine.process_frame(&Frame::new(0.1).with_face(vec![LandmarkPoint::default(); 10]));
        assert!(!engine.is_calibrated());
    }

    #[test]
    fn test_nod_after_calibration() {
        let mut engine = GestureEngine::new(&config(1)).unwrap();
        engine.process_frame(&Frame::new(0.0).with_face(face(0.0)));

        let mut events = Vec::new();
        for (t, dx) in [(0.125, 0.06), (0.25, 0.06), (0.5, 0.0)] {
            events.extend(engine.process_frame(&Frame::new(t).with_face(face(dx))).events);
        }
        assert_eq!(
            events,
            vec![GestureEvent::Head(HeadGesture::new(Direction::Right, GestureMode::Nod))]
        );
    }

    #[test]
    fn test_recalibrate_command() {
        let mut engine = GestureEngine::new(&config(1)).unwrap();
        engine.process_frame(&Frame::new(0.0).with_face(face(0.0)));
        engine.process_frame(&Frame::new(0.125).with_face(face(0.06)));
        assert!(engine.head_state_machine().state().current_direction.is_some());

        assert_eq!(engine.handle_command(Command::Recalibrate), Some(StatusState::Calibrating));
        assert!(!engine.is_calibrated());
        assert_eq!(engine.head_state_machine().state().current_direction, None);

        assert_eq!(engine.handle_command(Command::Unknown), None);
    }
}
