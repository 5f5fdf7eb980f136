//! Neutral head pose calibration.
//!
//! The first `calibration_frames` smoothed samples after start (or after a
//! recalibration) are averaged into the neutral baseline. Gesture detection
//! stays gated until the baseline exists.

use crate::pose_estimation::AngleSample;
use log::info;

/// Calibration phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationPhase {
    /// Still collecting samples
    Calibrating {
        /// Samples collected so far
        collected: usize,
        /// Samples needed
        required: usize,
    },
    /// Baseline established
    Ready {
        /// Neutral pitch and yaw
        neutral: AngleSample,
    },
}

/// Neutral baseline calibrator
#[derive(Debug, Clone)]
pub struct Calibrator {
    required: usize,
    collected: usize,
    pitch_sum: f64,
    yaw_sum: f64,
    neutral: Option<AngleSample>,
}

impl Calibrator {
    /// Create a calibrator needing `calibration_frames` samples
    ///
    /// # Panics
    ///
    /// Panics if `calibration_frames` is zero
    #[must_use]
    pub fn new(calibration_frames: usize) -> Self {
        assert!(calibration_frames > 0, "Calibration frames must be greater than 0");
        Self {
            required: calibration_frames,
            collected: 0,
            pitch_sum: 0.0,
            yaw_sum: 0.0,
            neutral: None,
        }
    }

    /// Feed one smoothed sample
    ///
    /// Returns the neutral baseline once calibrated. Samples pushed after the
    /// calibrator is ready are ignored.
    pub fn push(&mut self, sample: AngleSample) -> Option<AngleSample> {
        if self.neutral.is_some() {
            return self.neutral;
        }

        self.pitch_sum += sample.pitch;
        self.yaw_sum += sample.yaw;
        self.collected += 1;

        if self.collected >= self.required {
            let n = self.collected as f64;
            let neutral = AngleSample::new(self.pitch_sum / n, self.yaw_sum / n);
            self.pitch_sum = 0.0;
            self.yaw_sum = 0.0;
            self.neutral = Some(neutral);
            info!(
                "Calibration complete! Neutral: pitch={:.1}, yaw={:.1}",
                neutral.pitch, neutral.yaw
            );
        }

        self.neutral
    }

    /// Drop the baseline and start collecting again
    pub fn recalibrate(&mut self) {
        self.collected = 0;
        self.pitch_sum = 0.0;
        self.yaw_sum = 0.0;
        self.neutral = None;
    }

    /// Neutral baseline, if calibrated
    #[must_use]
    pub const fn neutral(&self) -> Option<AngleSample> {
        self.neutral
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.neutral.is_some()
    }

    /// Samples collected in the current calibration pass
    #[must_use]
    pub const fn collected(&self) -> usize {
        self.collected
    }

    /// Fraction of the calibration pass completed, in `[0, 1]`
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.is_ready() {
            1.0
        } else {
            self.collected as f64 / self.required as f64
        }
    }

    #[must_use]
    pub const fn phase(&self) -> CalibrationPhase {
        match self.neutral {
            Some(neutral) => CalibrationPhase::Ready { neutral },
            None => CalibrationPhase::Calibrating {
                collected: self.collected,
                required: self.required,
            },
        }
    }
}
