use super::{ring_window::RingWindow, AngleFilter};
use crate::pose_estimation::AngleSample;

/// Median filter over the same trailing window as the moving average
pub struct MedianFilter {
    pitch_window: RingWindow,
    yaw_window: RingWindow,
}

impl MedianFilter {
    pub fn new(window_size: usize) -> Self {
        Self {
            pitch_window: RingWindow::new(window_size),
            yaw_window: RingWindow::new(window_size),
        }
    }
}

impl AngleFilter for MedianFilter {
    fn apply(&mut self, sample: AngleSample) -> AngleSample {
        self.pitch_window.push(sample.pitch);
        self.yaw_window.push(sample.yaw);

        AngleSample {
            pitch: self.pitch_window.median().unwrap_or(sample.pitch),
            yaw: self.yaw_window.median().unwrap_or(sample.yaw),
        }
    }

    fn reset(&mut self) {
        self.pitch_window.clear();
        self.yaw_window.clear();
    }

    fn len(&self) -> usize {
        self.pitch_window.len()
    }

    fn name(&self) -> &str {
        "MedianFilter"
    }
}
