use super::{ring_window::RingWindow, AngleFilter};
use crate::pose_estimation::AngleSample;

/// Moving average over the last `window_size` samples, per axis
pub struct MovingAverageFilter {
    pitch_window: RingWindow,
    yaw_window: RingWindow,
}

impl MovingAverageFilter {
    pub fn new(window_size: usize) -> Self {
        Self {
            pitch_window: RingWindow::new(window_size),
            yaw_window: RingWindow::new(window_size),
        }
    }
}

impl AngleFilter for MovingAverageFilter {
    fn apply(&mut self, sample: AngleSample) -> AngleSample {
        self.pitch_window.push(sample.pitch);
        self.yaw_window.push(sample.yaw);

        // Both windows hold at least the sample just pushed
        AngleSample {
            pitch: self.pitch_window.mean().unwrap_or(sample.pitch),
            yaw: self.yaw_window.mean().unwrap_or(sample.yaw),
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
        "MovingAverageFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let mut filter = MovingAverageFilter::new(3);

        let s1 = filter.apply(AngleSample::new(10.0, 20.0));
        assert_eq!(s1, AngleSample::new(10.0, 20.0));

        let s2 = filter.apply(AngleSample::new(20.0, 30.0));
        assert_eq!(s2, AngleSample::new(15.0, 25.0));

        let s3 = filter.apply(AngleSample::new(30.0, 40.0));
        assert_eq!(s3, AngleSample::new(20.0, 30.0));

        // Window is full, oldest value should be dropped
        let s4 = filter.apply(AngleSample::new(40.0, 50.0));
        assert_eq!(s4, AngleSample::new(30.0, 40.0));
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut filter = MovingAverageFilter::new(5);
        filter.apply(AngleSample::new(100.0, 100.0));
        filter.reset();
        assert_eq!(filter.len(), 0);
        assert_eq!(filter.apply(AngleSample::new(1.0, 2.0)), AngleSample::new(1.0, 2.0));
    }
}
