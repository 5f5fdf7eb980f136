//! Smoothing filters for head pose angles.
//!
//! Raw landmark-derived angles jitter from frame to frame. The engine runs
//! every sample through one of these filters before calibration and gesture
//! detection see it.

/// Fixed-capacity ring buffer shared by the windowed filters
pub mod ring_window;

/// Moving average filter, the default smoother
pub mod moving_average;

/// Median filter for single-frame outlier rejection
pub mod median;

use crate::{pose_estimation::AngleSample, Error, Result};

/// Trait for all angle smoothing filters
pub trait AngleFilter: Send + Sync {
    /// Push a raw sample and return the smoothed value
    fn apply(&mut self, sample: AngleSample) -> AngleSample;

    /// Forget all history
    fn reset(&mut self);

    /// Number of samples currently in the window
    fn len(&self) -> usize;

    /// Whether the window is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get filter name
    fn name(&self) -> &str;
}

/// Filter names accepted by [`create_filter`]
pub const FILTER_NAMES: [&str; 2] = ["moving_average", "median"];

/// Create a smoothing filter by type name and window size
///
/// # Errors
///
/// Returns `Error::ConfigError` for an unknown name or a zero window
pub fn create_filter(filter_type: &str, window_size: usize) -> Result<Box<dyn AngleFilter>> {
    if window_size == 0 {
        return Err(Error::ConfigError("Window size must be greater than 0".to_string()));
    }
    match filter_type.to_lowercase().as_str() {
        "moving_average" | "movingaverage" => Ok(Box::new(moving_average::MovingAverageFilter::new(window_size))),
        "median" => Ok(Box::new(median::MedianFilter::new(window_size))),
        _ => Err(Error::ConfigError(format!("Unknown filter type: {filter_type}"))),
    }
}
