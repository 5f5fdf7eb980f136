//! Head gesture state machine.
//!
//! Distinguishes a quick *nod* (deflect past a threshold, then return to
//! neutral within `nod_max_time`) from a sustained *hold* (stay deflected for
//! `hold_min_time`). Up/down holds re-fire every `scroll_cooldown` so the
//! consumer can scroll continuously.
//!
//! All mutable state lives in [`HeadGestureState`]; [`transition`] is the
//! whole transition table and can be driven directly in tests.

use crate::{
    config::DetectionConfig,
    constants::{PITCH_DOMINANCE_FACTOR, YAW_DOMINANCE_FACTOR},
    pose_estimation::AngleSample,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a head gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Up and down holds repeat for scrolling
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a head gesture was completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    Nod,
    Hold,
}

impl GestureMode {
    pub const ALL: [Self; 2] = [Self::Nod, Self::Hold];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nod => "nod",
            Self::Hold => "hold",
        }
    }
}

impl fmt::Display for GestureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected head gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadGesture {
    pub direction: Direction,
    pub mode: GestureMode,
}

impl HeadGesture {
    #[must_use]
    pub const fn new(direction: Direction, mode: GestureMode) -> Self {
        Self { direction, mode }
    }

    /// Wire name, e.g. `hold_up`
    #[must_use]
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HeadGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.mode, self.direction)
    }
}

/// Thresholds and timings used by the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadGestureParams {
    pub pitch_threshold: f64,
    pub yaw_threshold: f64,
    pub nod_max_time: f64,
    pub hold_min_time: f64,
    pub return_threshold: f64,
    pub cooldown_time: f64,
    pub scroll_cooldown: f64,
}

impl From<&DetectionConfig> for HeadGestureParams {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            pitch_threshold: config.pitch_threshold,
            yaw_threshold: config.yaw_threshold,
            nod_max_time: config.nod_max_time,
            hold_min_time: config.hold_min_time,
            return_threshold: config.return_threshold,
            cooldown_time: config.cooldown_time,
            scroll_cooldown: config.scroll_cooldown,
        }
    }
}

impl Default for HeadGestureParams {
    fn default() -> Self {
        Self::from(&DetectionConfig::default())
    }
}

/// Mutable head gesture state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadGestureState {
    /// Direction currently being tracked
    pub current_direction: Option<Direction>,
    /// When the current direction was first seen
    pub start_time: Option<f64>,
    /// Whether the current gesture already fired
    pub triggered: bool,
    /// Mode of the last fired gesture
    pub mode: Option<GestureMode>,
    /// Largest deviation seen for the current direction
    pub max_deviation: f64,
    /// Time of the last nod or hold trigger; `None` before the first one
    pub last_gesture_time: Option<f64>,
    /// Time of the last hold repeat
    pub last_scroll_time: f64,
}

impl HeadGestureState {
    /// Back to idle, forgetting cooldowns
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Drop the tracked direction without touching cooldown bookkeeping
    fn clear_tracking(&mut self) {
        self.current_direction = None;
        self.start_time = None;
        self.triggered = false;
        self.mode = None;
    }
}

/// Pick the dominant axis and test it against its threshold
///
/// Returns the direction and its absolute deviation. The yaw/pitch dominance
/// factors are deliberately asymmetric and favor a left/right reading.
#[must_use]
pub fn classify_direction(relative: AngleSample, params: &HeadGestureParams) -> Option<(Direction, f64)> {
    let AngleSample { pitch, yaw } = relative;

    if yaw.abs() > pitch.abs() * YAW_DOMINANCE_FACTOR {
        if yaw > params.yaw_threshold {
            return Some((Direction::Right, yaw.abs()));
        }
        if yaw < -params.yaw_threshold {
            return Some((Direction::Left, yaw.abs()));
        }
    } else if pitch.abs() > yaw.abs() * PITCH_DOMINANCE_FACTOR {
        if pitch > params.pitch_threshold {
            return Some((Direction::Down, pitch.abs()));
        }
        if pitch < -params.pitch_threshold {
            return Some((Direction::Up, pitch.abs()));
        }
    }

    None
}

/// Advance the state machine by one sample
///
/// `relative` is the smoothed sample minus the neutral baseline; `now` is in
/// seconds. Returns at most one gesture.
pub fn transition(
    state: &mut HeadGestureState,
    params: &HeadGestureParams,
    relative: AngleSample,
    now: f64,
) -> Option<HeadGesture> {
    // A hold in progress must keep scrolling through the cooldown
    if state.mode != Some(GestureMode::Hold) {
        if let Some(last) = state.last_gesture_time {
            if now - last < params.cooldown_time {
                return None;
            }
        }
    }

    let detected = classify_direction(relative, params);
    let near_neutral =
        relative.pitch.abs() < params.return_threshold && relative.yaw.abs() < params.return_threshold;

    if let Some((direction, deviation)) = detected {
        if state.current_direction != Some(direction) {
            state.current_direction = Some(direction);
            state.start_time = Some(now);
            state.triggered = false;
            state.max_deviation = deviation;
            state.mode = None;
            debug!("Tracking head gesture {direction} (deviation {deviation:.1})");
            return None;
        }

        state.max_deviation = state.max_deviation.max(deviation);
        let elapsed = now - state.start_time.unwrap_or(now);

        if elapsed >= params.hold_min_time && !state.triggered {
            state.triggered = true;
            state.mode = Some(GestureMode::Hold);
            state.last_gesture_time = Some(now);
            // Allow the first scroll tick on the very next frame
            state.last_scroll_time = now - params.scroll_cooldown;
            return Some(HeadGesture::new(direction, GestureMode::Hold));
        }

        if state.mode == Some(GestureMode::Hold)
            && direction.is_vertical()
            && now - state.last_scroll_time >= params.scroll_cooldown
        {
            state.last_scroll_time = now;
            return Some(HeadGesture::new(direction, GestureMode::Hold));
        }
    } else if near_neutral {
        if let Some(direction) = state.current_direction {
            let elapsed = now - state.start_time.unwrap_or(now);

            if elapsed < params.nod_max_time && !state.triggered {
                state.triggered = true;
                state.mode = Some(GestureMode::Nod);
                state.last_gesture_time = Some(now);
                state.current_direction = None;
                state.start_time = None;
                return Some(HeadGesture::new(direction, GestureMode::Nod));
            }

            // Too slow for a nod, or a hold coming back to rest
            state.clear_tracking();
        }
    }

    None
}

/// Head gesture detector owning its state and parameters
#[derive(Debug, Clone)]
pub struct HeadGestureStateMachine {
    params: HeadGestureParams,
    state: HeadGestureState,
}

impl HeadGestureStateMachine {
    #[must_use]
    pub fn new(params: HeadGestureParams) -> Self {
        Self {
            params,
            state: HeadGestureState::default(),
        }
    }

    /// Feed a calibrated, smoothed sample
    pub fn update(&mut self, sample: AngleSample, neutral: AngleSample, now: f64) -> Option<HeadGesture> {
        transition(&mut self.state, &self.params, sample.relative_to(neutral), now)
    }

    /// Return to idle; used together with recalibration
    pub fn reset(&mut self) {
        self.state.reset();
    }

    #[must_use]
    pub const fn state(&self) -> &HeadGestureState {
        &self.state
    }

    #[must_use]
    pub const fn params(&self) -> &HeadGestureParams {
        &self.params
    }
}
