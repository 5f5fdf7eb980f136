//! Configuration management for the gesture engine

use crate::{
    constants::{
        DEFAULT_CALIBRATION_FRAMES, DEFAULT_COOLDOWN_TIME, DEFAULT_HAND_COOLDOWN, DEFAULT_HOLD_MIN_TIME,
        DEFAULT_IPC_HOST, DEFAULT_NOD_MAX_TIME, DEFAULT_PITCH_THRESHOLD, DEFAULT_RETURN_THRESHOLD,
        DEFAULT_SCROLL_COOLDOWN, DEFAULT_SMOOTHING_WINDOW, DEFAULT_SWIPE_MAX_TIME, DEFAULT_SWIPE_THRESHOLD,
        DEFAULT_YAW_THRESHOLD,
    },
    filters::FILTER_NAMES,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    /// Gesture detection parameters
    pub detection: DetectionConfig,

    /// Consumer channel configuration
    pub ipc: IpcConfig,
}

/// Gesture detection parameters
///
/// Angles are in degrees, times in seconds, swipe distances in normalized
/// frame units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Vertical deviation that counts as an up/down gesture
    pub pitch_threshold: f64,

    /// Horizontal deviation that counts as a left/right gesture
    pub yaw_threshold: f64,

    /// A gesture returning to neutral within this time is a nod
    pub nod_max_time: f64,

    /// A gesture sustained this long is a hold
    pub hold_min_time: f64,

    /// Both axes within this deviation count as neutral
    pub return_threshold: f64,

    /// Minimum time between head gesture triggers
    pub cooldown_time: f64,

    /// Repeat interval of an up/down hold
    pub scroll_cooldown: f64,

    /// Minimum time between hand gestures
    pub hand_cooldown: f64,

    /// Leftward palm travel that counts as a swipe
    pub swipe_threshold: f64,

    /// Time window for the swipe travel
    pub swipe_max_time: f64,

    /// Smoothing window length in frames
    pub smoothing_window: usize,

    /// Frames averaged into the neutral baseline
    pub calibration_frames: usize,

    /// Smoothing filter type
    pub smoothing_filter: String,
}

/// Consumer channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Consumer host
    pub host: String,

    /// Consumer port; events go to stdout when unset
    pub port: Option<u16>,

    /// Send calibration status messages alongside gestures
    pub send_status: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            pitch_threshold: DEFAULT_PITCH_THRESHOLD,
            yaw_threshold: DEFAULT_YAW_THRESHOLD,
            nod_max_time: DEFAULT_NOD_MAX_TIME,
            hold_min_time: DEFAULT_HOLD_MIN_TIME,
            return_threshold: DEFAULT_RETURN_THRESHOLD,
            cooldown_time: DEFAULT_COOLDOWN_TIME,
            scroll_cooldown: DEFAULT_SCROLL_COOLDOWN,
            hand_cooldown: DEFAULT_HAND_COOLDOWN,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            swipe_max_time: DEFAULT_SWIPE_MAX_TIME,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            calibration_frames: DEFAULT_CALIBRATION_FRAMES,
            smoothing_filter: "moving_average".to_string(),
        }
    }
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_IPC_HOST.to_string(),
            port: None,
            send_status: true,
        }
    }
}

/// On-disk layout: detection keys may sit under `detection:` or at the top level
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    detection: Option<DetectionConfig>,
    #[serde(default)]
    ipc: Option<IpcConfig>,
    #[serde(flatten)]
    top_level: DetectionConfig,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            detection: raw.detection.unwrap_or(raw.top_level),
            ipc: raw.ipc.unwrap_or_default(),
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawConfig::deserialize(deserializer).map(Self::from)
    }
}

impl Config {
    /// Load configuration from a YAML file, or JSON when the extension is `.json`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Parse configuration from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;

        let positive = [
            ("pitch_threshold", d.pitch_threshold),
            ("yaw_threshold", d.yaw_threshold),
            ("return_threshold", d.return_threshold),
            ("swipe_threshold", d.swipe_threshold),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::ConfigError(format!("{name} must be greater than 0, got {value}")));
            }
        }

        let non_negative = [
            ("nod_max_time", d.nod_max_time),
            ("hold_min_time", d.hold_min_time),
            ("cooldown_time", d.cooldown_time),
            ("scroll_cooldown", d.scroll_cooldown),
            ("hand_cooldown", d.hand_cooldown),
            ("swipe_max_time", d.swipe_max_time),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::ConfigError(format!("{name} must not be negative, got {value}")));
            }
        }

        if d.smoothing_window == 0 {
            return Err(Error::ConfigError(
                "Smoothing window size must be greater than 0".to_string(),
            ));
        }
        if d.calibration_frames == 0 {
            return Err(Error::ConfigError(
                "Calibration frames must be greater than 0".to_string(),
            ));
        }
        if !FILTER_NAMES.contains(&d.smoothing_filter.to_lowercase().as_str()) {
            return Err(Error::ConfigError(format!(
                "Unknown smoothing filter '{}', expected one of {:?}",
                d.smoothing_filter, FILTER_NAMES
            )));
        }

        if self.ipc.host.trim().is_empty() {
            return Err(Error::ConfigError("IPC host must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gesture Engine Configuration

# Gesture detection
detection:
  pitch_threshold: 12       # degrees down/up that count as a vertical gesture
  yaw_threshold: 20         # degrees left/right that count as a horizontal gesture
  nod_max_time: 1.0         # return to neutral within this many seconds = nod
  hold_min_time: 1.0        # stay deflected this many seconds = hold
  return_threshold: 8       # degrees from neutral that count as "back to neutral"
  cooldown_time: 1.0        # seconds between head gesture triggers
  scroll_cooldown: 0.1      # repeat interval of an up/down hold
  hand_cooldown: 1.0        # seconds between hand gestures
  swipe_threshold: 0.15     # leftward palm travel, normalized frame width
  swipe_max_time: 0.5       # seconds allowed for the swipe travel
  smoothing_window: 5       # frames in the smoothing window
  calibration_frames: 30    # frames averaged into the neutral pose
  smoothing_filter: "moving_average"   # or "median"

# Consumer channel
ipc:
  host: "127.0.0.1"
  # port: 50000             # events go to stdout when unset
  send_status: true
"#;
