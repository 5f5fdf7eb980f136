//! Constants used throughout the engine

/// Face-mesh index of the nose tip
pub const FACE_NOSE_TIP: usize = 1;
/// Face-mesh index of the nose bridge (between the eyes)
pub const FACE_NOSE_BRIDGE: usize = 168;
/// Face-mesh index of the chin
pub const FACE_CHIN: usize = 152;
/// Face-mesh index of the left eye outer corner
pub const FACE_LEFT_EYE: usize = 33;
/// Face-mesh index of the right eye outer corner
pub const FACE_RIGHT_EYE: usize = 263;
/// Face-mesh index of the forehead
pub const FACE_FOREHEAD: usize = 10;

/// Minimum number of face-mesh points needed to read every key point
pub const MIN_FACE_LANDMARKS: usize = FACE_RIGHT_EYE + 1;

/// Number of points in a hand landmark set
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Hand landmark indices
pub const HAND_THUMB_TIP: usize = 4;
pub const HAND_INDEX_MCP: usize = 5;
pub const HAND_INDEX_TIP: usize = 8;
pub const HAND_MIDDLE_MCP: usize = 9;
pub const HAND_MIDDLE_TIP: usize = 12;
pub const HAND_RING_MCP: usize = 13;
pub const HAND_RING_TIP: usize = 16;
pub const HAND_PINKY_MCP: usize = 17;
pub const HAND_PINKY_TIP: usize = 20;

/// (tip, mcp) pairs for the four non-thumb fingers
pub const FINGER_TIP_MCP_PAIRS: [(usize, usize); 4] = [
    (HAND_INDEX_TIP, HAND_INDEX_MCP),
    (HAND_MIDDLE_TIP, HAND_MIDDLE_MCP),
    (HAND_RING_TIP, HAND_RING_MCP),
    (HAND_PINKY_TIP, HAND_PINKY_MCP),
];

/// Guards the vertical ratio against a zero eye-to-chin distance
pub const VERTICAL_RATIO_EPSILON: f64 = 0.001;

/// Yaw is doubled to widen the usable range of the eye-relative angle
pub const YAW_GAIN: f64 = 2.0;

/// Pitch blend: weight of the nose-vector angle
pub const PITCH_NOSE_ANGLE_WEIGHT: f64 = 0.7;
/// Pitch blend: weight of the vertical-ratio term
pub const PITCH_RATIO_WEIGHT: f64 = 0.3;
/// Vertical ratio of a level head
pub const PITCH_RATIO_BASELINE: f64 = 0.3;
/// Scale from vertical ratio to degrees
pub const PITCH_RATIO_SCALE: f64 = 100.0;

/// Horizontal axis wins when |yaw| exceeds |pitch| by this factor
pub const YAW_DOMINANCE_FACTOR: f64 = 1.2;
/// Vertical axis wins when |pitch| exceeds |yaw| by this factor
pub const PITCH_DOMINANCE_FACTOR: f64 = 0.6;

/// Thumb counts as curled inside this fraction of the index-MCP distance
pub const THUMB_CURL_RATIO: f64 = 0.8;
/// Curled fingers required for a fist
pub const FIST_MIN_CURLED: usize = 4;
/// Extended fingers required for an open palm
pub const PALM_MIN_EXTENDED: usize = 3;

/// Default detection parameters
pub const DEFAULT_PITCH_THRESHOLD: f64 = 12.0;
pub const DEFAULT_YAW_THRESHOLD: f64 = 20.0;
pub const DEFAULT_NOD_MAX_TIME: f64 = 1.0;
pub const DEFAULT_HOLD_MIN_TIME: f64 = 1.0;
pub const DEFAULT_RETURN_THRESHOLD: f64 = 8.0;
pub const DEFAULT_COOLDOWN_TIME: f64 = 1.0;
pub const DEFAULT_SCROLL_COOLDOWN: f64 = 0.1;
pub const DEFAULT_HAND_COOLDOWN: f64 = 1.0;
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 0.15;
pub const DEFAULT_SWIPE_MAX_TIME: f64 = 0.5;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;
pub const DEFAULT_CALIBRATION_FRAMES: usize = 30;

/// Default consumer host
pub const DEFAULT_IPC_HOST: &str = "127.0.0.1";

/// Longest inbound line kept in the receive buffer
pub const MAX_LINE_LENGTH: usize = 65_536;

/// Size of a single non-blocking read
pub const READ_CHUNK_SIZE: usize = 1024;

/// Connect timeout for the lazy reconnect, in milliseconds
pub const CONNECT_TIMEOUT_MS: u64 = 500;

/// Minimum spacing between lazy reconnect attempts, in milliseconds
pub const RECONNECT_INTERVAL_MS: u64 = 1000;
