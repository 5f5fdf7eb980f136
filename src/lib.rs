//! Gesture recognition engine for hands-free control.
//!
//! This library turns a stream of face and hand landmarks into debounced
//! gesture events and ships them to a consumer process as newline-delimited
//! JSON.
//!
//! The recognition pipeline consists of:
//! 1. Head pose estimation (pitch and yaw) from a handful of face mesh points
//! 2. Smoothing over a short trailing window
//! 3. Calibration of a neutral pose, which gates head gesture detection
//! 4. A head gesture state machine telling a quick nod from a sustained hold
//! 5. Hand gesture classification (fist, left swipe) with its own cooldown
//!
//! # Examples
//!
//! ## Processing frames
//!
//! ```no_run
//! use gesture_engine::{config::DetectionConfig, engine::GestureEngine, landmarks::Frame};
//!
//! # fn main() -> gesture_engine::Result<()> {
//! let mut engine = GestureEngine::new(&DetectionConfig::default())?;
//!
//! # let frames: Vec<Frame> = Vec::new();
//! for frame in &frames {
//!     for event in engine.process_frame(frame).events {
//!         println!("{} ({:?})", event.name(), event.action_type());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the loop against a consumer
//!
//! ```no_run
//! use gesture_engine::{
//!     app::GestureApp, config::Config, engine::GestureEngine, frame_source::JsonLinesSource,
//!     ipc::IpcClient,
//! };
//!
//! # fn main() -> gesture_engine::Result<()> {
//! let config = Config::from_file("config.yaml")?;
//! config.validate()?;
//!
//! let engine = GestureEngine::new(&config.detection)?;
//! let source = JsonLinesSource::open("-")?;
//! let channel = IpcClient::new(config.ipc.host.clone(), 50000);
//!
//! let mut app = GestureApp::new(engine, source, channel, config.ipc.send_status);
//! let summary = app.run()?;
//! println!("{} gestures in {} frames", summary.events, summary.frames);
//! # Ok(())
//! # }
//! ```

/// Landmark and frame types
pub mod landmarks;

/// Head pose estimation from face landmarks
pub mod pose_estimation;

/// Signal filtering algorithms for smoothing pose estimates
pub mod filters;

/// Neutral pose calibration
pub mod calibration;

/// Head gesture state machine
pub mod head_gesture;

/// Hand gesture classification
pub mod hand_gesture;

/// Per-frame recognition pipeline
pub mod engine;

/// Wire protocol messages and line framing
pub mod protocol;

/// Delivery channels and the consumer-side listener
pub mod ipc;

/// Landmark frame input
pub mod frame_source;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
