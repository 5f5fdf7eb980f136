//! Newline-delimited JSON wire protocol.
//!
//! Every message is one JSON object followed by `\n`:
//!
//! ```text
//! engine   -> consumer  {"type":"gesture","gesture":"hold_up","action_type":"head"}
//! engine   -> consumer  {"type":"status","state":"ready"}
//! consumer -> engine    {"type":"command","command":"recalibrate"}
//! ```

use crate::{
    constants::MAX_LINE_LENGTH,
    hand_gesture::HandGesture,
    head_gesture::{Direction, GestureMode, HeadGesture},
    Result,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which detector produced a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Head,
    Hand,
}

/// A gesture produced by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureEvent {
    Head(HeadGesture),
    Hand(HandGesture),
}

impl GestureEvent {
    /// Wire name: `{mode}_{direction}` for head gestures, the bare name for hand gestures
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Head(gesture) => gesture.name(),
            Self::Hand(gesture) => gesture.as_str().to_string(),
        }
    }

    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Head(_) => ActionType::Head,
            Self::Hand(_) => ActionType::Hand,
        }
    }
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head(gesture) => fmt::Display::fmt(gesture, f),
            Self::Hand(gesture) => fmt::Display::fmt(gesture, f),
        }
    }
}

impl From<HeadGesture> for GestureEvent {
    fn from(gesture: HeadGesture) -> Self {
        Self::Head(gesture)
    }
}

impl From<HandGesture> for GestureEvent {
    fn from(gesture: HandGesture) -> Self {
        Self::Hand(gesture)
    }
}

/// Every gesture name the engine can emit
#[must_use]
pub fn known_gesture_names() -> Vec<String> {
    let head = GestureMode::ALL.iter().flat_map(|&mode| {
        Direction::ALL
            .iter()
            .map(move |&direction| HeadGesture::new(direction, mode).name())
    });
    let hand = HandGesture::ALL.iter().map(|g| g.as_str().to_string());
    head.chain(hand).collect()
}

/// Inbound command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Re-establish the neutral head pose
    Recalibrate,
    /// Any command this engine does not understand
    #[serde(other)]
    Unknown,
}

/// Calibration state reported to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Calibrating,
    Ready,
}

/// One line of the wire protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Gesture { gesture: String, action_type: ActionType },
    Command { command: Command },
    Status { state: StatusState },
}

impl Message {
    #[must_use]
    pub const fn command(command: Command) -> Self {
        Self::Command { command }
    }

    #[must_use]
    pub const fn status(state: StatusState) -> Self {
        Self::Status { state }
    }

    /// Encode as a single `\n`-terminated line
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Decode one line (without its terminator)
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for malformed JSON or an unknown message type
    pub fn from_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

impl From<GestureEvent> for Message {
    fn from(event: GestureEvent) -> Self {
        Self::Gesture {
            gesture: event.name(),
            action_type: event.action_type(),
        }
    }
}

/// Receive buffer that turns a byte stream into complete lines
///
/// Bytes after the last `\n` are kept until the rest of the line arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Take every complete, non-empty line out of the buffer
    pub fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..pos]);
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }

        if self.buffer.len() > MAX_LINE_LENGTH {
            warn!(
                "Discarding {} buffered bytes without a line terminator",
                self.buffer.len()
            );
            self.buffer.clear();
        }

        lines
    }

    /// Bytes waiting for a terminator
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Decode lines into messages, dropping malformed ones
pub fn decode_lines<I>(lines: I) -> Vec<Message>
where
    I: IntoIterator<Item = String>,
{
    lines
        .into_iter()
        .filter_map(|line| match Message::from_line(&line) {
            Ok(message) => Some(message),
            Err(e) => {
                debug!("Dropping malformed line {line:?}: {e}");
                None
            }
        })
        .collect()
}

/// Pull the commands out of decoded messages
pub fn commands(messages: Vec<Message>) -> Vec<Command> {
    messages
        .into_iter()
        .filter_map(|message| match message {
            Message::Command { command } => Some(command),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_wire_format() {
        let event = GestureEvent::Head(HeadGesture::new(Direction::Up, GestureMode::Hold));
        assert_eq!(
            Message::from(event).to_line().unwrap(),
            "{\"type\":\"gesture\",\"gesture\":\"hold_up\",\"action_type\":\"head\"}\n"
        );

        let event = GestureEvent::Hand(HandGesture::SwipeLeft);
        assert_eq!(
            Message::from(event).to_line().unwrap(),
            "{\"type\":\"gesture\",\"gesture\":\"swipe_left\",\"action_type\":\"hand\"}\n"
        );
    }

    #[test]
    fn test_command_wire_format() {
        assert_eq!(
            Message::command(Command::Recalibrate).to_line().unwrap(),
            "{\"type\":\"command\",\"command\":\"recalibrate\"}\n"
        );
        assert_eq!(
            Message::from_line(r#"{"type":"command","command":"recalibrate"}"#).unwrap(),
            Message::command(Command::Recalibrate)
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Message::from_line(r#"{"type":"command","command":"self_destruct"}"#).unwrap(),
            Message::command(Command::Unknown)
        );
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            Message::status(StatusState::Calibrating).to_line().unwrap(),
            "{\"type\":\"status\",\"state\":\"calibrating\"}\n"
        );
    }

    #[test]
    fn test_line_buffer_partial_reads() {
        let mut buffer = LineBuffer::new();
        buffer.extend(b"{\"type\":\"comm");
        assert!(buffer.drain_lines().is_empty());
        assert_eq!(buffer.pending(), 13);

        buffer.extend(b"and\",\"command\":\"recalibrate\"}\n{\"ty");
        let lines = buffer.drain_lines();
        assert_eq!(lines, vec![r#"{"type":"command","command":"recalibrate"}"#.to_string()]);
        assert_eq!(buffer.pending(), 4);
    }

    #[test]
    fn test_line_buffer_concatenated_and_blank() {
        let mut buffer = LineBuffer::new();
        buffer.extend(b"a\n\n  \nb\r\nc\n");
        assert_eq!(buffer.drain_lines(), vec!["a", "b", "c"]);
        assert_eq!(buffer.pending(), 0);
    }

    #[test]
    fn test_line_buffer_overflow() {
        let mut buffer = LineBuffer::new();
        buffer.extend(&vec![b'x'; MAX_LINE_LENGTH + 1]);
        assert!(buffer.drain_lines().is_empty());
        assert_eq!(buffer.pending(), 0);
    }

    #[test]
    fn test_decode_drops_malformed() {
        let lines = vec![
            "{not json".to_string(),
            r#"{"type":"command","command":"recalibrate"}"#.to_string(),
            r#"{"type":"teleport"}"#.to_string(),
        ];
        let messages = decode_lines(lines);
        assert_eq!(messages, vec![Message::command(Command::Recalibrate)]);
        assert_eq!(commands(messages), vec![Command::Recalibrate]);
    }

    #[test]
    fn test_known_gesture_names() {
        let names = known_gesture_names();
        assert_eq!(names.len(), 10);
        for expected in ["nod_left", "nod_down", "hold_right", "hold_up", "fist", "swipe_left"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
