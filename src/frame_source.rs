//! Landmark frame input.
//!
//! The landmark extractor runs outside this crate. Frames arrive as JSON
//! lines:
//!
//! ```text
//! {"t": 12.5, "face": [{"x":0.5,"y":0.4,"z":0.0}, ...], "hands": [[...], ...]}
//! ```
//!
//! `t` is optional and `face` may be `null`.

use crate::{
    landmarks::{Frame, LandmarkPoint},
    Error, Result,
};
use log::debug;
use serde::Deserialize;
use std::{
    collections::VecDeque,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    time::Instant,
};

/// Producer of landmark frames
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or yields an unreadable frame
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    t: Option<f64>,
    #[serde(default)]
    face: Option<Vec<LandmarkPoint>>,
    #[serde(default)]
    hands: Vec<Vec<LandmarkPoint>>,
}

/// Frame source reading one JSON frame per line
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line: String,
    line_number: usize,
    clock: Instant,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
            clock: Instant::now(),
        }
    }

    /// Lines consumed so far, blank ones included
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }
}

impl JsonLinesSource<Box<dyn BufRead>> {
    /// Open a file, or standard input for `-`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            Box::new(BufReader::new(File::open(path)?))
        };
        Ok(Self::from_reader(reader))
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                debug!("Frame source exhausted after {} lines", self.line_number);
                return Ok(None);
            }
            self.line_number += 1;

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }

            let raw: RawFrame = serde_json::from_str(text).map_err(|e| {
                Error::FrameSource(format!("Line {}: {e}", self.line_number))
            })?;

            return Ok(Some(Frame {
                timestamp: raw.t.unwrap_or_else(|| self.clock.elapsed().as_secs_f64()),
                face: raw.face,
                hands: raw.hands,
            }));
        }
    }
}

/// Frame source replaying frames from memory
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    frames: VecDeque<Frame>,
}

impl VecSource {
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames: frames.into() }
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}
