//! Main application loop for the gesture engine.

use crate::{
    engine::GestureEngine,
    error::Result,
    frame_source::FrameSource,
    ipc::Channel,
    protocol::{Message, StatusState},
};
use log::{debug, info};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Totals reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames processed
    pub frames: u64,
    /// Gesture events sent
    pub events: u64,
}

/// Frame loop wiring a source, the engine and a channel together
pub struct GestureApp<S: FrameSource, C: Channel> {
    engine: GestureEngine,
    source: S,
    channel: C,
    send_status: bool,
    stop: Arc<AtomicBool>,
}

impl<S: FrameSource, C: Channel> GestureApp<S, C> {
    /// Create a new gesture application
    pub fn new(engine: GestureEngine, source: S, channel: C, send_status: bool) -> Self {
        Self {
            engine,
            source,
            channel,
            send_status,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends the loop before the next frame when set
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn report_status(&mut self, state: StatusState) {
        if self.send_status {
            self.channel.send(&Message::status(state));
        }
    }

    /// Run the main loop until the source is exhausted or the stop flag is set
    ///
    /// # Errors
    ///
    /// Returns the frame source error that ended the loop
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting gesture engine loop");

        let mut summary = RunSummary::default();
        let start_time = Instant::now();
        let mut last_fps_update = Instant::now();

        let initial = self.engine.status_state();
        self.report_status(initial);

        loop {
            if self.stop.load(Ordering::Relaxed) {
                info!("Stop requested");
                break;
            }

            // Commands apply before the next frame
            for command in self.channel.poll_commands() {
                info!("Received {command:?} command");
                if let Some(state) = self.engine.handle_command(command) {
                    self.report_status(state);
                }
            }

            let Some(frame) = self.source.next_frame()? else {
                info!("End of frame source reached");
                break;
            };

            let outcome = self.engine.process_frame(&frame);
            if let Some(state) = outcome.status_change {
                self.report_status(state);
            }
            for event in outcome.events {
                info!("Gesture: {event}");
                self.channel.send(&Message::from(event));
                summary.events += 1;
            }

            summary.frames += 1;
            if last_fps_update.elapsed() >= Duration::from_secs(5) {
                let fps = summary.frames as f64 / start_time.elapsed().as_secs_f64();
                debug!("Processed {} frames ({fps:.1} fps)", summary.frames);
                last_fps_update = Instant::now();
            }
        }

        info!(
            "Gesture engine stopped after {} frames and {} gestures",
            summary.frames, summary.events
        );
        Ok(summary)
    }

    #[must_use]
    pub const fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    #[must_use]
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Take the channel back, e.g. to inspect written output
    pub fn into_channel(self) -> C {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DetectionConfig,
        constants::MIN_FACE_LANDMARKS,
        frame_source::VecSource,
        ipc::WriterChannel,
        landmarks::{Frame, LandmarkPoint},
        protocol::Command,
    };
    use std::collections::VecDeque;

    /// Channel recording sent messages; each poll hands out the next queued batch
    #[derive(Default)]
    struct RecordingChannel {
        sent: Vec<Message>,
        inbox: VecDeque<Vec<Command>>,
    }

    impl Channel for RecordingChannel {
        fn send(&mut self, message: &Message) {
            self.sent.push(message.clone());
        }

        fn poll_commands(&mut self) -> Vec<Command> {
            self.inbox.pop_front().unwrap_or_default()
        }
    }

    /// Symmetric face with the nose shifted by `dx`
    fn face(dx: f64) -> Vec<LandmarkPoint> {
        let mut mesh = vec![LandmarkPoint::new(0.5, 0.5, 0.0); MIN_FACE_LANDMARKS];
        mesh[33] = LandmarkPoint::new(0.4, 0.4, 0.0);
        mesh[263] = LandmarkPoint::new(0.6, 0.4, 0.0);
        mesh[168] = LandmarkPoint::new(0.5, 0.4, 0.0);
        mesh[1] = LandmarkPoint::new(0.5 + dx, 0.5, -0.05);
        mesh[152] = LandmarkPoint::new(0.5, 0.7, 0.0);
        mesh[10] = LandmarkPoint::new(0.5, 0.2, 0.0);
        mesh
    }

    fn fist() -> Vec<LandmarkPoint> {
        let mut points = vec![LandmarkPoint::new(0.5, 0.8, 0.0); 21];
        for (mcp, x) in [(5, 0.45), (9, 0.50), (13, 0.55), (17, 0.60)] {
            points[mcp] = LandmarkPoint::new(x, 0.5, 0.0);
            points[mcp + 3] = LandmarkPoint::new(x, 0.6, 0.0);
        }
        points[4] = LandmarkPoint::new(0.52, 0.55, 0.0);
        points
    }

    fn engine() -> GestureEngine {
        GestureEngine::new(&DetectionConfig::default()).unwrap()
    }

    #[test]
    fn test_run_reports_status_and_gestures() {
        let frames = vec![Frame::new(0.0).with_hand(fist()), Frame::new(0.5).with_hand(fist())];
        let mut app = GestureApp::new(engine(), VecSource::new(frames), RecordingChannel::default(), true);

        let summary = app.run().unwrap();
        assert_eq!(summary, RunSummary { frames: 2, events: 1 });
        assert_eq!(
            app.channel().sent,
            vec![
                Message::status(StatusState::Calibrating),
                Message::Gesture {
                    gesture: "fist".to_string(),
                    action_type: crate::protocol::ActionType::Hand,
                },
            ]
        );
    }

    #[test]
    fn test_recalibrate_command_applies_before_next_frame() {
        let config = DetectionConfig {
            calibration_frames: 1,
            smoothing_window: 1,
            ..DetectionConfig::default()
        };
        let frames = vec![
            Frame::new(0.0).with_face(face(0.0)),
            Frame::new(0.125).with_face(face(0.06)),
            // Would complete a nod if the command were applied after this frame
            Frame::new(0.25).with_face(face(0.0)),
            Frame::new(0.375).with_face(face(0.0)),
        ];
        let channel = RecordingChannel {
            sent: Vec::new(),
            inbox: VecDeque::from([Vec::new(), Vec::new(), vec![Command::Recalibrate]]),
        };
        let mut app = GestureApp::new(GestureEngine::new(&config).unwrap(), VecSource::new(frames), channel, true);

        let summary = app.run().unwrap();
        assert_eq!(summary, RunSummary { frames: 4, events: 0 });
        assert!(app.engine().is_calibrated());
        assert_eq!(
            app.channel().sent,
            vec![
                Message::status(StatusState::Calibrating),
                Message::status(StatusState::Ready),
                Message::status(StatusState::Calibrating),
                Message::status(StatusState::Ready),
            ]
        );
    }

    #[test]
    fn test_status_can_be_disabled() {
        let channel = RecordingChannel {
            sent: Vec::new(),
            inbox: VecDeque::from([vec![Command::Recalibrate]]),
        };
        let mut app = GestureApp::new(engine(), VecSource::new(vec![Frame::new(0.0)]), channel, false);
        app.run().unwrap();
        assert!(app.channel().sent.is_empty());
    }

    #[test]
    fn test_stop_flag() {
        let mut app = GestureApp::new(
            engine(),
            VecSource::new(vec![Frame::new(0.0)]),
            WriterChannel::new(Vec::new()),
            false,
        );
        app.stop_handle().store(true, Ordering::Relaxed);
        assert_eq!(app.run().unwrap(), RunSummary::default());
        assert!(app.into_channel().into_inner().is_empty());
    }
}
