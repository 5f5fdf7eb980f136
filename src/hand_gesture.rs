//! Hand gesture classification.
//!
//! Fist and open palm are per-frame shape tests on the 21-point hand set.
//! Swipe is stateful: while a palm stays open its middle-finger knuckle is
//! tracked, and fast enough leftward travel fires `swipe_left`.

use crate::{
    config::DetectionConfig,
    constants::{
        FINGER_TIP_MCP_PAIRS, FIST_MIN_CURLED, HAND_INDEX_MCP, HAND_MIDDLE_MCP, HAND_PINKY_MCP, HAND_THUMB_TIP,
        PALM_MIN_EXTENDED, THUMB_CURL_RATIO,
    },
    landmarks::{HandLandmarks, LandmarkPoint},
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A detected hand gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandGesture {
    Fist,
    SwipeLeft,
}

impl HandGesture {
    pub const ALL: [Self; 2] = [Self::Fist, Self::SwipeLeft];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fist => "fist",
            Self::SwipeLeft => "swipe_left",
        }
    }
}

impl fmt::Display for HandGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count fingers whose tip is below (numerically greater y than) its knuckle
fn curled_fingers(hand: &HandLandmarks) -> usize {
    FINGER_TIP_MCP_PAIRS
        .iter()
        .filter(|&&(tip, mcp)| hand.point(tip).y > hand.point(mcp).y)
        .count()
}

/// Count fingers whose tip is above its knuckle
fn extended_fingers(hand: &HandLandmarks) -> usize {
    FINGER_TIP_MCP_PAIRS
        .iter()
        .filter(|&&(tip, mcp)| hand.point(tip).y < hand.point(mcp).y)
        .count()
}

/// Thumb tip tucked toward the palm center
fn thumb_curled(hand: &HandLandmarks) -> bool {
    let index_mcp = hand.point(HAND_INDEX_MCP);
    let pinky_mcp = hand.point(HAND_PINKY_MCP);
    let thumb_tip = hand.point(HAND_THUMB_TIP);

    let palm_center_x = (index_mcp.x + pinky_mcp.x) / 2.0;
    (thumb_tip.x - palm_center_x).abs() < (index_mcp.x - palm_center_x).abs() * THUMB_CURL_RATIO
}

/// All four fingers curled and the thumb tucked in
///
/// Assumes a roughly upright hand.
#[must_use]
pub fn is_fist(hand: &HandLandmarks) -> bool {
    curled_fingers(hand) >= FIST_MIN_CURLED && thumb_curled(hand)
}

/// At least three of the four fingers extended
#[must_use]
pub fn is_open_palm(hand: &HandLandmarks) -> bool {
    extended_fingers(hand) >= PALM_MIN_EXTENDED
}

/// Swipe tracking for one hand
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwipeTracker {
    /// Palm x and time where the current swipe window started
    start: Option<(f64, f64)>,
}

impl SwipeTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { start: None }
    }

    /// Feed one frame; returns true when a left swipe completes
    pub fn update(&mut self, hand: &HandLandmarks, now: f64, swipe_threshold: f64, swipe_max_time: f64) -> bool {
        if !is_open_palm(hand) {
            self.start = None;
            return false;
        }

        let palm_x = hand.point(HAND_MIDDLE_MCP).x;
        let Some((start_x, start_time)) = self.start else {
            self.start = Some((palm_x, now));
            return false;
        };

        let elapsed = now - start_time;
        if elapsed < swipe_max_time {
            // Positive distance is leftward travel
            if start_x - palm_x > swipe_threshold {
                self.start = None;
                return true;
            }
        } else {
            // Slide the window rather than abandoning the swipe
            self.start = Some((palm_x, now));
        }

        false
    }

    /// Palm x and time of the current window start
    #[must_use]
    pub const fn start(&self) -> Option<(f64, f64)> {
        self.start
    }

    pub fn reset(&mut self) {
        self.start = None;
    }
}

/// Hand gesture detector across all tracked hands
#[derive(Debug, Clone)]
pub struct HandGestureClassifier {
    hand_cooldown: f64,
    swipe_threshold: f64,
    swipe_max_time: f64,
    trackers: Vec<SwipeTracker>,
    last_gesture_time: Option<f64>,
}

impl HandGestureClassifier {
    #[must_use]
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            hand_cooldown: config.hand_cooldown,
            swipe_threshold: config.swipe_threshold,
            swipe_max_time: config.swipe_max_time,
            trackers: Vec::new(),
            last_gesture_time: None,
        }
    }

    fn cooldown_elapsed(&self, now: f64) -> bool {
        self.last_gesture_time
            .map_or(true, |last| now - last > self.hand_cooldown)
    }

    /// Process the hands of one frame, indexed by tracking slot
    ///
    /// Swipe takes priority over fist and at most one gesture is returned.
    /// Every hand's swipe tracker is advanced even after a gesture fired.
    /// A malformed landmark set resets its own slot and nothing else.
    pub fn process(&mut self, hands: &[Vec<LandmarkPoint>], now: f64) -> Option<HandGesture> {
        // Hands that are no longer tracked lose their swipe state
        self.trackers.truncate(hands.len());
        self.trackers.resize_with(hands.len(), SwipeTracker::new);

        let ready = self.cooldown_elapsed(now);
        let mut emitted = None;
        for (slot, (points, tracker)) in hands.iter().zip(self.trackers.iter_mut()).enumerate() {
            let hand = match HandLandmarks::new(points) {
                Ok(hand) => hand,
                Err(e) => {
                    debug!("Skipping hand {slot} at t={now:.3}: {e}");
                    tracker.reset();
                    continue;
                }
            };

            let swiped = tracker.update(&hand, now, self.swipe_threshold, self.swipe_max_time);
            if emitted.is_some() {
                continue;
            }

            let candidate = if swiped {
                Some(HandGesture::SwipeLeft)
            } else if is_fist(&hand) {
                Some(HandGesture::Fist)
            } else {
                None
            };

            if let Some(gesture) = candidate {
                if ready {
                    emitted = Some(gesture);
                } else {
                    debug!("Hand gesture {gesture} suppressed by cooldown");
                }
            }
        }

        if emitted.is_some() {
            self.last_gesture_time = Some(now);
        }
        emitted
    }

    /// Whether a hand gesture would be accepted at `now`
    #[must_use]
    pub fn is_ready(&self, now: f64) -> bool {
        self.cooldown_elapsed(now)
    }

    /// Swipe trackers, one per currently tracked hand
    #[must_use]
    pub fn trackers(&self) -> &[SwipeTracker] {
        &self.trackers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Upright hand with knuckles on y=0.5 and tips at `tip_y`
    fn hand(offset_x: f64, tip_y: f64, thumb_x: f64) -> Vec<LandmarkPoint> {
        let mut points = vec![LandmarkPoint::new(0.5 + offset_x, 0.8, 0.0); 21];
        let knuckles = [(5, 0.45), (9, 0.50), (13, 0.55), (17, 0.60)];
        for (mcp, x) in knuckles {
            points[mcp] = LandmarkPoint::new(x + offset_x, 0.5, 0.0);
            points[mcp + 3] = LandmarkPoint::new(x + offset_x, tip_y, 0.0);
        }
        points[4] = LandmarkPoint::new(thumb_x + offset_x, 0.55, 0.0);
        points
    }

    fn fist() -> Vec<LandmarkPoint> {
        hand(0.0, 0.6, 0.52)
    }

    fn palm(offset_x: f64) -> Vec<LandmarkPoint> {
        hand(offset_x, 0.3, 0.35)
    }

    fn landmarks(points: &[LandmarkPoint]) -> HandLandmarks<'_> {
        HandLandmarks::new(points).unwrap()
    }

    fn swipe(tracker: &mut SwipeTracker, points: &[LandmarkPoint], now: f64) -> bool {
        tracker.update(&landmarks(points), now, 0.15, 0.5)
    }

    #[test]
    fn test_fist_detection() {
        let fist = fist();
        assert!(is_fist(&landmarks(&fist)));
        assert!(!is_open_palm(&landmarks(&fist)));
    }

    #[test]
    fn test_curled_fingers_with_open_thumb_is_not_fist() {
        assert!(!is_fist(&landmarks(&hand(0.0, 0.6, 0.30))));
    }

    #[test]
    fn test_palm_detection() {
        let palm = palm(0.0);
        assert!(is_open_palm(&landmarks(&palm)));
        assert!(!is_fist(&landmarks(&palm)));
    }

    #[test]
    fn test_three_extended_fingers_is_palm() {
        let mut points = palm(0.0);
        points[20].y = 0.7;
        assert!(is_open_palm(&landmarks(&points)));
    }

    #[test]
    fn test_swipe_tracker() {
        let mut tracker = SwipeTracker::new();
        assert!(!swipe(&mut tracker, &palm(0.0), 0.0));
        assert_eq!(tracker.start(), Some((0.5, 0.0)));
        assert!(!swipe(&mut tracker, &palm(-0.1), 0.125));
        assert!(swipe(&mut tracker, &palm(-0.2), 0.25));
        assert_eq!(tracker.start(), None);
    }

    #[test]
    fn test_swipe_tracker_resets_on_closed_hand() {
        let mut tracker = SwipeTracker::new();
        swipe(&mut tracker, &palm(0.0), 0.0);
        swipe(&mut tracker, &fist(), 0.1);
        assert_eq!(tracker.start(), None);
    }

    #[test]
    fn test_rightward_motion_never_swipes() {
        let mut tracker = SwipeTracker::new();
        swipe(&mut tracker, &palm(0.0), 0.0);
        assert!(!swipe(&mut tracker, &palm(0.3), 0.1));
    }

    #[test]
    fn test_classifier_cooldown() {
        let mut classifier = HandGestureClassifier::new(&DetectionConfig::default());
        let hands = [fist()];

        assert_eq!(classifier.process(&hands, 0.0), Some(HandGesture::Fist));
        assert_eq!(classifier.process(&hands, 0.5), None);
        // Strictly greater than the cooldown
        assert_eq!(classifier.process(&hands, 1.0), None);
        assert_eq!(classifier.process(&hands, 1.125), Some(HandGesture::Fist));
    }

    #[test]
    fn test_one_gesture_per_frame() {
        let mut classifier = HandGestureClassifier::new(&DetectionConfig::default());
        let hands = [fist(), fist()];
        assert_eq!(classifier.process(&hands, 0.0), Some(HandGesture::Fist));
        assert_eq!(classifier.trackers().len(), 2);
    }

    #[test]
    fn test_lost_hand_drops_tracker() {
        let mut classifier = HandGestureClassifier::new(&DetectionConfig::default());
        classifier.process(&[palm(0.0), palm(0.0)], 0.0);
        assert_eq!(classifier.trackers().len(), 2);
        classifier.process(&[palm(0.0)], 0.1);
        assert_eq!(classifier.trackers().len(), 1);
        classifier.process(&[], 0.2);
        assert!(classifier.trackers().is_empty());
    }

    #[test]
    fn test_malformed_hand_resets_only_its_slot() {
        let mut classifier = HandGestureClassifier::new(&DetectionConfig::default());
        classifier.process(&[palm(0.0), palm(-0.2)], 0.0);

        let short = vec![LandmarkPoint::default(); 5];
        assert_eq!(classifier.process(&[short, palm(-0.2)], 0.1), None);
        assert_eq!(classifier.trackers()[0].start(), None);
        let (start_x, start_time) = classifier.trackers()[1].start().unwrap();
        assert!((start_x - 0.3).abs() < 1e-9);
        assert_eq!(start_time, 0.0);
    }

    #[test]
    fn test_names() {
        assert_eq!(HandGesture::Fist.to_string(), "fist");
        assert_eq!(HandGesture::SwipeLeft.to_string(), "swipe_left");
    }
}
