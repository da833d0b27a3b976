//! Tap vs long-press arbitration for a single pointer
//!
//! The long-press recognizer takes a press as soon as it starts and runs
//! for the hold duration. Releasing before the hold completes is a tap;
//! once the hold completes the touch is consumed by the long press and
//! its release produces nothing.

use tracing::{debug, warn};

/// Recognized gestures, fed into the button state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Released before the hold completed
    Tap,
    /// Pointer went down; the hold is running
    LongPressBegan,
    /// The host cancelled the touch before the hold completed
    LongPressAbandoned,
}

#[derive(Debug, Default)]
pub struct PressTracker {
    holding: bool,
}

impl PressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a press is being held and its hold has not completed
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Pointer went down; a second pointer while one is tracked is ignored
    pub fn press_started(&mut self) -> Option<Gesture> {
        if self.holding {
            warn!("press started while another press is tracked, ignoring");
            return None;
        }
        self.holding = true;
        debug!("long press began");
        Some(Gesture::LongPressBegan)
    }

    /// Pointer went up
    ///
    /// Callers must have run a due hold completion first, so a press still
    /// tracked here was released in time to count as a tap.
    pub fn press_ended(&mut self) -> Option<Gesture> {
        let gesture = std::mem::take(&mut self.holding).then_some(Gesture::Tap);
        debug!(?gesture, "press ended");
        gesture
    }

    /// The host aborted the touch; never yields a tap
    pub fn press_cancelled(&mut self) -> Option<Gesture> {
        let gesture = std::mem::take(&mut self.holding).then_some(Gesture::LongPressAbandoned);
        debug!(?gesture, "press cancelled");
        gesture
    }

    /// The hold completed or was dropped; the touch is consumed
    pub fn finish(&mut self) {
        self.holding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_begins_long_press_immediately() {
        let mut tracker = PressTracker::new();
        assert_eq!(tracker.press_started(), Some(Gesture::LongPressBegan));
        assert!(tracker.is_holding());
    }

    #[test]
    fn test_release_before_completion_is_tap() {
        let mut tracker = PressTracker::new();
        tracker.press_started();
        assert_eq!(tracker.press_ended(), Some(Gesture::Tap));
        assert!(!tracker.is_holding());
    }

    #[test]
    fn test_release_after_completion_is_nothing() {
        let mut tracker = PressTracker::new();
        tracker.press_started();
        tracker.finish();
        assert_eq!(tracker.press_ended(), None);
    }

    #[test]
    fn test_cancel_never_taps() {
        let mut tracker = PressTracker::new();
        tracker.press_started();
        assert_eq!(tracker.press_cancelled(), Some(Gesture::LongPressAbandoned));
        assert!(!tracker.is_holding());
        assert_eq!(tracker.press_cancelled(), None);
    }

    #[test]
    fn test_second_press_is_ignored() {
        let mut tracker = PressTracker::new();
        tracker.press_started();
        assert_eq!(tracker.press_started(), None);
        assert!(tracker.is_holding());
    }

    #[test]
    fn test_release_without_press() {
        let mut tracker = PressTracker::new();
        assert_eq!(tracker.press_ended(), None);
    }
}
