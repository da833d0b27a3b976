//! Hold button state machine
//!
//! Interprets press events, reconciles the host override with internal
//! state, drives the hold timer, and notifies observers once per change of
//! the effective status.
//!
//! The controller never reads a clock. Every operation receives `now`, and
//! [`ButtonController::advance`] replays the deadlines that came due (hold
//! timer ticks and delayed stop resets) in chronological order. Whoever
//! owns the controller decides how time passes: the async driver sleeps
//! until [`ButtonController::next_deadline`], tests simply pass later
//! instants.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, trace};

use super::config::ButtonConfig;
use super::gesture::{Gesture, PressTracker};
use super::status::{ButtonStatus, Color};
use super::timer::{HoldTimer, Tick};

/// Delay between a confirmed long press and the return to `ready`
pub const STOP_RESET_DELAY: Duration = Duration::from_secs(1);

/// Called with the new effective status after every change
pub type StatusCallback = Box<dyn FnMut(ButtonStatus) + Send>;

/// Called with every hold progress sample
pub type ProgressCallback = Box<dyn FnMut(f64) + Send>;

/// Input forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ButtonInput {
    /// Pointer went down on the button
    PressStarted,
    /// Pointer went up
    PressEnded,
    /// The touch was aborted by the host
    PressCancelled,
    /// A tap already recognized by the host
    TapEnded,
    /// Replace the external override; `None` clears it
    SetOverride(Option<ButtonStatus>),
    SetEnabled(bool),
}

/// Everything a host needs to render the button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSnapshot {
    pub status: ButtonStatus,
    pub internal_status: ButtonStatus,
    pub external_override: Option<ButtonStatus>,
    pub enabled: bool,
    pub is_holding: bool,
    pub progress: f64,
    pub label: String,
    pub color: Color,
    pub text_color: Color,
    pub progress_color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Due {
    Tick,
    Reset,
}

pub struct ButtonController {
    config: ButtonConfig,
    internal_status: ButtonStatus,
    external_override: Option<ButtonStatus>,
    enabled: bool,
    timer: HoldTimer,
    press: PressTracker,
    /// Deadlines of scheduled stop -> ready resets, oldest first
    pending_resets: VecDeque<Instant>,
    /// Last effective status reported to observers
    reported: ButtonStatus,
    status_observers: Vec<StatusCallback>,
    progress_observers: Vec<ProgressCallback>,
}

impl ButtonController {
    /// Create an enabled controller in `ready` with no override
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config,
            internal_status: ButtonStatus::Ready,
            external_override: None,
            enabled: true,
            timer: HoldTimer::new(),
            press: PressTracker::new(),
            pending_resets: VecDeque::new(),
            reported: ButtonStatus::Ready,
            status_observers: Vec::new(),
            progress_observers: Vec::new(),
        }
    }

    /// Create a controller with the host's state change callback installed
    pub fn with_callback(
        config: ButtonConfig,
        on_state_change: impl FnMut(ButtonStatus) + Send + 'static,
    ) -> Self {
        let mut controller = Self::new(config);
        controller.subscribe(on_state_change);
        controller
    }

    pub fn subscribe(&mut self, observer: impl FnMut(ButtonStatus) + Send + 'static) {
        self.status_observers.push(Box::new(observer));
    }

    pub fn subscribe_progress(&mut self, observer: impl FnMut(f64) + Send + 'static) {
        self.progress_observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// Status shown to the user
    pub fn effective_status(&self) -> ButtonStatus {
        if self.enabled {
            self.external_override.unwrap_or(self.internal_status)
        } else {
            ButtonStatus::Blocked
        }
    }

    pub fn internal_status(&self) -> ButtonStatus {
        self.internal_status
    }

    pub fn external_override(&self) -> Option<ButtonStatus> {
        self.external_override
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a long press is in progress (drives the press animation)
    pub fn is_holding(&self) -> bool {
        self.press.is_holding()
    }

    pub fn progress(&self) -> f64 {
        self.timer.progress()
    }

    pub fn timer(&self) -> &HoldTimer {
        &self.timer
    }

    /// Number of stop -> ready resets still scheduled
    pub fn pending_resets(&self) -> usize {
        self.pending_resets.len()
    }

    pub fn snapshot(&self) -> ButtonSnapshot {
        let status = self.effective_status();
        ButtonSnapshot {
            status,
            internal_status: self.internal_status,
            external_override: self.external_override,
            enabled: self.enabled,
            is_holding: self.is_holding(),
            progress: self.progress(),
            label: self.config.style.label_for(status).to_string(),
            color: self.config.style.color_for(status),
            text_color: self.config.style.text_color,
            progress_color: self.config.style.progress_color,
        }
    }

    /// Re-initialize when the widget appears
    ///
    /// Forces `ready` internally; an override already set by the host stays
    /// in place and is not folded into internal state.
    pub fn mount(&mut self) {
        self.timer.reset();
        self.internal_status = ButtonStatus::Ready;
        debug!(external_override = ?self.external_override, "button mounted");
        self.report();
    }

    /// Tear down, cancelling the hold timer and every scheduled reset
    pub fn unmount(self) {
        // Cancellation happens in Drop
    }

    /// Earliest instant at which [`advance`](Self::advance) has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_due().map(|(at, _)| at)
    }

    /// Run everything scheduled at or before `now`, oldest first
    pub fn advance(&mut self, now: Instant) {
        while let Some((at, due)) = self.next_due() {
            if at > now {
                break;
            }
            match due {
                Due::Tick => self.on_tick(at),
                Due::Reset => self.on_reset(),
            }
        }
    }

    /// Apply one host input at `now`, after catching up on due deadlines
    pub fn handle(&mut self, input: ButtonInput, now: Instant) {
        self.advance(now);

        match input {
            ButtonInput::PressStarted => {
                if !self.enabled {
                    debug!("button disabled, ignoring press");
                } else if self.press.press_started() == Some(Gesture::LongPressBegan) {
                    self.timer.start(self.config.hold_duration, now);
                }
            }
            ButtonInput::PressEnded => {
                let gesture = self.press.press_ended();
                self.on_gesture(gesture);
            }
            ButtonInput::PressCancelled => {
                let gesture = self.press.press_cancelled();
                self.on_gesture(gesture);
            }
            ButtonInput::TapEnded => self.on_gesture(Some(Gesture::Tap)),
            ButtonInput::SetOverride(status) => self.set_external_override(status),
            ButtonInput::SetEnabled(enabled) => self.set_enabled(enabled),
        }
    }

    pub fn set_external_override(&mut self, status: Option<ButtonStatus>) {
        debug!(?status, "external override set");
        self.external_override = status;
        self.report();
    }

    /// Gate input; a running hold timer is left alone
    pub fn set_enabled(&mut self, enabled: bool) {
        debug!(enabled, "enabled changed");
        self.enabled = enabled;
        self.report();
    }

    fn next_due(&self) -> Option<(Instant, Due)> {
        [
            self.timer.next_tick().map(|at| (at, Due::Tick)),
            self.pending_resets.front().map(|&at| (at, Due::Reset)),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn on_gesture(&mut self, gesture: Option<Gesture>) {
        match gesture {
            Some(Gesture::Tap) if self.enabled => self.tap(),
            Some(Gesture::Tap) => {
                debug!("button disabled, ignoring tap");
                self.timer.reset();
            }
            Some(Gesture::LongPressAbandoned) => {
                debug!(progress = self.timer.progress(), "long press abandoned");
                self.timer.reset();
            }
            Some(Gesture::LongPressBegan) | None => {}
        }
    }

    fn tap(&mut self) {
        let next = if self.effective_status() == ButtonStatus::Start {
            ButtonStatus::Pause
        } else {
            ButtonStatus::Start
        };
        self.internal_status = next;
        self.external_override = None;
        self.press.finish();
        self.timer.reset();
        self.report();
    }

    fn on_tick(&mut self, at: Instant) {
        let tick = self.timer.tick();
        let progress = self.timer.progress();
        trace!(progress, "hold progress");
        for observer in &mut self.progress_observers {
            observer(progress);
        }

        if tick != Tick::Completed || !self.press.is_holding() {
            return;
        }
        if self.enabled {
            self.confirm_long_press(at);
        } else {
            debug!("button disabled when hold completed, dropping press");
            self.press.finish();
            self.timer.reset();
        }
    }

    fn confirm_long_press(&mut self, at: Instant) {
        self.press.finish();
        self.timer.reset();
        self.internal_status = ButtonStatus::Stop;
        self.external_override = None;
        // Fires even if other transitions happen first
        self.pending_resets.push_back(at + STOP_RESET_DELAY);
        self.report();
    }

    fn on_reset(&mut self) {
        self.pending_resets.pop_front();
        self.internal_status = ButtonStatus::Ready;
        self.report();
    }

    /// Notify observers if the effective status changed since the last report
    fn report(&mut self) {
        let status = self.effective_status();
        if status == self.reported {
            return;
        }

        info!(from = %self.reported, to = %status, "status transition");
        self.reported = status;
        for observer in &mut self.status_observers {
            observer(status);
        }
    }
}

impl Drop for ButtonController {
    fn drop(&mut self) {
        if self.timer.is_active() || self.press.is_holding() || !self.pending_resets.is_empty() {
            debug!(
                timer_active = self.timer.is_active(),
                pending_resets = self.pending_resets.len(),
                "cancelling scheduled work on teardown"
            );
        }
        self.timer.reset();
        self.press.finish();
        self.pending_resets.clear();
    }
}

impl std::fmt::Debug for ButtonController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonController")
            .field("status", &self.effective_status())
            .field("internal_status", &self.internal_status)
            .field("external_override", &self.external_override)
            .field("enabled", &self.enabled)
            .field("timer", &self.timer)
            .field("pending_resets", &self.pending_resets.len())
            .finish()
    }
}
