//! Hold button core
//!
//! A button that tells a short tap from a sustained press:
//! - Tap: toggles between start and pause
//! - Long press: fills a progress bar and stops the button once full,
//!   returning to ready a second later
//! - Disabled: shown as blocked, input ignored

mod config;
mod controller;
mod driver;
mod gesture;
mod status;
mod style;
mod timer;

pub use config::{
    ButtonConfig, ButtonConfigFile, ConfigError, DEFAULT_HOLD_DURATION, MIN_HOLD_DURATION,
};
pub use controller::{
    ButtonController, ButtonInput, ButtonSnapshot, ProgressCallback, StatusCallback,
    STOP_RESET_DELAY,
};
pub use driver::{ButtonDriver, ButtonHandle, DriverError};
pub use gesture::{Gesture, PressTracker};
pub use status::{ButtonStatus, Color};
pub use style::{ButtonStyle, FALLBACK_COLOR, FALLBACK_LABEL};
pub use timer::{HoldTimer, Tick, TICK_INTERVAL};
