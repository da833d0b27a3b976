//! Per-instance button configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::style::ButtonStyle;
use super::timer::TICK_INTERVAL;

/// Default hold time needed to stop the button
pub const DEFAULT_HOLD_DURATION: Duration = Duration::from_secs(3);

/// Shortest accepted hold duration; anything shorter is raised to it
pub const MIN_HOLD_DURATION: Duration = TICK_INTERVAL;

/// Errors raised while validating configuration values
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number of seconds, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

/// Immutable settings for one button instance
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonConfig {
    /// Press time that stops the button; shorter presses are taps
    pub hold_duration: Duration,
    pub style: ButtonStyle,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            hold_duration: DEFAULT_HOLD_DURATION,
            style: ButtonStyle::default(),
        }
    }
}

impl ButtonConfig {
    /// Set the hold duration, clamped to [`MIN_HOLD_DURATION`]
    pub fn with_hold_duration(mut self, duration: Duration) -> Self {
        self.hold_duration = clamp_hold_duration(duration);
        self
    }

    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }
}

fn clamp_hold_duration(duration: Duration) -> Duration {
    if duration < MIN_HOLD_DURATION {
        warn!(
            requested_ms = duration.as_millis() as u64,
            min_ms = MIN_HOLD_DURATION.as_millis() as u64,
            "hold duration too short, clamping"
        );
        MIN_HOLD_DURATION
    } else {
        duration
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(Duration::from_secs_f64(value))
}

/// On-disk form of [`ButtonConfig`], durations in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonConfigFile {
    #[serde(default = "default_duration_secs")]
    pub duration: f64,

    #[serde(flatten)]
    pub style: ButtonStyle,
}

fn default_duration_secs() -> f64 {
    DEFAULT_HOLD_DURATION.as_secs_f64()
}

impl Default for ButtonConfigFile {
    fn default() -> Self {
        Self {
            duration: default_duration_secs(),
            style: ButtonStyle::default(),
        }
    }
}

impl TryFrom<ButtonConfigFile> for ButtonConfig {
    type Error = ConfigError;

    fn try_from(file: ButtonConfigFile) -> Result<Self, Self::Error> {
        Ok(ButtonConfig::default()
            .with_hold_duration(seconds("duration", file.duration)?)
            .with_style(file.style))
    }
}
