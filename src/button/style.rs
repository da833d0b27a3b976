//! Labels and colors per status
//!
//! Lookups fall back from the caller's map to the built-in defaults, and
//! from there to an empty label or gray.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::status::{ButtonStatus, Color};

/// Label used when neither the caller nor the defaults name a status
pub const FALLBACK_LABEL: &str = "";

/// Color used when neither the caller nor the defaults name a status
pub const FALLBACK_COLOR: Color = Color::Gray;

fn default_label(status: ButtonStatus) -> Option<&'static str> {
    Some(match status {
        ButtonStatus::Start => "run",
        ButtonStatus::Pause => "pause",
        ButtonStatus::Stop => "stop",
        ButtonStatus::Ready => "ready",
        ButtonStatus::Blocked => "blocked",
    })
}

fn default_color(status: ButtonStatus) -> Option<Color> {
    Some(match status {
        ButtonStatus::Start => Color::Green,
        ButtonStatus::Pause => Color::Yellow,
        ButtonStatus::Stop => Color::Red,
        ButtonStatus::Ready => Color::Blue,
        ButtonStatus::Blocked => Color::Gray,
    })
}

fn default_text_color() -> Color {
    Color::White
}

fn default_progress_color() -> Color {
    Color::Gray
}

/// Presentation settings supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonStyle {
    /// Caller labels, overriding the defaults entry by entry
    #[serde(default)]
    pub labels: HashMap<ButtonStatus, String>,

    /// Caller colors, overriding the defaults entry by entry
    #[serde(default)]
    pub colors: HashMap<ButtonStatus, Color>,

    /// Color of the label text
    #[serde(default = "default_text_color")]
    pub text_color: Color,

    /// Fill color of the hold progress bar
    #[serde(default = "default_progress_color")]
    pub progress_color: Color,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            labels: HashMap::new(),
            colors: HashMap::new(),
            text_color: default_text_color(),
            progress_color: default_progress_color(),
        }
    }
}

impl ButtonStyle {
    pub fn with_label(mut self, status: ButtonStatus, label: impl Into<String>) -> Self {
        self.labels.insert(status, label.into());
        self
    }

    pub fn with_color(mut self, status: ButtonStatus, color: Color) -> Self {
        self.colors.insert(status, color);
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn with_progress_color(mut self, color: Color) -> Self {
        self.progress_color = color;
        self
    }

    /// Label to render for `status`
    pub fn label_for(&self, status: ButtonStatus) -> &str {
        self.labels
            .get(&status)
            .map(String::as_str)
            .or_else(|| default_label(status))
            .unwrap_or(FALLBACK_LABEL)
    }

    /// Background color to render for `status`
    pub fn color_for(&self, status: ButtonStatus) -> Color {
        self.colors
            .get(&status)
            .copied()
            .or_else(|| default_color(status))
            .unwrap_or(FALLBACK_COLOR)
    }
}
