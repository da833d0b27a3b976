//! Button status and color types

use serde::{Deserialize, Serialize};

/// The five statuses a hold button can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStatus {
    /// Running, entered by a tap
    Start,
    /// Paused, entered by tapping while running
    Pause,
    /// Stopped by a completed long press
    Stop,
    /// Idle, waiting for input
    Ready,
    /// Computed only: the button is disabled
    Blocked,
}

impl ButtonStatus {
    /// Every status, in declaration order
    pub const ALL: [ButtonStatus; 5] = [
        ButtonStatus::Start,
        ButtonStatus::Pause,
        ButtonStatus::Stop,
        ButtonStatus::Ready,
        ButtonStatus::Blocked,
    ];

    /// Whether the hold-progress indicator may render in this status
    pub fn is_active(self) -> bool {
        matches!(self, ButtonStatus::Start | ButtonStatus::Pause)
    }
}

impl Default for ButtonStatus {
    fn default() -> Self {
        Self::Ready
    }
}

impl std::fmt::Display for ButtonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ButtonStatus::Start => write!(f, "start"),
            ButtonStatus::Pause => write!(f, "pause"),
            ButtonStatus::Stop => write!(f, "stop"),
            ButtonStatus::Ready => write!(f, "ready"),
            ButtonStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// Color handed to the host for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    Mint,
    Teal,
    Cyan,
    Blue,
    Indigo,
    Purple,
    Pink,
    Brown,
    Gray,
    Black,
    White,
    /// Arbitrary sRGB color
    Rgb(u8, u8, u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_statuses() {
        let active: Vec<_> = ButtonStatus::ALL
            .into_iter()
            .filter(|s| s.is_active())
            .collect();
        assert_eq!(active, vec![ButtonStatus::Start, ButtonStatus::Pause]);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ButtonStatus::Blocked).unwrap();
        assert_eq!(json, r#""blocked""#);

        let status: ButtonStatus = serde_json::from_str(r#""pause""#).unwrap();
        assert_eq!(status, ButtonStatus::Pause);
    }

    #[test]
    fn test_rgb_color_deserialization() {
        let color: Color = serde_json::from_str(r#"{"rgb":[10,20,30]}"#).unwrap();
        assert_eq!(color, Color::Rgb(10, 20, 30));
    }
}
