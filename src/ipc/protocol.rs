//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::button::{ButtonInput, ButtonSnapshot, ButtonStatus};
use crate::events::StateEvent;

/// Largest accepted message body
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Pointer phase reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressPhase {
    Started,
    Ended,
    Cancelled,
}

/// Requests from host to daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current daemon status
    GetStatus,

    /// Raw pointer event on the button
    Press { phase: PressPhase },

    /// Tap already recognized by the host
    Tap,

    /// Set or clear the external override
    SetOverride { status: Option<ButtonStatus> },

    /// Enable or disable the button
    SetEnabled { enabled: bool },

    /// Ping to check connectivity
    Ping,

    /// Subscribe to state change notifications
    Subscribe,
}

impl Request {
    /// The button input this request carries, if any
    pub fn input(&self) -> Option<ButtonInput> {
        match *self {
            Request::Press { phase } => Some(match phase {
                PressPhase::Started => ButtonInput::PressStarted,
                PressPhase::Ended => ButtonInput::PressEnded,
                PressPhase::Cancelled => ButtonInput::PressCancelled,
            }),
            Request::Tap => Some(ButtonInput::TapEnded),
            Request::SetOverride { status } => Some(ButtonInput::SetOverride(status)),
            Request::SetEnabled { enabled } => Some(ButtonInput::SetEnabled(enabled)),
            Request::GetStatus | Request::Ping | Request::Subscribe => None,
        }
    }
}

/// Responses from daemon to host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(DaemonStatus),

    /// Input forwarded to the button
    Accepted,

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification from daemon to host (for subscribed clients)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Effective status has changed
    StatusChanged {
        status: ButtonStatus,
        previous: ButtonStatus,
    },
}

impl Notification {
    /// Notification pushed for a driver event, if subscribers care about it
    pub fn from_event(event: &StateEvent) -> Option<Self> {
        match *event {
            StateEvent::StatusChanged { status, previous } => {
                Some(Notification::StatusChanged { status, previous })
            }
            StateEvent::Mounted { .. } | StateEvent::Unmounted => None,
        }
    }
}

/// Full daemon status snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Render state of the button
    pub button: ButtonSnapshot,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl DaemonStatus {
    pub fn new(button: ButtonSnapshot, uptime_secs: u64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            button,
            uptime_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::Press {
            phase: PressPhase::Started,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"type":"press","phase":"started"}"#);
    }

    #[test]
    fn test_override_request_deserialization() {
        let req: Request =
            serde_json::from_str(r#"{"type":"set_override","status":null}"#).unwrap();
        assert_eq!(req.input(), Some(ButtonInput::SetOverride(None)));

        let req: Request =
            serde_json::from_str(r#"{"type":"set_override","status":"pause"}"#).unwrap();
        assert_eq!(
            req.input(),
            Some(ButtonInput::SetOverride(Some(ButtonStatus::Pause)))
        );
    }

    #[test]
    fn test_queries_carry_no_input() {
        assert_eq!(Request::Ping.input(), None);
        assert_eq!(Request::GetStatus.input(), None);
        assert_eq!(Request::Subscribe.input(), None);
    }

    #[test]
    fn test_notification_from_event() {
        let event = StateEvent::StatusChanged {
            status: ButtonStatus::Stop,
            previous: ButtonStatus::Ready,
        };
        let json = serde_json::to_string(&Notification::from_event(&event).unwrap()).unwrap();
        assert!(json.contains("status_changed"));
        assert_eq!(Notification::from_event(&StateEvent::Unmounted), None);
    }
}
