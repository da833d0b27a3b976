//! Events published by the button driver
//!
//! Serialized as tagged JSON for IPC subscribers.

use serde::{Deserialize, Serialize};

use crate::button::ButtonStatus;

/// Events emitted while a button is mounted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    /// The driver mounted its controller
    Mounted {
        /// Effective status right after mounting
        status: ButtonStatus,
    },

    /// The effective status changed
    StatusChanged {
        status: ButtonStatus,
        previous: ButtonStatus,
    },

    /// The driver stopped and its controller was torn down
    Unmounted,
}

impl std::fmt::Display for StateEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateEvent::Mounted { status } => write!(f, "MOUNTED ({})", status),
            StateEvent::StatusChanged { status, previous } => {
                write!(f, "STATUS_CHANGED ({} -> {})", previous, status)
            }
            StateEvent::Unmounted => write!(f, "UNMOUNTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = StateEvent::StatusChanged {
            status: ButtonStatus::Stop,
            previous: ButtonStatus::Start,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("status_changed"));
        assert!(json.contains(r#""previous":"start""#));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"unmounted"}"#;
        let event: StateEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, StateEvent::Unmounted);
    }

    #[test]
    fn test_event_display() {
        let event = StateEvent::StatusChanged {
            status: ButtonStatus::Ready,
            previous: ButtonStatus::Stop,
        };
        assert_eq!(event.to_string(), "STATUS_CHANGED (stop -> ready)");
    }
}
