//! IPC module for daemon-host communication

mod protocol;
mod server;

pub use protocol::{
    DaemonStatus, Notification, PressPhase, Request, Response, MAX_MESSAGE_LEN,
};
pub use server::{read_message, send_message, Server};
