//! hold-button: tap/long-press button state machine
//!
//! The [`button`] module is the embeddable core: a controller that tells
//! taps from long presses, drives a hold progress timer, and reports
//! status changes. The remaining modules serve it to an out-of-process
//! host over a Unix socket:
//! - [`events`]: status events published by the driver
//! - [`ipc`]: length-prefixed JSON protocol and server
//! - [`config`]: daemon configuration
//! - [`lifecycle`]: shutdown signal handling

pub mod button;
pub mod config;
pub mod events;
pub mod ipc;
pub mod lifecycle;
