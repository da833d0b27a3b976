//! Process lifecycle: shutdown signal handling

mod shutdown;

pub use shutdown::ShutdownSignal;
