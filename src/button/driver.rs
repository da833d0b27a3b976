//! Async run loop for a button controller
//!
//! One task owns the controller and serializes everything that touches
//! it: host inputs arriving over a channel and the controller's own
//! deadlines. Dropping every [`ButtonHandle`] ends the loop and tears the
//! controller down, so no tick or reset can fire afterwards.

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::events::StateEvent;

use super::controller::{ButtonController, ButtonInput, ButtonSnapshot};

/// Capacity of the command channel feeding the driver
const COMMAND_CAPACITY: usize = 32;

/// Errors returned by [`ButtonHandle`]
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("button driver has stopped")]
    Closed,
}

#[derive(Debug)]
enum Command {
    Input(ButtonInput),
    Snapshot(oneshot::Sender<ButtonSnapshot>),
}

/// Cloneable sender side used by hosts to talk to the driver
#[derive(Debug, Clone)]
pub struct ButtonHandle {
    tx: mpsc::Sender<Command>,
}

impl ButtonHandle {
    /// Forward a host input
    pub async fn send(&self, input: ButtonInput) -> Result<(), DriverError> {
        self.tx
            .send(Command::Input(input))
            .await
            .map_err(|_| DriverError::Closed)
    }

    /// Current render state, after any due deadlines have run
    pub async fn snapshot(&self) -> Result<ButtonSnapshot, DriverError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot(reply_tx))
            .await
            .map_err(|_| DriverError::Closed)?;
        reply_rx.await.map_err(|_| DriverError::Closed)
    }
}

/// Owns a controller and runs it against the tokio clock
pub struct ButtonDriver {
    controller: ButtonController,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<StateEvent>,
}

impl ButtonDriver {
    /// Wrap `controller`, publishing status changes on `event_tx`
    pub fn new(
        mut controller: ButtonController,
        event_tx: broadcast::Sender<StateEvent>,
    ) -> (Self, ButtonHandle) {
        let (tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);

        let status_tx = event_tx.clone();
        let mut previous = controller.effective_status();
        controller.subscribe(move |status| {
            let event = StateEvent::StatusChanged { status, previous };
            debug!(?event, "emitting status event");
            let _ = status_tx.send(event);
            previous = status;
        });

        let driver = Self {
            controller,
            command_rx,
            event_tx,
        };
        (driver, ButtonHandle { tx })
    }

    /// Mount the controller and process commands until every handle is dropped
    pub async fn run(mut self) {
        self.controller.mount();
        info!(status = %self.controller.effective_status(), "button driver started");
        let _ = self.event_tx.send(StateEvent::Mounted {
            status: self.controller.effective_status(),
        });

        loop {
            let deadline = self.controller.next_deadline();
            let wake = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::Input(input)) => {
                        debug!(?input, "button input");
                        self.controller.handle(input, Instant::now());
                    }
                    Some(Command::Snapshot(reply)) => {
                        self.controller.advance(Instant::now());
                        let _ = reply.send(self.controller.snapshot());
                    }
                    None => break,
                },
                _ = wake => {
                    self.controller.advance(Instant::now());
                }
            }
        }

        self.controller.unmount();
        let _ = self.event_tx.send(StateEvent::Unmounted);
        info!("button driver stopped");
    }
}
