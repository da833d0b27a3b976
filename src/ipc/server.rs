//! Unix domain socket server for IPC
//!
//! Forwards host requests to the button driver and pushes status change
//! notifications to subscribed clients.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::button::ButtonHandle;
use crate::events::StateEvent;

use super::protocol::{DaemonStatus, Notification, Request, Response, MAX_MESSAGE_LEN};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    button: ButtonHandle,
    event_tx: broadcast::Sender<StateEvent>,
    shutdown_tx: broadcast::Sender<()>,
    start_time: Instant,
}

/// Per-connection context shared with client handlers
#[derive(Clone)]
struct ClientContext {
    button: ButtonHandle,
    event_tx: broadcast::Sender<StateEvent>,
    start_time: Instant,
}

impl Server {
    /// Create a new IPC server serving `button`, with notifications taken from `event_tx`
    pub fn new(
        socket_path: &Path,
        button: ButtonHandle,
        event_tx: broadcast::Sender<StateEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            button,
            event_tx,
            shutdown_tx,
            start_time: Instant::now(),
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let context = ClientContext {
                        button: self.button.clone(),
                        event_tx: self.event_tx.clone(),
                        start_time: self.start_time,
                    };
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, context) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(stream: UnixStream, context: ClientContext) -> Result<()> {
        let (mut reader, mut writer) = stream.into_split();

        // Frames are read on their own task so a pending notification never
        // interrupts a half-read request
        let (request_tx, mut request_rx) = mpsc::channel::<Result<Request>>(8);
        let reader_task = tokio::spawn(async move {
            loop {
                let request = match read_message::<_, Request>(&mut reader).await {
                    Ok(Some(request)) => Ok(request),
                    Ok(None) => break,
                    Err(e) => Err(e),
                };
                let failed = request.is_err();
                if request_tx.send(request).await.is_err() || failed {
                    break;
                }
            }
        });

        let mut events: Option<broadcast::Receiver<StateEvent>> = None;

        let result = loop {
            tokio::select! {
                request = request_rx.recv() => {
                    let request = match request {
                        Some(Ok(request)) => request,
                        Some(Err(e)) => break Err(e),
                        None => {
                            debug!("client disconnected");
                            break Ok(());
                        }
                    };
                    debug!(?request, "received request");

                    let (response, subscribe) = Self::process_request(request, &context).await;
                    if subscribe && events.is_none() {
                        events = Some(context.event_tx.subscribe());
                        debug!("client subscribed to notifications");
                    }

                    if let Err(e) = send_message(&mut writer, &response).await {
                        break Err(e);
                    }
                }
                event = recv_event(&mut events) => {
                    match event {
                        Ok(event) => {
                            if let Some(notification) = Notification::from_event(&event) {
                                if let Err(e) = send_message(&mut writer, &notification).await {
                                    break Err(e);
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "notification receiver lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            events = None;
                        }
                    }
                }
            }
        };

        reader_task.abort();
        result
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(request: Request, context: &ClientContext) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => match context.button.snapshot().await {
                Ok(button) => {
                    let uptime_secs = context.start_time.elapsed().as_secs();
                    (Response::Status(DaemonStatus::new(button, uptime_secs)), false)
                }
                Err(e) => (driver_error(e), false),
            },

            Request::Subscribe => (Response::Subscribed, true),

            other => match other.input() {
                Some(input) => match context.button.send(input).await {
                    Ok(()) => (Response::Accepted, false),
                    Err(e) => (driver_error(e), false),
                },
                None => (
                    Response::Error {
                        code: "unsupported_request".to_string(),
                        message: format!("{other:?} carries no button input"),
                    },
                    false,
                ),
            },
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

fn driver_error(e: crate::button::DriverError) -> Response {
    error!(?e, "button driver unavailable");
    Response::Error {
        code: "driver_stopped".to_string(),
        message: e.to_string(),
    }
}

/// Wait for the next event, or forever when not subscribed
async fn recv_event(
    events: &mut Option<broadcast::Receiver<StateEvent>>,
) -> Result<StateEvent, broadcast::error::RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Read one length-prefixed JSON message; `None` on a clean disconnect
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    // Read message length (4-byte little-endian)
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_LEN {
        anyhow::bail!("message too large: {len} bytes");
    }

    // Read message body
    let mut msg_buf = vec![0u8; len];
    reader.read_exact(&mut msg_buf).await?;

    let msg = serde_json::from_slice(&msg_buf).context("failed to parse message")?;
    Ok(Some(msg))
}

/// Send a length-prefixed JSON message
pub async fn send_message<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    writer.write_all(&msg_len).await?;
    writer.write_all(&msg_bytes).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::{ButtonConfig, ButtonController, ButtonDriver, ButtonStatus};
    use crate::ipc::PressPhase;

    struct Fixture {
        _dir: tempfile::TempDir,
        socket_path: PathBuf,
        server: std::sync::Arc<Server>,
    }

    fn start_server() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let (event_tx, _) = broadcast::channel(64);
        let controller = ButtonController::new(ButtonConfig::default());
        let (driver, handle) = ButtonDriver::new(controller, event_tx.clone());
        tokio::spawn(driver.run());

        let server = std::sync::Arc::new(Server::new(&socket_path, handle, event_tx).unwrap());
        let running = std::sync::Arc::clone(&server);
        tokio::spawn(async move { running.run().await });

        Fixture {
            _dir: dir,
            socket_path,
            server,
        }
    }

    async fn request(stream: &mut UnixStream, req: &Request) -> serde_json::Value {
        send_message(stream, req).await.unwrap();
        read_message(stream).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let fixture = start_server();
        let mut stream = UnixStream::connect(&fixture.socket_path).await.unwrap();
        let response = request(&mut stream, &Request::Ping).await;
        assert_eq!(response["type"], "pong");
    }

    #[tokio::test]
    async fn test_tap_then_status() {
        let fixture = start_server();
        let mut stream = UnixStream::connect(&fixture.socket_path).await.unwrap();

        let response = request(&mut stream, &Request::Tap).await;
        assert_eq!(response["type"], "accepted");

        let response: Response = {
            send_message(&mut stream, &Request::GetStatus).await.unwrap();
            read_message(&mut stream).await.unwrap().unwrap()
        };
        match response {
            Response::Status(status) => {
                assert_eq!(status.button.status, ButtonStatus::Start);
                assert_eq!(status.button.label, "run");
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quick_press_is_a_tap() {
        let fixture = start_server();
        let mut stream = UnixStream::connect(&fixture.socket_path).await.unwrap();

        for phase in [PressPhase::Started, PressPhase::Ended] {
            let response = request(&mut stream, &Request::Press { phase }).await;
            assert_eq!(response["type"], "accepted");
        }

        let response = request(&mut stream, &Request::GetStatus).await;
        assert_eq!(response["button"]["status"], "start");
    }

    #[tokio::test]
    async fn test_subscriber_receives_status_changes() {
        let fixture = start_server();
        let mut stream = UnixStream::connect(&fixture.socket_path).await.unwrap();

        let response = request(&mut stream, &Request::Subscribe).await;
        assert_eq!(response["type"], "subscribed");

        let response = request(&mut stream, &Request::SetEnabled { enabled: false }).await;
        assert_eq!(response["type"], "accepted");

        let notification: Notification = read_message(&mut stream).await.unwrap().unwrap();
        assert_eq!(
            notification,
            Notification::StatusChanged {
                status: ButtonStatus::Blocked,
                previous: ButtonStatus::Ready,
            }
        );
    }

    #[tokio::test]
    async fn test_shutdown_removes_socket() {
        let fixture = start_server();
        assert!(fixture.socket_path.exists());
        fixture.server.shutdown().await;
        assert!(!fixture.socket_path.exists());
    }
}
