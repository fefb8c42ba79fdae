//! The WebSocket channel to the OpenDeck server.
//!
//! [`ServerConnection`] owns the single socket for one connection epoch.
//! Its contract is deliberately forgiving:
//!
//! - `send` is best-effort.  A write failure is swallowed into a state
//!   transition (`Degraded` → controlled teardown → `Disconnected`) rather
//!   than propagated; the caller only learns "the connection is gone", not
//!   an error to handle.
//! - `receive` blocks until one text frame arrives or the connection is
//!   lost.  There is no cancellation: the only way to unwind a stuck
//!   receive is a socket-level error.
//!
//! Failure outcomes are explicit tagged results ([`SendOutcome`],
//! [`RecvOutcome`]) instead of error types, because the runner's only
//! decision is retry vs. continue — there is nothing else to match on.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use opendeck_protocol::{codec, OutgoingMessage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── Connection state ──────────────────────────────────────────────────────────

/// Lifecycle state of the server channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket; the runner is idle or cooling down before a retry.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The socket is up; sends go out, receives are serviced.
    Connected,
    /// A read/write/protocol failure was just observed; the channel is
    /// tearing itself down and will land in `Disconnected` immediately.
    Degraded,
}

/// Shared, thread-safe view of the channel state.
///
/// The runner writes it; button adapters read it from host callback context
/// to decide whether an outgoing event is worth queueing at all.  A plain
/// `std::sync::Mutex` (not tokio's) so it can be read without an executor.
#[derive(Debug, Clone)]
pub struct SharedConnectionState(Arc<Mutex<ConnectionState>>);

impl SharedConnectionState {
    /// Creates a state handle starting at `Disconnected`.
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(ConnectionState::Disconnected)))
    }

    /// Reads the current state.
    pub fn get(&self) -> ConnectionState {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set(&self, state: ConnectionState) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

impl Default for SharedConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

// ── Outcome types ─────────────────────────────────────────────────────────────

/// Result of a best-effort send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame went onto the socket.
    Sent,
    /// The connection is gone; the frame was dropped.  The caller should
    /// abandon this epoch.
    Lost,
}

/// Result of a blocking receive.
#[derive(Debug)]
pub enum RecvOutcome {
    /// One complete text frame.
    Frame(String),
    /// The connection is gone.  The caller should abandon this epoch.
    Lost,
}

/// Errors establishing the connection.  Send/receive failures never surface
/// as errors — they collapse into [`SendOutcome::Lost`] / [`RecvOutcome::Lost`].
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The WebSocket handshake to the server failed.
    #[error("failed to connect to OpenDeck at {endpoint}: {source}")]
    Connect {
        endpoint: SocketAddr,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

// ── The channel ───────────────────────────────────────────────────────────────

/// One connection epoch's socket, owned by the bridge runner.
#[derive(Debug)]
pub struct ServerConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    state: SharedConnectionState,
    /// Cleared on the first failure; subsequent sends are silent no-ops.
    healthy: bool,
}

impl ServerConnection {
    /// Opens the WebSocket to the server and flips the shared state to
    /// `Connected`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Connect`] if the TCP connection or the
    /// WebSocket handshake fails; the shared state is left `Disconnected`.
    pub async fn connect(
        endpoint: SocketAddr,
        state: SharedConnectionState,
    ) -> Result<Self, ConnectionError> {
        state.set(ConnectionState::Connecting);

        let url = format!("ws://{endpoint}");
        let (ws, _response) = match connect_async(&url).await {
            Ok(ok) => ok,
            Err(source) => {
                state.set(ConnectionState::Disconnected);
                return Err(ConnectionError::Connect { endpoint, source });
            }
        };

        let (sink, stream) = ws.split();
        state.set(ConnectionState::Connected);

        Ok(Self {
            sink,
            stream,
            state,
            healthy: true,
        })
    }

    /// Encodes and sends one outgoing message, best-effort.
    ///
    /// On a channel that already failed this is a silent no-op returning
    /// [`SendOutcome::Lost`].  A fresh write failure tears the channel down
    /// (state `Degraded` then `Disconnected`) and also returns `Lost`.
    pub async fn send(&mut self, msg: &OutgoingMessage) -> SendOutcome {
        if !self.healthy {
            return SendOutcome::Lost;
        }

        let frame = codec::encode(msg);
        match self.sink.send(Message::Text(frame)).await {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                warn!("send to OpenDeck failed: {e}");
                self.degrade().await;
                SendOutcome::Lost
            }
        }
    }

    /// Waits for the next text frame from the server.
    ///
    /// Non-text frames (ping/pong, binary) are skipped; tungstenite answers
    /// protocol pings internally.  A close frame, EOF, or read error tears
    /// the channel down and yields [`RecvOutcome::Lost`].
    pub async fn receive(&mut self) -> RecvOutcome {
        if !self.healthy {
            return RecvOutcome::Lost;
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(frame))) => return RecvOutcome::Frame(frame),
                Some(Ok(Message::Close(_))) | None => {
                    debug!("OpenDeck closed the connection");
                    self.degrade().await;
                    return RecvOutcome::Lost;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!("receive from OpenDeck failed: {e}");
                    self.degrade().await;
                    return RecvOutcome::Lost;
                }
            }
        }
    }

    /// Controlled teardown: `Degraded` is observable only momentarily — the
    /// channel immediately closes the socket and settles in `Disconnected`.
    async fn degrade(&mut self) {
        self.state.set(ConnectionState::Degraded);
        self.healthy = false;
        let _ = self.sink.close().await;
        self.state.set(ConnectionState::Disconnected);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
