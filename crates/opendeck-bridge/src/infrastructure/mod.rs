//! Infrastructure layer: sockets, host seams, and the supervised runner.
//!
//! - [`endpoint`] — resolves where the OpenDeck server lives (UDP probe
//!   local-IP discovery, loopback fallback).
//! - [`connection`] — the WebSocket channel for one connection epoch.
//! - [`host`] — traits the embedding host implements, plus a mock host for
//!   tests.
//! - [`runner`] — the background task running the connect/replay/service/
//!   reset state machine forever.

pub mod connection;
pub mod endpoint;
pub mod host;
pub mod runner;

pub use connection::{ConnectionState, ServerConnection, SharedConnectionState};
pub use endpoint::resolve_endpoint;
pub use runner::spawn_bridge;
