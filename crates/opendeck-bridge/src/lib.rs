//! opendeck-bridge library crate.
//!
//! This crate connects a StreamController-style deck host to an OpenDeck
//! control-surface server: host button lifecycle callbacks flow out as JSON
//! protocol events, and server `setImage` commands flow back onto the host's
//! UI elements.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Deck host (lifecycle callbacks)          OpenDeck server (JSON over WebSocket)
//!         ↕                                         ↕
//! [opendeck-bridge]
//!   ├── domain/           Pure types: config, contexts, devices, the action registry
//!   ├── application/      DeviceRegistrar, BridgeHandle, DeckButton adapter
//!   └── infrastructure/
//!         ├── endpoint/   Local-IP discovery (UDP probe) and endpoint resolution
//!         ├── connection/ WebSocket channel to the server (tokio-tungstenite)
//!         ├── host/       Deck host collaborator traits + mock host
//!         └── runner/     The supervised reconnect loop (bridge state machine)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async; it depends only on `opendeck-protocol`.
//! - `application` depends on `domain` plus the trait seams it is handed.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`.
//!
//! # Embedding
//!
//! The bridge runs inside a host process; there is no binary and no CLI.  The
//! host calls [`infrastructure::runner::spawn_bridge`] once at plugin startup
//! and then constructs one [`application::adapter::DeckButton`] per UI
//! element, forwarding its lifecycle callbacks (`on_ready`, `on_key_down`,
//! `on_key_up`) to the adapter.  The background task reconnects forever on
//! its own; the host never needs to supervise it.

/// Domain layer: pure business-logic types (no I/O).
pub mod domain;

/// Application layer: registrar, outgoing-event handle, and button adapter.
pub mod application;

/// Infrastructure layer: endpoint discovery, WebSocket channel, host seams,
/// and the bridge runner.
pub mod infrastructure;

// Re-export the types a host embedding the bridge actually touches.
pub use application::adapter::DeckButton;
pub use application::bridge::BridgeHandle;
pub use domain::config::BridgeConfig;
pub use domain::device::DeviceDescriptor;
pub use domain::surface::{ActionSurface, ImageAssignment};
pub use infrastructure::connection::ConnectionState;
pub use infrastructure::host::{DeckController, DeckHost, PageChange};
pub use infrastructure::runner::spawn_bridge;
