//! Application layer: the bridge's use cases.
//!
//! - [`registrar`] — per-epoch device announcement bookkeeping.
//! - [`bridge`] — the outgoing-event handle shared with button adapters.
//! - [`adapter`] — per-button lifecycle logic driven by host callbacks.

pub mod adapter;
pub mod bridge;
pub mod registrar;

pub use adapter::DeckButton;
pub use bridge::BridgeHandle;
pub use registrar::DeviceRegistrar;
