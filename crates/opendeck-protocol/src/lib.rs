//! # opendeck-protocol
//!
//! Shared protocol layer for the OpenDeck bridge: the JSON message types
//! exchanged with an OpenDeck server and the codec that encodes/decodes them.
//!
//! This crate has zero dependencies on OS APIs, async runtimes, or network
//! sockets.  It defines:
//!
//! - **`messages`** – The typed shape of every message on the wire.  Outgoing
//!   events (plugin/device registration, profile switches, key presses) and
//!   the incoming `setImage` command are separate enums so it is a
//!   compile-time error to send a message in the wrong direction.
//!
//! - **`codec`** – Encoding to and decoding from JSON text frames, plus the
//!   data-URI base64 extraction used by `setImage` payloads.
//!
//! # Wire format
//!
//! Every message is a JSON object with an `"event"` field naming the message
//! kind.  The remaining shape varies per event (some carry a nested
//! `"payload"` object, some carry top-level fields) — the serde attributes on
//! the message enums reproduce each shape exactly.
//!
//! ```json
//! {"event":"registerPlugin","uuid":"opendeck_alternative_elgato_implementation"}
//! {"event":"keyDown","payload":{"device":"sd-ABC123","position":4}}
//! {"event":"setImage","device":"sd-ABC123","controller":"Keypad","position":4,"image":"data:image/png;base64,..."}
//! ```

pub mod codec;
pub mod messages;

// Re-export the most-used items at the crate root so callers can write
// `opendeck_protocol::OutgoingMessage` instead of the full module path.
pub use codec::{decode, decode_image_data_uri, encode, DecodeError};
pub use messages::{
    ControllerKind, DeviceInfo, IncomingMessage, KeyPayload, OutgoingMessage, ELGATO_DEVICE_TYPE,
    PLUGIN_UUID, SERVER_PORT,
};
