//! JSON message types for the OpenDeck server protocol.
//!
//! The OpenDeck server speaks JSON text frames over a WebSocket.  Every frame
//! is an object with an `"event"` discriminant.  Serde's
//! `#[serde(tag = "event")]` attribute handles the discriminant automatically;
//! `rename_all = "camelCase"` maps the Rust variant names onto the wire names
//! (`RegisterPlugin` → `"registerPlugin"`).
//!
//! # Why separate outgoing and incoming enums?
//!
//! The two directions carry different information:
//!
//! - The bridge *sends* registration and key events.
//! - The server *sends* image assignment commands.
//!
//! Using two distinct enums makes it a compile-time error to feed a
//! server-only message into the send path, and vice versa.
//!
//! # Shape quirks
//!
//! The protocol is not uniform: `registerDevice`, `rerenderImages`, and the
//! key events nest their data under a `"payload"` key, while `switchProfile`
//! and `setImage` carry top-level fields.  The types below mirror each shape
//! exactly rather than smoothing them over — the server is the source of
//! truth for the wire format.

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Well-known TCP port the OpenDeck server listens on.
pub const SERVER_PORT: u16 = 57116;

/// Plugin identifier announced in `registerPlugin`.
///
/// OpenDeck uses this to distinguish the bridge from the first-party Elgato
/// plugin implementation.
pub const PLUGIN_UUID: &str = "opendeck_alternative_elgato_implementation";

/// Device `type` code reported in `registerDevice`.
///
/// OpenDeck's device taxonomy reserves `0` for Elgato Stream Deck style
/// key-grid devices, which is the only kind the host exposes.
pub const ELGATO_DEVICE_TYPE: u8 = 0;

// ── Outgoing messages (bridge → server) ───────────────────────────────────────

/// All messages the bridge can send to the OpenDeck server.
///
/// # Serde representation
///
/// ```json
/// {"event":"registerPlugin","uuid":"..."}
/// {"event":"registerDevice","payload":{"id":"sd-X","name":"...","rows":3,"columns":5,"encoders":0,"type":0}}
/// {"event":"switchProfile","device":"sd-X","profile":"Page 1"}
/// {"event":"rerenderImages","payload":"sd-X"}
/// {"event":"keyDown","payload":{"device":"sd-X","position":4}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum OutgoingMessage {
    /// Announces the bridge to the server.  Sent exactly once per
    /// connection, immediately after the WebSocket handshake completes.
    RegisterPlugin {
        /// Plugin identifier; always [`PLUGIN_UUID`].
        uuid: String,
    },

    /// Announces a physical device.  Sent once per device per connection
    /// epoch, before any event referencing that device.
    RegisterDevice {
        /// Static device attributes.
        payload: DeviceInfo,
    },

    /// Reports that the active page for a device was set or changed.
    ///
    /// Also replayed for every known device right after `registerPlugin` on
    /// (re)connect, so the server learns the current state of the session.
    SwitchProfile {
        /// Device identifier (`"sd-" + serial`).
        device: String,
        /// Name of the now-active page.
        profile: String,
    },

    /// Asks the server to push current images for a device.  Sent when a
    /// button becomes ready so its slot is painted without waiting for the
    /// next server-side change.
    RerenderImages {
        /// The device identifier whose images should be re-sent.
        payload: String,
    },

    /// A button was pressed.
    KeyDown {
        /// The device and slot of the press.
        payload: KeyPayload,
    },

    /// A button was released.
    KeyUp {
        /// The device and slot of the release.
        payload: KeyPayload,
    },
}

/// Static device attributes carried by `registerDevice`.
///
/// Field order matters only for byte-stable test assertions; the server
/// accepts any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Stable device identifier derived from the hardware serial number.
    pub id: String,
    /// Human-readable label shown in the OpenDeck device list.
    pub name: String,
    /// Number of key rows on the device.
    pub rows: u8,
    /// Number of key columns on the device.
    pub columns: u8,
    /// Number of rotary encoders (dials).  Reported but never driven —
    /// encoder events are out of scope for the bridge.
    pub encoders: u8,
    /// Device taxonomy code; always [`ELGATO_DEVICE_TYPE`].
    ///
    /// `type` is a Rust keyword, hence the serde rename.
    #[serde(rename = "type")]
    pub device_type: u8,
}

/// Payload of `keyDown` / `keyUp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPayload {
    /// Device identifier the key belongs to.
    pub device: String,
    /// Zero-based key index within the device's grid.
    pub position: u8,
}

// ── Incoming messages (server → bridge) ───────────────────────────────────────

/// All messages the OpenDeck server can send to the bridge.
///
/// Anything with an unrecognised `"event"` fails deserialization and is
/// treated by the caller as an ignorable no-op — the server may speak newer
/// message kinds the bridge does not understand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum IncomingMessage {
    /// Assigns (or clears) the image of one slot, or clears a whole device.
    ///
    /// - `position` present, `image` present: paint that slot with the
    ///   decoded data-URI image.
    /// - `position` present, `image` absent: reset that slot to the
    ///   placeholder.
    /// - `position` absent: reset every registered slot of `device` to the
    ///   placeholder.
    SetImage {
        /// Target device identifier.
        device: String,
        /// Which controller surface the slot belongs to.
        controller: ControllerKind,
        /// Zero-based slot index; absent means "whole device".
        #[serde(default)]
        position: Option<u8>,
        /// Image as a base64 data URI; absent means "clear".
        #[serde(default)]
        image: Option<String>,
    },
}

/// The kind of control surface a slot belongs to.
///
/// Serialized in PascalCase on the wire (`"Keypad"`, `"Encoder"`).  The
/// bridge only ever *registers* keypad slots, but the server may address
/// encoders of devices that have them, so both decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    /// The pressable key grid.
    Keypad,
    /// A rotary dial.
    Encoder,
}

impl std::fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerKind::Keypad => write!(f, "Keypad"),
            ControllerKind::Encoder => write!(f, "Encoder"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
