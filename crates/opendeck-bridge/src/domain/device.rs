//! Device descriptors.
//!
//! A [`DeviceDescriptor`] carries the static attributes the server learns
//! once per connection epoch via `registerDevice`.  Devices have no
//! persistent lifecycle object in the bridge: a descriptor is rebuilt from
//! the host's deck model whenever it is needed, and the per-epoch "already
//! announced" bookkeeping lives in the `DeviceRegistrar`.

use opendeck_protocol::{DeviceInfo, ELGATO_DEVICE_TYPE};

/// Prefix distinguishing bridge-managed device ids in the OpenDeck
/// namespace.
const DEVICE_ID_PREFIX: &str = "sd-";

/// Suffix appended to the deck type so OpenDeck users can tell a bridged
/// device from one plugged into OpenDeck directly.
const DISPLAY_NAME_SUFFIX: &str = " (StreamController)";

/// Static attributes of one physical deck device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Stable identifier, derived from the hardware serial number.
    pub id: String,
    /// Display name shown in the server's device list.
    pub name: String,
    /// Key rows.
    pub rows: u8,
    /// Key columns.
    pub columns: u8,
    /// Rotary encoder count (reported, never driven).
    pub encoders: u8,
}

impl DeviceDescriptor {
    /// Builds a descriptor from the host's deck attributes.
    ///
    /// `deck_type` is the host's human-readable model name
    /// (e.g. `"Stream Deck Original"`).
    pub fn from_serial(
        serial: &str,
        deck_type: &str,
        rows: u8,
        columns: u8,
        encoders: u8,
    ) -> Self {
        Self {
            id: Self::id_for_serial(serial),
            name: format!("{deck_type}{DISPLAY_NAME_SUFFIX}"),
            rows,
            columns,
            encoders,
        }
    }

    /// Derives the stable device id for a hardware serial number.
    ///
    /// The mapping is deterministic so the same physical device always
    /// resolves to the same protocol address, across reconnects and host
    /// restarts.
    pub fn id_for_serial(serial: &str) -> String {
        format!("{DEVICE_ID_PREFIX}{serial}")
    }

    /// Converts the descriptor into the `registerDevice` wire payload.
    pub fn to_device_info(&self) -> DeviceInfo {
        DeviceInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            rows: self.rows,
            columns: self.columns,
            encoders: self.encoders,
            device_type: ELGATO_DEVICE_TYPE,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
