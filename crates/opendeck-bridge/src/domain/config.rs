//! Bridge configuration.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! The host builds it once at plugin startup (usually from
//! [`BridgeConfig::default`] plus its installation path for the placeholder
//! asset) and hands it to `spawn_bridge`.
//!
//! Keeping configuration as a plain struct — no global state, no environment
//! reads inside the domain — makes the bridge easy to embed in tests: the
//! integration tests point `server_addr` at a fake server on an ephemeral
//! port and shrink the timing parameters to milliseconds.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use opendeck_protocol::{PLUGIN_UUID, SERVER_PORT};

/// All runtime configuration for the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Fixed server address override.
    ///
    /// When `None`, the endpoint is resolved at each connection attempt:
    /// the local outbound IP is discovered via `probe_addr` and combined
    /// with `server_port`.  Sandboxed deployments (Flatpak) cannot resolve
    /// `localhost` to the host machine, which is why discovery is the
    /// default rather than loopback.
    pub server_addr: Option<SocketAddr>,

    /// Well-known port the OpenDeck server listens on.
    pub server_port: u16,

    /// Plugin identifier announced in `registerPlugin`.
    pub plugin_uuid: String,

    /// Address the transient UDP probe connects to when discovering the
    /// local outbound IP.  No datagram is ever sent; the OS route lookup is
    /// the whole point.
    pub probe_addr: SocketAddr,

    /// How long to wait after a connection failure before retrying.
    pub reconnect_cooldown: Duration,

    /// Pause after emitting `registerDevice`, giving the server time to
    /// finish processing the registration before the `switchProfile` for
    /// that device arrives.
    pub register_settle: Duration,

    /// Path to the bundled greyscale placeholder image, resolved by the
    /// host relative to the plugin installation directory.
    pub placeholder_image: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server_addr: None,
            server_port: SERVER_PORT,
            plugin_uuid: PLUGIN_UUID.to_string(),
            // The probe target only needs to be a routable public address;
            // Google's anycast DNS is the conventional choice.
            probe_addr: "8.8.8.8:80".parse().unwrap(),
            reconnect_cooldown: Duration::from_secs(5),
            register_settle: Duration::from_secs(1),
            placeholder_image: PathBuf::from("greyscale.png"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
