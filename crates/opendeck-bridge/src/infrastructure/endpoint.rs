//! Server endpoint resolution.
//!
//! The host often runs inside a sandbox (Flatpak) where `localhost` resolves
//! to the sandbox's own network namespace, not the machine the OpenDeck
//! server runs on.  The workaround is to discover the machine's outbound IP:
//! open a transient UDP socket and `connect` it to a well-known public
//! address.  No datagram is ever sent — UDP `connect` only asks the OS to
//! pick a route, and the socket's local address is the IP we want.
//!
//! Discovery failure is never fatal: the resolver logs it and falls back to
//! loopback, which is correct everywhere except the sandboxed case.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::config::BridgeConfig;

/// Errors during local-IP discovery.  Always recovered internally by
/// falling back to loopback; the type exists so the fallback path has
/// something meaningful to log.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The transient probe socket could not be created.
    #[error("could not open discovery probe socket: {0}")]
    Bind(std::io::Error),
    /// The OS found no route to the probe address.
    #[error("no route to probe address: {0}")]
    NoRoute(std::io::Error),
    /// The socket's local address could not be read back.
    #[error("could not read local address of probe socket: {0}")]
    LocalAddr(std::io::Error),
}

/// Resolves the server endpoint for one connection attempt.
///
/// A configured `server_addr` override wins outright.  Otherwise the local
/// outbound IP is discovered via the UDP probe and combined with the
/// well-known server port; on discovery failure the fallback is loopback.
pub fn resolve_endpoint(config: &BridgeConfig) -> SocketAddr {
    if let Some(addr) = config.server_addr {
        return addr;
    }

    let ip = match discover_local_ip(config.probe_addr) {
        Ok(ip) => {
            debug!("discovered local outbound IP {ip}");
            ip
        }
        Err(e) => {
            warn!("could not discover local IP ({e}); falling back to loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    };

    SocketAddr::new(ip, config.server_port)
}

/// Discovers the local outbound IP by route resolution against `probe`.
fn discover_local_ip(probe: SocketAddr) -> Result<IpAddr, DiscoveryError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(DiscoveryError::Bind)?;
    socket.connect(probe).map_err(DiscoveryError::NoRoute)?;
    let local = socket.local_addr().map_err(DiscoveryError::LocalAddr)?;
    Ok(local.ip())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
