//! The supervised bridge loop.
//!
//! One background task runs [`run_bridge`] for the whole process lifetime:
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──handshake──▶ Connected
//!      ▲                                                  │
//!      └──── clear images, reset epoch, cooldown ◀── any failure
//! ```
//!
//! There is no retry cap: the server may simply not be running yet, so every
//! failure is recoverable by waiting and trying again.  On entering
//! `Connected` the loop replays session state (plugin registration, then
//! each live device's registration and current page) before servicing
//! traffic.
//!
//! # Traffic ownership
//!
//! The runner task is the only writer to the socket.  Host-originated events
//! arrive through the outbox channel (see
//! [`crate::application::bridge::BridgeHandle`]) and page changes through
//! their own channel, so all sends are serialized through one owner.
//! Ordering between replay traffic and concurrently-arriving host events is
//! not guaranteed — only that no two frames interleave.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use opendeck_protocol::{codec, IncomingMessage, OutgoingMessage};

use crate::application::bridge::BridgeHandle;
use crate::application::registrar::DeviceRegistrar;
use crate::domain::config::BridgeConfig;
use crate::domain::context::ActionContext;
use crate::domain::device::DeviceDescriptor;
use crate::domain::registry::ActionRegistry;
use crate::domain::surface::ImageAssignment;
use crate::infrastructure::connection::{
    RecvOutcome, SendOutcome, ServerConnection, SharedConnectionState,
};
use crate::infrastructure::endpoint::resolve_endpoint;
use crate::infrastructure::host::{DeckHost, PageChange};

/// Starts the bridge: spawns the background task and returns the handle the
/// host wires into its button adapters.
///
/// `page_rx` is the host's page-change notification stream; closing it
/// merely stops profile-switch replication, it does not stop the bridge.
///
/// The task never finishes on its own; the returned [`JoinHandle`] exists
/// so an embedding host can abort it on plugin unload.
pub fn spawn_bridge(
    host: Arc<dyn DeckHost>,
    config: BridgeConfig,
    page_rx: mpsc::Receiver<PageChange>,
) -> (Arc<BridgeHandle>, JoinHandle<()>) {
    let config = Arc::new(config);
    let registry = Arc::new(Mutex::new(ActionRegistry::new()));
    let state = SharedConnectionState::new();

    // Bounded: a wedged connection must never let host callbacks pile up
    // unbounded memory.  Overflow drops events, which matches the
    // drop-while-disconnected policy.
    let (outbox_tx, outbox_rx) = mpsc::channel(64);

    let handle = Arc::new(BridgeHandle::new(
        outbox_tx,
        state.clone(),
        Arc::clone(&registry),
        Arc::clone(&config),
    ));

    let task = tokio::spawn(run_bridge(
        host, config, registry, state, outbox_rx, page_rx,
    ));

    (handle, task)
}

/// The forever loop: connect, replay, service, reset, cool down, repeat.
async fn run_bridge(
    host: Arc<dyn DeckHost>,
    config: Arc<BridgeConfig>,
    registry: Arc<Mutex<ActionRegistry>>,
    state: SharedConnectionState,
    mut outbox_rx: mpsc::Receiver<OutgoingMessage>,
    mut page_rx: mpsc::Receiver<PageChange>,
) {
    let mut registrar = DeviceRegistrar::new();

    loop {
        let endpoint = resolve_endpoint(&config);
        info!(
            "connecting to OpenDeck at {endpoint} (epoch {})",
            registrar.epoch()
        );

        match ServerConnection::connect(endpoint, state.clone()).await {
            Ok(mut conn) => {
                info!("connected to OpenDeck");

                // Events queued while disconnected are stale host input;
                // they are dropped, never replayed.
                while outbox_rx.try_recv().is_ok() {}

                serve_epoch(
                    &host,
                    &config,
                    &registry,
                    &mut registrar,
                    &mut conn,
                    &mut outbox_rx,
                    &mut page_rx,
                )
                .await;

                warn!("connection to OpenDeck lost");
            }
            Err(e) => {
                warn!("{e}");
            }
        }

        // Full reset: every managed element falls back to the placeholder
        // until the server assigns images again, and every device must be
        // re-announced next epoch.
        registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear_all_images(&config.placeholder_image);
        registrar.reset_epoch();

        tokio::time::sleep(config.reconnect_cooldown).await;
    }
}

/// What woke the service loop up.
enum Wake {
    Inbound(RecvOutcome),
    Outgoing(Option<OutgoingMessage>),
    Page(Option<PageChange>),
}

/// Services one connection epoch; returns when the connection is lost.
async fn serve_epoch(
    host: &Arc<dyn DeckHost>,
    config: &BridgeConfig,
    registry: &Arc<Mutex<ActionRegistry>>,
    registrar: &mut DeviceRegistrar,
    conn: &mut ServerConnection,
    outbox_rx: &mut mpsc::Receiver<OutgoingMessage>,
    page_rx: &mut mpsc::Receiver<PageChange>,
) {
    // ── Replay session state ──────────────────────────────────────────────
    let register = OutgoingMessage::RegisterPlugin {
        uuid: config.plugin_uuid.clone(),
    };
    if conn.send(&register).await == SendOutcome::Lost {
        return;
    }

    for controller in host.controllers().await {
        let outcome = announce_page(
            conn,
            registrar,
            config.register_settle,
            &controller.descriptor,
            &controller.active_page,
        )
        .await;
        if outcome == SendOutcome::Lost {
            return;
        }
    }

    // ── Service traffic until failure ─────────────────────────────────────
    let mut outbox_open = true;
    let mut pages_open = true;

    loop {
        let wake = tokio::select! {
            outcome = conn.receive() => Wake::Inbound(outcome),
            msg = outbox_rx.recv(), if outbox_open => Wake::Outgoing(msg),
            change = page_rx.recv(), if pages_open => Wake::Page(change),
        };

        match wake {
            Wake::Inbound(RecvOutcome::Frame(frame)) => {
                apply_incoming(host.as_ref(), registry, &config.placeholder_image, &frame).await;
            }
            Wake::Inbound(RecvOutcome::Lost) => return,

            Wake::Outgoing(Some(msg)) => {
                if conn.send(&msg).await == SendOutcome::Lost {
                    return;
                }
            }
            Wake::Outgoing(None) => outbox_open = false,

            Wake::Page(Some(change)) => {
                let outcome = announce_page(
                    conn,
                    registrar,
                    config.register_settle,
                    &change.descriptor,
                    &change.page,
                )
                .await;
                if outcome == SendOutcome::Lost {
                    return;
                }
            }
            Wake::Page(None) => pages_open = false,
        }
    }
}

/// Emits `registerDevice` (once per epoch) and `switchProfile` for a device.
///
/// A fresh registration is followed by a settle pause so the server finishes
/// processing it before the profile switch arrives.
async fn announce_page(
    conn: &mut ServerConnection,
    registrar: &mut DeviceRegistrar,
    settle: Duration,
    descriptor: &DeviceDescriptor,
    page: &str,
) -> SendOutcome {
    if registrar.ensure_registered(&descriptor.id) {
        let register = OutgoingMessage::RegisterDevice {
            payload: descriptor.to_device_info(),
        };
        if conn.send(&register).await == SendOutcome::Lost {
            return SendOutcome::Lost;
        }
        info!("registered device {}", descriptor.id);
        tokio::time::sleep(settle).await;
    }

    conn.send(&OutgoingMessage::SwitchProfile {
        device: descriptor.id.clone(),
        profile: page.to_string(),
    })
    .await
}

/// Applies one inbound frame to the registry.
///
/// Every failure mode here is non-fatal: undecodable frames, unknown
/// devices, and unregistered contexts are logged (at most) and skipped —
/// the element the server is addressing may simply not exist yet.
async fn apply_incoming(
    host: &dyn DeckHost,
    registry: &Arc<Mutex<ActionRegistry>>,
    placeholder: &std::path::Path,
    frame: &str,
) {
    let msg = match codec::decode(frame) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("ignoring inbound frame: {e}");
            return;
        }
    };

    let IncomingMessage::SetImage {
        device,
        controller,
        position,
        image,
    } = msg;

    let Some(position) = position else {
        // No position: clear every registered slot of this device.
        registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .for_each_on_device(&device, |_, handle| {
                handle.set_image(ImageAssignment::Placeholder(placeholder.to_path_buf()));
            });
        return;
    };

    // The registry key includes the device's *current* page, which only the
    // host knows.
    let Some(page) = host
        .controllers()
        .await
        .into_iter()
        .find(|c| c.descriptor.id == device)
        .map(|c| c.active_page)
    else {
        debug!("setImage for unknown device {device}; ignoring");
        return;
    };

    let context = ActionContext::new(device, page, controller, position);
    let handle = registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .lookup(&context);
    let Some(handle) = handle else {
        // The element may not exist yet; nothing to update.
        return;
    };

    match image {
        Some(uri) => match codec::decode_image_data_uri(&uri) {
            Ok(bytes) => handle.set_image(ImageAssignment::Decoded(bytes)),
            Err(e) => warn!("setImage with undecodable image payload: {e}"),
        },
        None => handle.set_image(ImageAssignment::Placeholder(placeholder.to_path_buf())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
