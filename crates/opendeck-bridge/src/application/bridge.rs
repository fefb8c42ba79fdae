//! The bridge handle: the API button adapters talk to.
//!
//! Host lifecycle callbacks run on the host's own threads, concurrent with
//! the bridge runner task.  Rather than letting every callback touch the
//! socket, all outgoing traffic is funneled through a bounded channel whose
//! single consumer is the runner — one owner serializes all writes, so
//! frames are never interleaved.
//!
//! Events produced while the channel is not `Connected` are dropped, not
//! queued.  Buffering would change delivery-ordering guarantees on
//! reconnect, and a key press from thirty seconds ago is worse than no key
//! press at all.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info};

use opendeck_protocol::OutgoingMessage;

use crate::domain::config::BridgeConfig;
use crate::domain::context::ActionContext;
use crate::domain::registry::{ActionHandle, ActionRegistry};
use crate::infrastructure::connection::{ConnectionState, SharedConnectionState};

/// Shared entry point for adapters: outgoing events and registry bindings.
///
/// Cheap to clone via `Arc`; one instance is shared by every `DeckButton`.
pub struct BridgeHandle {
    outbox: mpsc::Sender<OutgoingMessage>,
    state: SharedConnectionState,
    registry: Arc<Mutex<ActionRegistry>>,
    config: Arc<BridgeConfig>,
}

impl BridgeHandle {
    pub(crate) fn new(
        outbox: mpsc::Sender<OutgoingMessage>,
        state: SharedConnectionState,
        registry: Arc<Mutex<ActionRegistry>>,
        config: Arc<BridgeConfig>,
    ) -> Self {
        Self {
            outbox,
            state,
            registry,
            config,
        }
    }

    /// Queues an outgoing event, fire-and-forget.
    ///
    /// While the channel is not `Connected` the event is silently dropped —
    /// host button presses during an outage go nowhere by design.  A full
    /// outbox also drops (the runner is wedged or the server is drowning;
    /// either way, blocking a host UI callback is not an option).
    pub fn emit(&self, msg: OutgoingMessage) {
        if self.state.get() != ConnectionState::Connected {
            debug!("dropping outgoing event while disconnected: {msg:?}");
            return;
        }
        if let Err(e) = self.outbox.try_send(msg) {
            debug!("dropping outgoing event, outbox unavailable: {e}");
        }
    }

    /// Binds a UI element under its current context, evicting the element's
    /// previous binding if the context changed.
    pub fn bind_action(&self, context: ActionContext, handle: ActionHandle) {
        let evicted = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bind(context.clone(), handle);

        if let Some(old) = evicted {
            info!("released action binding {old}");
        }
        info!("bound action {context}");
    }

    /// Path to the bundled placeholder image asset.
    pub fn placeholder_image(&self) -> &Path {
        &self.config.placeholder_image
    }

    /// Current state of the server channel.
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::host::mock::RecordingSurface;
    use opendeck_protocol::ControllerKind;

    fn handle_with_capacity(capacity: usize) -> (BridgeHandle, mpsc::Receiver<OutgoingMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = BridgeHandle::new(
            tx,
            SharedConnectionState::new(),
            Arc::new(Mutex::new(ActionRegistry::new())),
            Arc::new(BridgeConfig::default()),
        );
        (handle, rx)
    }

    #[test]
    fn test_emit_while_disconnected_is_a_silent_no_op() {
        // Arrange: state defaults to Disconnected
        let (handle, mut rx) = handle_with_capacity(4);

        // Act
        handle.emit(OutgoingMessage::RerenderImages {
            payload: "sd-X".to_string(),
        });

        // Assert: nothing was queued
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_while_connected_queues_the_event() {
        let (handle, mut rx) = handle_with_capacity(4);
        handle.state.set(ConnectionState::Connected);

        handle.emit(OutgoingMessage::RerenderImages {
            payload: "sd-X".to_string(),
        });

        let queued = rx.try_recv().expect("event must be queued");
        assert!(matches!(queued, OutgoingMessage::RerenderImages { .. }));
    }

    #[test]
    fn test_emit_with_full_outbox_drops_instead_of_blocking() {
        // Arrange: capacity 1, already occupied
        let (handle, mut rx) = handle_with_capacity(1);
        handle.state.set(ConnectionState::Connected);
        handle.emit(OutgoingMessage::RerenderImages {
            payload: "first".to_string(),
        });

        // Act: this one must be dropped, not block the host callback
        handle.emit(OutgoingMessage::RerenderImages {
            payload: "second".to_string(),
        });

        // Assert: only the first event is present
        assert!(matches!(
            rx.try_recv().unwrap(),
            OutgoingMessage::RerenderImages { payload } if payload == "first"
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_bind_action_inserts_into_the_shared_registry() {
        let (handle, _rx) = handle_with_capacity(1);
        let surface = Arc::new(RecordingSurface::new("ABC123", "Main", 4));
        let ctx = ActionContext::new("sd-ABC123", "Main", ControllerKind::Keypad, 4);

        handle.bind_action(ctx.clone(), surface);

        let registry = handle.registry.lock().unwrap();
        assert!(registry.lookup(&ctx).is_some());
    }
}
