//! The per-button adapter: host lifecycle callbacks in, protocol events out.
//!
//! The host constructs one [`DeckButton`] per UI element it manages and
//! forwards the element's lifecycle callbacks to it.  The adapter does three
//! things, all cheap enough for a UI callback:
//!
//! 1. Recomputes the element's [`ActionContext`] from live host state.
//! 2. Diffs it against the last stored context and rebinds in the registry
//!    only when it changed (this is how page switches re-register buttons).
//! 3. Emits the corresponding protocol event through the [`BridgeHandle`].

use std::sync::{Arc, Mutex, PoisonError};

use opendeck_protocol::{ControllerKind, KeyPayload, OutgoingMessage};

use crate::application::bridge::BridgeHandle;
use crate::domain::context::ActionContext;
use crate::domain::device::DeviceDescriptor;
use crate::domain::registry::ActionHandle;
use crate::domain::surface::ImageAssignment;

/// Direction of a key transition, named after the wire events it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyDirection {
    Down,
    Up,
}

/// Bridge-side logic for one host button.
pub struct DeckButton {
    bridge: Arc<BridgeHandle>,
    surface: ActionHandle,
    /// The context this button was last bound under; `None` until the first
    /// lifecycle call.
    bound: Mutex<Option<ActionContext>>,
}

impl DeckButton {
    /// Wraps one host UI element.
    pub fn new(bridge: Arc<BridgeHandle>, surface: ActionHandle) -> Self {
        Self {
            bridge,
            surface,
            bound: Mutex::new(None),
        }
    }

    /// Host callback: the element finished loading.
    ///
    /// Shows the placeholder until the server assigns a real image, binds
    /// the element, and asks the server to push current images for the
    /// whole device.
    pub fn on_ready(&self) {
        self.surface.set_image(ImageAssignment::Placeholder(
            self.bridge.placeholder_image().to_path_buf(),
        ));
        let context = self.refresh_context();
        self.bridge.emit(OutgoingMessage::RerenderImages {
            payload: context.device,
        });
    }

    /// Host callback: the button was pressed.
    pub fn on_key_down(&self) {
        self.key_event(KeyDirection::Down);
    }

    /// Host callback: the button was released.
    pub fn on_key_up(&self) {
        self.key_event(KeyDirection::Up);
    }

    fn key_event(&self, direction: KeyDirection) {
        // Recompute first: the page may have switched since the last render,
        // and the event must carry the element's current address.
        let context = self.refresh_context();
        let payload = KeyPayload {
            device: context.device,
            position: context.position,
        };
        let msg = match direction {
            KeyDirection::Down => OutgoingMessage::KeyDown { payload },
            KeyDirection::Up => OutgoingMessage::KeyUp { payload },
        };
        self.bridge.emit(msg);
    }

    /// Recomputes this element's canonical context and rebinds it if it
    /// changed.
    ///
    /// Idempotent: when the freshly computed context equals the stored one,
    /// no registry mutation (and no log line) happens.
    fn refresh_context(&self) -> ActionContext {
        let fresh = ActionContext::new(
            DeviceDescriptor::id_for_serial(&self.surface.device_serial()),
            self.surface.active_page(),
            ControllerKind::Keypad,
            self.surface.position(),
        );

        let mut bound = self.bound.lock().unwrap_or_else(PoisonError::into_inner);
        if bound.as_ref() == Some(&fresh) {
            return fresh;
        }

        self.bridge
            .bind_action(fresh.clone(), Arc::clone(&self.surface));
        *bound = Some(fresh.clone());
        fresh
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
