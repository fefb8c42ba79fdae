//! The action registry: context → UI element mapping.
//!
//! The registry is the shared heart of the bridge.  Button adapters insert
//! themselves under their current [`ActionContext`]; the incoming dispatch
//! resolves `setImage` commands against it; the runner sweeps it on a full
//! connection reset.
//!
//! # Invariants
//!
//! - At most one entry per exact context tuple (the map key guarantees it).
//! - At most one entry per *handle*: binding a handle under a new context
//!   evicts its previous entry.  Handle identity is `Arc` pointer identity —
//!   the host keeps one `Arc` per UI element, so `Arc::ptr_eq` is exact.
//! - Entries survive reconnects.  A socket drop does not destroy host UI
//!   elements, so the registry keeps its mappings and only their *visual*
//!   state is reset (see [`ActionRegistry::clear_all_images`]).
//!
//! The registry itself is a plain single-threaded map; callers share it as
//! `Arc<Mutex<ActionRegistry>>` because it is touched both from host
//! callbacks and from the bridge task.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::domain::context::ActionContext;
use crate::domain::surface::{ActionSurface, ImageAssignment};

/// Shared handle to one host UI element.
pub type ActionHandle = Arc<dyn ActionSurface>;

/// Mapping from protocol address to UI element.
#[derive(Default)]
pub struct ActionRegistry {
    slots: HashMap<ActionContext, ActionHandle>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handle` under `context`.
    ///
    /// If the same handle is currently bound under a *different* context
    /// (page switch), that stale entry is removed first; the evicted context
    /// is returned so the caller can log it.  A collision with a different
    /// handle under the same context is overwritten — last write wins.
    pub fn bind(&mut self, context: ActionContext, handle: ActionHandle) -> Option<ActionContext> {
        let evicted = self
            .slots
            .iter()
            .find(|(ctx, existing)| **ctx != context && Arc::ptr_eq(existing, &handle))
            .map(|(ctx, _)| ctx.clone());

        if let Some(old) = &evicted {
            self.slots.remove(old);
        }
        self.slots.insert(context, handle);
        evicted
    }

    /// Looks up the handle bound under `context`, if any.
    pub fn lookup(&self, context: &ActionContext) -> Option<ActionHandle> {
        self.slots.get(context).cloned()
    }

    /// Visits every entry belonging to `device_id`.
    ///
    /// Used for device-wide broadcasts: a `setImage` without a position
    /// clears every slot of that device and no others.
    pub fn for_each_on_device(
        &self,
        device_id: &str,
        mut f: impl FnMut(&ActionContext, &ActionHandle),
    ) {
        for (ctx, handle) in &self.slots {
            if ctx.device == device_id {
                f(ctx, handle);
            }
        }
    }

    /// Applies the placeholder to every registered element without removing
    /// any entry.
    ///
    /// Invoked on full connection reset: while disconnected, every managed
    /// element shows the placeholder until the server assigns images again.
    pub fn clear_all_images(&self, placeholder: &Path) {
        for handle in self.slots.values() {
            handle.set_image(ImageAssignment::Placeholder(placeholder.to_path_buf()));
        }
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
