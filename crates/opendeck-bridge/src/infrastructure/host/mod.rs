//! Host collaborator seams.
//!
//! The bridge does not own the deck object model — serial numbers, page
//! names, key layouts all live in the host.  It consumes them through two
//! narrow interfaces:
//!
//! - [`DeckHost`]: enumeration of the currently live device controllers,
//!   used to replay state after every (re)connect.
//! - [`crate::domain::surface::ActionSurface`]: the per-element view
//!   (defined in the domain layer because the registry stores handles).
//!
//! Page-change notifications are not a trait method: the host pushes
//! [`PageChange`] values into an `mpsc` channel handed to `spawn_bridge`,
//! the same channel-pump shape the rest of the infrastructure uses for
//! cross-task events.
//!
//! The [`mock`] module provides in-memory implementations used by unit and
//! integration tests; a production host replaces them with adapters over
//! its real deck manager.

pub mod mock;

use async_trait::async_trait;

use crate::domain::device::DeviceDescriptor;

/// One live device controller: its static descriptor and its current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckController {
    /// Static device attributes.
    pub descriptor: DeviceDescriptor,
    /// Name of the page currently active on this device.
    pub active_page: String,
}

/// A page-change notification from the host.
///
/// Emitted when the active page for a device is set or changed; the bridge
/// answers with `registerDevice` (first time this epoch) and
/// `switchProfile`.
#[derive(Debug, Clone)]
pub struct PageChange {
    /// The device whose page changed.
    pub descriptor: DeviceDescriptor,
    /// The newly active page name.
    pub page: String,
}

/// Host collaborator interface: the deck collection.
///
/// Async because a real host may answer from another process or an event
/// loop of its own; the mock answers immediately.
#[async_trait]
pub trait DeckHost: Send + Sync {
    /// Enumerates all currently live device controllers.
    ///
    /// Called on every (re)connect to replay each device's registration and
    /// current page, and on inbound `setImage` commands to resolve a
    /// device's active page.
    async fn controllers(&self) -> Vec<DeckController>;
}
