//! The host-side view of one UI element.
//!
//! [`ActionSurface`] is the seam between the bridge and the host's button
//! object model.  The bridge never constructs UI elements; the host hands it
//! trait objects and the bridge reads their live state (serial, page,
//! position) and pushes image updates back.
//!
//! In production the host implements this over its real deck controller
//! objects; tests use `infrastructure::host::mock::RecordingSurface`, which
//! records every image assignment for assertion (the same pattern the rest
//! of the infrastructure uses for its mocks).

use std::path::PathBuf;

/// An image update pushed onto a UI element.
///
/// The bridge does no image decoding beyond base64 extraction — the host's
/// own imaging pipeline turns `Decoded` bytes into a texture, and resolves
/// the placeholder path against the plugin installation directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageAssignment {
    /// Raw image bytes extracted from a `setImage` data URI.
    Decoded(Vec<u8>),
    /// Path to the bundled greyscale placeholder asset.
    Placeholder(PathBuf),
}

/// Host collaborator interface for one UI element.
///
/// The accessors return *live* state: a page switch in the host changes what
/// `active_page` returns, which is how the button adapter notices its
/// context moved.
pub trait ActionSurface: Send + Sync {
    /// Hardware serial number of the deck this element sits on.
    fn device_serial(&self) -> String;

    /// Name of the page this element currently belongs to.
    fn active_page(&self) -> String;

    /// Zero-based key index within the deck's grid.
    fn position(&self) -> u8;

    /// Applies an image (or the placeholder) to the element.
    fn set_image(&self, image: ImageAssignment);
}
