//! In-memory host implementations for tests.
//!
//! In production these are replaced by adapters over the host's real deck
//! manager; every test in this crate drives the bridge through them
//! instead of a live deck.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::device::DeviceDescriptor;
use crate::domain::surface::{ActionSurface, ImageAssignment};
use crate::infrastructure::host::{DeckController, DeckHost};

// ── Mock deck host ────────────────────────────────────────────────────────────

/// A deck host with a fixed (but mutable) set of controllers.
#[derive(Default)]
pub struct MockDeckHost {
    controllers: Mutex<Vec<DeckController>>,
}

impl MockDeckHost {
    /// Creates a host with no devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: adds a controller.
    pub fn with_controller(self, descriptor: DeviceDescriptor, active_page: &str) -> Self {
        self.controllers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DeckController {
                descriptor,
                active_page: active_page.to_string(),
            });
        self
    }

    /// Switches the active page of the device with `device_id`.
    pub fn set_active_page(&self, device_id: &str, page: &str) {
        let mut controllers = self
            .controllers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(ctl) = controllers
            .iter_mut()
            .find(|c| c.descriptor.id == device_id)
        {
            ctl.active_page = page.to_string();
        }
    }
}

#[async_trait]
impl DeckHost for MockDeckHost {
    async fn controllers(&self) -> Vec<DeckController> {
        self.controllers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ── Recording surface ─────────────────────────────────────────────────────────

/// An [`ActionSurface`] that records every image assignment.
///
/// Tests assert on [`RecordingSurface::last_image`] (or the full
/// [`RecordingSurface::images`] history) to observe what the bridge pushed
/// onto the element.
pub struct RecordingSurface {
    serial: String,
    page: Mutex<String>,
    position: u8,
    images: Mutex<Vec<ImageAssignment>>,
}

impl RecordingSurface {
    /// Creates a surface on device `serial`, page `page`, at `position`.
    pub fn new(serial: &str, page: &str, position: u8) -> Self {
        Self {
            serial: serial.to_string(),
            page: Mutex::new(page.to_string()),
            position,
            images: Mutex::new(Vec::new()),
        }
    }

    /// Simulates a host-side page switch for this element.
    pub fn set_active_page(&self, page: &str) {
        *self.page.lock().unwrap_or_else(PoisonError::into_inner) = page.to_string();
    }

    /// The most recent image assignment, if any.
    pub fn last_image(&self) -> Option<ImageAssignment> {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Every image assignment in order.
    pub fn images(&self) -> Vec<ImageAssignment> {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ActionSurface for RecordingSurface {
    fn device_serial(&self) -> String {
        self.serial.clone()
    }

    fn active_page(&self) -> String {
        self.page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn position(&self) -> u8 {
        self.position
    }

    fn set_image(&self, image: ImageAssignment) {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(image);
    }
}

/// Convenience: a shared recording surface, the form tests actually use.
pub fn recording_surface(serial: &str, page: &str, position: u8) -> Arc<RecordingSurface> {
    Arc::new(RecordingSurface::new(serial, page, position))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
