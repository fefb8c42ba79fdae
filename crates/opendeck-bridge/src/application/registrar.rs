//! Per-epoch device registration bookkeeping.
//!
//! The server must see `registerDevice` exactly once per device per
//! connection epoch, before any event referencing that device.  The
//! registrar tracks which device ids have been announced in the *current*
//! epoch; the set is discarded whenever the connection is lost, so every
//! device is re-announced on reconnect.
//!
//! The registrar is owned exclusively by the bridge runner task — all
//! registration-triggering paths (replay on connect, page-change events)
//! are funneled through that task's channel, so no synchronization is
//! needed here.

/// Tracks which devices have been announced this connection epoch.
#[derive(Debug, Default)]
pub struct DeviceRegistrar {
    known: std::collections::HashSet<String>,
    epoch: u64,
}

impl DeviceRegistrar {
    /// Creates a registrar at epoch 0 with no known devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `device_id` as announced; returns `true` if it was not yet
    /// known this epoch (i.e. the caller must emit `registerDevice` now).
    pub fn ensure_registered(&mut self, device_id: &str) -> bool {
        self.known.insert(device_id.to_string())
    }

    /// Whether `device_id` has been announced this epoch.
    pub fn is_known(&self, device_id: &str) -> bool {
        self.known.contains(device_id)
    }

    /// Starts a new epoch: forgets every known device and bumps the
    /// monotonic epoch counter.
    ///
    /// Called on every connection loss, so the next successful connect
    /// re-announces everything.
    pub fn reset_epoch(&mut self) {
        self.known.clear();
        self.epoch += 1;
    }

    /// The current epoch number.  Increments on every reset; useful in log
    /// lines to correlate registration traffic with a connection attempt.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
