//! The canonical action context: one UI element's protocol address.
//!
//! An [`ActionContext`] is the registry key that incoming `setImage`
//! commands are resolved against.  It is a pure value — device id, active
//! page, controller kind, slot position — recomputed by the button adapter
//! on every lifecycle call and diffed against the previously stored value.
//! That recompute-and-diff is the documented mechanism by which a page
//! switch re-registers a button under its new address; it is not an
//! incidental side effect.

use std::fmt;

use opendeck_protocol::ControllerKind;

/// The protocol address of one UI element.
///
/// Two contexts are the same slot if and only if all four fields match; the
/// `page` field is what makes a button on "Page 1" a different slot from the
/// same physical key on "Page 2".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionContext {
    /// Device identifier (`"sd-" + serial`).
    pub device: String,
    /// Name of the page the element belongs to.
    pub page: String,
    /// Which control surface the element sits on.
    pub controller: ControllerKind,
    /// Zero-based slot index within the surface.
    pub position: u8,
}

impl ActionContext {
    /// Builds the canonical context for a slot.
    ///
    /// This is the single place the key is assembled, so every producer
    /// (button adapter, incoming dispatch) agrees on the exact shape.
    pub fn new(
        device: impl Into<String>,
        page: impl Into<String>,
        controller: ControllerKind,
        position: u8,
    ) -> Self {
        Self {
            device: device.into(),
            page: page.into(),
            controller,
            position,
        }
    }
}

impl fmt::Display for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.device, self.page, self.controller, self.position
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_fields_compare_equal() {
        let a = ActionContext::new("sd-ABC123", "Main", ControllerKind::Keypad, 4);
        let b = ActionContext::new("sd-ABC123", "Main", ControllerKind::Keypad, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_page_change_produces_a_different_context() {
        // The same physical key on a different page is a different slot.
        let a = ActionContext::new("sd-ABC123", "Main", ControllerKind::Keypad, 4);
        let b = ActionContext::new("sd-ABC123", "Media", ControllerKind::Keypad, 4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_controller_kind_distinguishes_contexts() {
        let a = ActionContext::new("sd-X", "Main", ControllerKind::Keypad, 0);
        let b = ActionContext::new("sd-X", "Main", ControllerKind::Encoder, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_includes_all_four_fields() {
        let ctx = ActionContext::new("sd-ABC123", "Main", ControllerKind::Keypad, 4);
        assert_eq!(ctx.to_string(), "(sd-ABC123, Main, Keypad, 4)");
    }
}
