#![forbid(unsafe_code)]

//! Focus trap: keep keyboard focus inside the open dialog.
//!
//! The trap recomputes the set of visible focusable descendants on every
//! keypress (elements can appear or disappear while the dialog is open) and
//! cycles through it in document order, wrapping at both ends.
//!
//! # Invariants
//!
//! 1. Focus never leaves the dialog's focusable set while the trap is
//!    driven: Tab on the last element wraps to the first, Shift+Tab on the
//!    first wraps to the last.
//! 2. With no focusable descendants at all, focus is forced onto the dialog
//!    container itself rather than escaping.
//! 3. Focus currently outside the set (e.g. the element it was on just got
//!    hidden) re-enters at the first element (last when cycling backwards).

use nudge_core::host::{NodeId, Surface};

/// Cycles focus within one dialog region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTrap {
    dialog: NodeId,
}

impl FocusTrap {
    /// Trap focus within `dialog`.
    #[must_use]
    pub const fn new(dialog: NodeId) -> Self {
        Self { dialog }
    }

    /// The trapped region.
    #[must_use]
    pub const fn dialog(&self) -> NodeId {
        self.dialog
    }

    /// Advance focus one step. `backwards` is Shift+Tab.
    ///
    /// Returns the element that received focus.
    pub fn cycle(&self, surface: &mut impl Surface, backwards: bool) -> NodeId {
        let ring = surface.focusable_descendants(self.dialog);
        if ring.is_empty() {
            surface.set_focus(self.dialog);
            return self.dialog;
        }

        let position = surface
            .focused()
            .and_then(|current| ring.iter().position(|&node| node == current));

        let target = match position {
            Some(i) if backwards => ring[(i + ring.len() - 1) % ring.len()],
            Some(i) => ring[(i + 1) % ring.len()],
            // Focus is outside the ring; re-enter at the near end.
            None if backwards => ring[ring.len() - 1],
            None => ring[0],
        };

        surface.set_focus(target);
        target
    }
}
