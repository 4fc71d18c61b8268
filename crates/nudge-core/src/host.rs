#![forbid(unsafe_code)]

//! The host abstraction the popup controller drives.
//!
//! The controller is headless: it never touches a page directly. Instead the
//! embedding host implements [`Surface`] and hands the controller a set of
//! [`PopupHandles`] naming the five elements the popup is built from. The
//! controller reads geometry and focus through the trait and mutates
//! presentation state through it.
//!
//! # Invariants
//!
//! 1. **Handles are total**: [`PopupHandles::from_parts`] refuses to build a
//!    handle set with any of the five elements missing. This is the only
//!    fatal initialization error in the engine.
//! 2. **Scroll locks restore, never reset**: [`Surface::lock_scroll`]
//!    captures whatever scroll-suppression state the page had (other code
//!    may also be manipulating it) and [`Surface::unlock_scroll`] restores
//!    that captured state rather than assuming a fixed default.
//! 3. **Focusables are computed live**: [`Surface::focusable_descendants`]
//!    reflects current visibility at call time, not attach time.

use std::fmt;

/// Opaque handle to a host element.
pub type NodeId = u64;

/// Scroll geometry of the page, sampled at signal-handling time.
///
/// Mirrors what browsers report: `scroll_top` is the current offset,
/// `scroll_height` the total content height, `viewport_height` the visible
/// portion. All in the same (host-defined) unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current scroll offset from the top.
    pub scroll_top: f64,
    /// Total scrollable content height.
    pub scroll_height: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Create metrics from raw components.
    #[must_use]
    pub const fn new(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }

    /// Maximum scrollable distance. Zero or negative means the page cannot
    /// be scrolled at all.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        self.scroll_height - self.viewport_height
    }

    /// Scroll progress as a percentage in `[0, 100]`, or `None` when the
    /// page is not scrollable (percent thresholds are meaningless then).
    #[must_use]
    pub fn progress_percent(&self) -> Option<f64> {
        let max = self.max_scroll();
        if max > 0.0 {
            Some((self.scroll_top / max * 100.0).clamp(0.0, 100.0))
        } else {
            None
        }
    }
}

/// Token returned by [`Surface::lock_scroll`].
///
/// The value is host-defined (typically an index into the host's record of
/// prior scroll state) and opaque to the controller. The controller's only
/// obligation is to hand it back to [`Surface::unlock_scroll`] exactly once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a scroll lock leaves the page scroll-locked"]
pub struct ScrollLock(u64);

impl ScrollLock {
    /// Create a lock token. Called by `Surface` implementations only.
    pub const fn new(token: u64) -> Self {
        Self(token)
    }

    /// The host-defined token value.
    #[must_use]
    pub const fn token(&self) -> u64 {
        self.0
    }
}

/// Everything the controller needs from the page.
///
/// Implementations live in the embedding host. All methods are expected to
/// be cheap; the controller calls them from inside signal handling on the
/// single UI thread.
pub trait Surface {
    /// The currently focused element, if any.
    fn focused(&self) -> Option<NodeId>;

    /// Move focus to `node`. Returns `false` if the host no longer accepts
    /// focus on that element (removed, hidden, unfocusable).
    fn set_focus(&mut self, node: NodeId) -> bool;

    /// The *currently visible* focusable descendants of `root`, in document
    /// order. Recomputed on every call.
    fn focusable_descendants(&self, root: NodeId) -> Vec<NodeId>;

    /// Current scroll geometry of the window or nearest scrolling ancestor.
    fn scroll_metrics(&self) -> ScrollMetrics;

    /// Suppress page scrolling, capturing whatever suppression state was
    /// already in place so it can be restored later.
    fn lock_scroll(&mut self) -> ScrollLock;

    /// Restore the scroll state captured by the matching [`lock_scroll`]
    /// call.
    ///
    /// [`lock_scroll`]: Surface::lock_scroll
    fn unlock_scroll(&mut self, lock: ScrollLock);

    /// Flip the popup's presentation state: visual open flag set and
    /// accessibility-hidden flag cleared when `open`, the reverse otherwise.
    fn set_open(&mut self, open: bool);
}

/// Which of the five required elements a handle names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// The full-page overlay behind the dialog.
    Overlay,
    /// The dialog region itself.
    Dialog,
    /// The explicit close control.
    CloseControl,
    /// The primary call-to-action.
    PrimaryAction,
    /// The secondary ("no thanks") action.
    SecondaryAction,
}

impl HandleKind {
    /// Stable name used in error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overlay => "overlay",
            Self::Dialog => "dialog",
            Self::CloseControl => "close-control",
            Self::PrimaryAction => "primary-action",
            Self::SecondaryAction => "secondary-action",
        }
    }
}

/// The five named elements the collaborator wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupHandles {
    /// The full-page overlay behind the dialog.
    pub overlay: NodeId,
    /// The dialog region.
    pub dialog: NodeId,
    /// The explicit close control; also the first-focus target on open.
    pub close: NodeId,
    /// The primary call-to-action.
    pub primary: NodeId,
    /// The secondary action.
    pub secondary: NodeId,
}

impl PopupHandles {
    /// Build a handle set, failing on the first missing element.
    ///
    /// The markup contract guarantees all five are wired; a missing handle
    /// means the widget cannot function and attachment must abort.
    pub fn from_parts(
        overlay: Option<NodeId>,
        dialog: Option<NodeId>,
        close: Option<NodeId>,
        primary: Option<NodeId>,
        secondary: Option<NodeId>,
    ) -> Result<Self, AttachError> {
        Ok(Self {
            overlay: overlay.ok_or(AttachError::MissingHandle(HandleKind::Overlay))?,
            dialog: dialog.ok_or(AttachError::MissingHandle(HandleKind::Dialog))?,
            close: close.ok_or(AttachError::MissingHandle(HandleKind::CloseControl))?,
            primary: primary.ok_or(AttachError::MissingHandle(HandleKind::PrimaryAction))?,
            secondary: secondary.ok_or(AttachError::MissingHandle(HandleKind::SecondaryAction))?,
        })
    }
}

/// Fatal initialization error.
///
/// Everything else the engine encounters (malformed config, storage
/// failures, non-scrollable pages) degrades with a defined fallback; a
/// missing handle is the one condition that aborts attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    /// A required element handle was not supplied.
    MissingHandle(HandleKind),
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHandle(kind) => {
                write!(f, "missing required handle: {}", kind.as_str())
            }
        }
    }
}

impl std::error::Error for AttachError {}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Scroll metrics ---

    #[test]
    fn progress_percent_on_scrollable_page() {
        let metrics = ScrollMetrics::new(500.0, 2000.0, 1000.0);
        assert_eq!(metrics.progress_percent(), Some(50.0));
    }

    #[test]
    fn progress_percent_none_when_not_scrollable() {
        let metrics = ScrollMetrics::new(0.0, 1000.0, 1000.0);
        assert_eq!(metrics.progress_percent(), None);

        // Viewport taller than content also counts as non-scrollable.
        let metrics = ScrollMetrics::new(0.0, 500.0, 1000.0);
        assert_eq!(metrics.progress_percent(), None);
    }

    #[test]
    fn progress_percent_clamps_overscroll() {
        // Rubber-band overscroll can report scroll_top past the maximum.
        let metrics = ScrollMetrics::new(1200.0, 2000.0, 1000.0);
        assert_eq!(metrics.progress_percent(), Some(100.0));

        let metrics = ScrollMetrics::new(-50.0, 2000.0, 1000.0);
        assert_eq!(metrics.progress_percent(), Some(0.0));
    }

    // --- Handles ---

    #[test]
    fn from_parts_accepts_complete_set() {
        let handles = PopupHandles::from_parts(Some(1), Some(2), Some(3), Some(4), Some(5));
        assert!(handles.is_ok());
    }

    #[test]
    fn from_parts_reports_first_missing_handle() {
        let err = PopupHandles::from_parts(Some(1), None, Some(3), None, Some(5)).unwrap_err();
        assert_eq!(err, AttachError::MissingHandle(HandleKind::Dialog));
        assert_eq!(err.to_string(), "missing required handle: dialog");
    }

    #[test]
    fn handle_kind_names_are_stable() {
        assert_eq!(HandleKind::Overlay.as_str(), "overlay");
        assert_eq!(HandleKind::CloseControl.as_str(), "close-control");
        assert_eq!(HandleKind::SecondaryAction.as_str(), "secondary-action");
    }

    #[test]
    fn scroll_lock_round_trips_token() {
        let lock = ScrollLock::new(42);
        assert_eq!(lock.token(), 42);
    }
}
