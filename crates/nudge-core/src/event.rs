#![forbid(unsafe_code)]

//! Canonical input and signal types.
//!
//! The host owns the real event loop (timers, scroll/wheel/touch listeners,
//! keyboard). It translates whatever it receives into [`Signal`]s and pushes
//! them to the controller. All types derive `Clone` and `PartialEq` for use
//! in tests and pattern matching.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when the host cannot distinguish
//!   press from repeat.
//! - `Modifiers` use bitflags for easy combination.
//! - Scroll-position data is *not* carried on the signal: the controller
//!   queries [`Surface::scroll_metrics`](crate::host::Surface::scroll_metrics)
//!   at handling time so coalesced or stale events cannot feed it outdated
//!   geometry.

use bitflags::bitflags;

/// A signal pushed by the host into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The page (window or nearest scrolling ancestor) reported a scroll.
    Scroll,

    /// A wheel event was observed. Used as a scroll-intent fallback on
    /// pages where percent-based thresholds cannot be satisfied.
    Wheel,

    /// A touch-move event was observed. Same role as [`Signal::Wheel`].
    TouchMove,

    /// The next render frame after attachment completed. Delivered once;
    /// lets the controller catch pages already scrolled past threshold at
    /// load.
    Frame,

    /// Timer pump. The host delivers this while the controller declares
    /// tick interest; cadence is host-defined.
    Tick,

    /// A keyboard event.
    Key(KeyEvent),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// True for Press and Repeat; the controller treats auto-repeat the
    /// same as a fresh press (holding Tab keeps cycling focus).
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

/// The subset of key codes the controller reacts to, plus a catch-all for
/// printable characters so hosts can forward events unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Escape key.
    Escape,
    /// Tab key (Shift+Tab is expressed via [`Modifiers::SHIFT`]).
    Tab,
    /// Enter/Return key.
    Enter,
    /// A printable character.
    Char(char),
    /// Any other key the host chose to forward.
    Other,
}

/// The kind of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed.
    #[default]
    Press,
    /// Key auto-repeated while held.
    Repeat,
    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE = 0;
        /// Shift key.
        const SHIFT = 1 << 0;
        /// Control key.
        const CTRL = 1 << 1;
        /// Alt/Option key.
        const ALT = 1 << 2;
        /// Meta/Command/Windows key.
        const META = 1 << 3;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_defaults_to_press() {
        let event = KeyEvent::new(KeyCode::Escape);
        assert_eq!(event.kind, KeyEventKind::Press);
        assert_eq!(event.modifiers, Modifiers::NONE);
    }

    #[test]
    fn with_modifiers_sets_shift() {
        let event = KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT);
        assert!(event.shift());
    }

    #[test]
    fn press_and_repeat_are_down() {
        assert!(KeyEvent::new(KeyCode::Tab).is_down());
        assert!(
            KeyEvent::new(KeyCode::Tab)
                .with_kind(KeyEventKind::Repeat)
                .is_down()
        );
        assert!(
            !KeyEvent::new(KeyCode::Tab)
                .with_kind(KeyEventKind::Release)
                .is_down()
        );
    }

    #[test]
    fn modifiers_combine() {
        let mods = Modifiers::SHIFT | Modifiers::CTRL;
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::CTRL));
        assert!(!mods.contains(Modifiers::ALT));
    }

    #[test]
    fn signals_compare_by_value() {
        assert_eq!(Signal::Scroll, Signal::Scroll);
        assert_ne!(Signal::Wheel, Signal::TouchMove);
        assert_eq!(
            Signal::Key(KeyEvent::new(KeyCode::Escape)),
            Signal::Key(KeyEvent::new(KeyCode::Escape))
        );
    }
}
