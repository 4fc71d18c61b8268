#![forbid(unsafe_code)]

//! The nudge popup widget: a dismissible, trigger-driven modal overlay.
//!
//! [`Popup`] is the headless controller: it decides when to open (elapsed
//! delay or scroll position, with a scroll-intent fallback for pages that
//! cannot scroll), manages modal accessibility state (focus capture, trap,
//! and restore; scroll locking; Escape-to-close), persists the user's
//! dismissal for a configurable period, and reports the two lifecycle
//! events to a swappable sink.
//!
//! The embedding host supplies a [`Surface`](nudge_core::Surface)
//! implementation and the five element handles, pumps
//! [`Signal`](nudge_core::Signal)s in, and reconciles its listeners against
//! [`Popup::interest`].

pub mod focus;
pub mod popup;

pub use focus::FocusTrap;
pub use popup::{Popup, PopupBuilder};
