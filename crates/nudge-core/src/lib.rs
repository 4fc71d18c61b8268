#![forbid(unsafe_code)]

//! Platform-facing primitives for the nudge popup engine.
//!
//! This crate holds everything the higher layers share with the embedding
//! host: the canonical input [`event`] types, the [`host`] abstraction the
//! controller drives (focus, scroll metrics, scroll lock, open/closed
//! presentation), the [`config`] resolver for externally supplied
//! configuration, and a [`clock`] seam so time-dependent behavior is
//! testable.
//!
//! Nothing in this crate renders or owns an event loop. The host pumps
//! [`Signal`]s into the controller; the controller calls back through
//! [`Surface`].

pub mod clock;
pub mod config;
pub mod event;
pub mod host;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use config::{PopupConfig, TriggerMode};
pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers, Signal};
pub use host::{
    AttachError, HandleKind, NodeId, PopupHandles, ScrollLock, ScrollMetrics, Surface,
};
