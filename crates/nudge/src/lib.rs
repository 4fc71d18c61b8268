#![forbid(unsafe_code)]

//! nudge: a trigger-driven, dismissible popup engine.
//!
//! This umbrella crate re-exports the public API of the workspace:
//!
//! - `nudge::core`: host abstraction, input events, configuration.
//! - `nudge::runtime`: trigger engine, dismissal persistence, event sinks.
//! - `nudge::popup`: the [`Popup`] lifecycle controller and focus trap.
//!
//! # Quick start
//!
//! ```ignore
//! use nudge::{Popup, PopupHandles, Signal};
//!
//! let handles = PopupHandles::from_parts(overlay, dialog, close, cta, dismiss)?;
//! let mut popup = Popup::builder(handles)
//!     .config_json(Some(r#"{"trigger":"scroll","scrollPercent":60}"#))
//!     .instance_id("newsletter")
//!     .attach();
//!
//! // In the host's event loop:
//! popup.handle_signal(&Signal::Scroll, &mut surface);
//! host.reconcile_listeners(popup.interest());
//! ```

pub use nudge_core as core;
pub use nudge_popup as popup;
pub use nudge_runtime as runtime;

pub use nudge_core::{
    AttachError, Clock, HandleKind, KeyCode, KeyEvent, KeyEventKind, Modifiers, NodeId,
    PopupConfig, PopupHandles, ScrollLock, ScrollMetrics, Signal, Surface, SystemClock,
    TriggerMode,
};
pub use nudge_popup::{FocusTrap, Popup, PopupBuilder};
pub use nudge_runtime::{
    CloseReason, DismissalStore, DismissedEvent, EventSink, KvStore, MemoryStore, NoopSink,
    OpenReason, OpenedEvent, RecordingSink, SignalInterest, SinkEvent, StoreError, TracingSink,
    TriggerEngine, storage_key,
};
