#![forbid(unsafe_code)]

//! Lifecycle machinery for the nudge popup engine.
//!
//! Three concerns live here, one module each:
//!
//! - [`trigger`]: the state machine that decides *when* the popup opens
//!   (delay deadline, scroll threshold, scroll-intent fallback), built on
//!   the exactly-once [`arm`] cycle so racing signal sources produce at
//!   most one open transition.
//! - [`dismissal`]: best-effort persistence of the user's dismissal with a
//!   time-to-live, keyed per widget instance.
//! - [`sink`]: the replaceable receiver for the two lifecycle
//!   notifications.
//!
//! The widget controller in `nudge-popup` composes all three.

pub mod arm;
pub mod dismissal;
pub mod sink;
pub mod trigger;

pub use arm::ArmCycle;
pub use dismissal::{
    DEFAULT_INSTANCE_ID, DismissalStore, KvStore, MemoryStore, STORAGE_KEY_PREFIX, StoreError,
    storage_key,
};
pub use sink::{
    CloseReason, DismissedEvent, EventSink, NoopSink, OpenedEvent, RecordingSink, SinkEvent,
    TracingSink,
};
pub use trigger::{OpenReason, SignalInterest, TriggerEngine};
