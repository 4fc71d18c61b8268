#![forbid(unsafe_code)]

//! Lifecycle event sinks.
//!
//! The controller reports two notifications: the popup opened, the popup
//! was dismissed. The sink is swappable at attach time so an analytics
//! integration can observe the lifecycle without the controller knowing it
//! exists. Sink calls are fire-and-forget from the controller's
//! perspective; implementations must not panic into the calling transition.

use std::sync::{Arc, Mutex};

use nudge_core::config::TriggerMode;

use crate::trigger::OpenReason;

/// Why the close transition ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The explicit close control.
    Close,
    /// A click on the overlay outside the dialog.
    Overlay,
    /// The secondary ("no thanks") action.
    Secondary,
    /// The primary call-to-action.
    Cta,
    /// The Escape key.
    Escape,
}

impl CloseReason {
    /// Stable name used in event payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Overlay => "overlay",
            Self::Secondary => "secondary",
            Self::Cta => "cta",
            Self::Escape => "escape",
        }
    }
}

/// Payload of the "opened" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenedEvent {
    /// What fired the open transition.
    pub reason: OpenReason,
    /// The configured trigger mode (independent of `reason`: a manual open
    /// still reports the mode the widget was configured with).
    pub trigger_mode: TriggerMode,
}

/// Payload of the "dismissed" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissedEvent {
    /// Which close path ran.
    pub reason: CloseReason,
}

/// Receiver of lifecycle notifications.
pub trait EventSink {
    /// The popup opened.
    fn opened(&mut self, event: &OpenedEvent);

    /// The popup was dismissed.
    fn dismissed(&mut self, event: &DismissedEvent);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn opened(&mut self, _event: &OpenedEvent) {}
    fn dismissed(&mut self, _event: &DismissedEvent) {}
}

/// Default sink: logs lifecycle events at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn opened(&mut self, event: &OpenedEvent) {
        tracing::debug!(
            reason = event.reason.as_str(),
            trigger_mode = event.trigger_mode.as_str(),
            "popup opened"
        );
    }

    fn dismissed(&mut self, event: &DismissedEvent) {
        tracing::debug!(reason = event.reason.as_str(), "popup dismissed");
    }
}

/// One recorded sink call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// An "opened" notification.
    Opened(OpenedEvent),
    /// A "dismissed" notification.
    Dismissed(DismissedEvent),
}

/// Recording sink for tests and host-side assertions.
///
/// Clones share one log, so a handle kept outside the controller observes
/// everything the controller-owned clone records.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in call order.
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl EventSink for RecordingSink {
    fn opened(&mut self, event: &OpenedEvent) {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SinkEvent::Opened(*event));
    }

    fn dismissed(&mut self, event: &DismissedEvent) {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SinkEvent::Dismissed(*event));
    }
}
