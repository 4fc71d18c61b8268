#![forbid(unsafe_code)]

//! The popup lifecycle controller.
//!
//! [`Popup`] ties the pieces together: the resolved configuration feeds the
//! trigger engine and the dismissal store, the dismissal store gates
//! arming, a trigger fire runs the open transition, and every close path
//! (close control, overlay click, secondary action, CTA, Escape) converges
//! on the one close transition.
//!
//! The controller is headless and push-driven: the host pumps
//! [`Signal`]s via [`Popup::handle_signal`], reconciles its real listeners
//! against [`Popup::interest`] after each pump, and routes click-equivalents
//! on the five handles through [`Popup::activate`].
//!
//! # Invariants
//!
//! 1. A currently-dismissed instance never arms a trigger, and the open
//!    transition re-checks dismissal before proceeding.
//! 2. Open and close transitions are idempotent; a second invocation is an
//!    observable no-op.
//! 3. At most one scroll lock is held at a time; it is re-acquired
//!    idempotently on open and always released on close and on detach.
//! 4. Detachment empties [`Popup::interest`], disarms the trigger, and
//!    releases any held scroll lock regardless of open/closed state.
//!
//! # Example
//!
//! ```ignore
//! let handles = PopupHandles::from_parts(overlay, dialog, close, cta, dismiss)?;
//! let mut popup = Popup::builder(handles)
//!     .config_json(Some(r#"{"trigger":"delay","delayMs":4000}"#))
//!     .instance_id("newsletter")
//!     .sink(MyAnalyticsSink::new())
//!     .attach();
//!
//! // host event loop:
//! popup.handle_signal(&Signal::Tick, &mut surface);
//! host.reconcile_listeners(popup.interest());
//! ```

use nudge_core::clock::{Clock, SystemClock};
use nudge_core::config::PopupConfig;
use nudge_core::event::{KeyCode, KeyEvent, Signal};
use nudge_core::host::{NodeId, PopupHandles, ScrollLock, Surface};
use nudge_runtime::dismissal::{DismissalStore, KvStore, MemoryStore};
use nudge_runtime::sink::{
    CloseReason, DismissedEvent, EventSink, OpenedEvent, TracingSink,
};
use nudge_runtime::trigger::{OpenReason, SignalInterest, TriggerEngine};

use crate::focus::FocusTrap;

/// The trigger-and-lifecycle controller for one popup instance.
///
/// Built via [`Popup::builder`]. Generic over the persistence store and the
/// clock so tests can substitute both; the event sink is type-erased so the
/// analytics integration can be swapped without touching controller code.
pub struct Popup<S: KvStore = MemoryStore, C: Clock = SystemClock> {
    config: PopupConfig,
    handles: PopupHandles,
    trap: FocusTrap,
    dismissal: DismissalStore<S>,
    trigger: TriggerEngine,
    clock: C,
    sink: Box<dyn EventSink>,
    open: bool,
    last_focused: Option<NodeId>,
    scroll_lock: Option<ScrollLock>,
    detached: bool,
}

impl Popup {
    /// Start building a popup for the given handle set.
    #[must_use]
    pub fn builder(handles: PopupHandles) -> PopupBuilder {
        PopupBuilder::new(handles)
    }
}

impl<S: KvStore, C: Clock> Popup<S, C> {
    // --- State queries ---

    /// `true` while the popup is open.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether a persisted dismissal is currently suppressing the trigger.
    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.dismissal.is_dismissed(self.clock.now_ms())
    }

    /// The resolved, immutable configuration.
    #[must_use]
    pub fn config(&self) -> &PopupConfig {
        &self.config
    }

    /// The wired handle set.
    #[must_use]
    pub fn handles(&self) -> &PopupHandles {
        &self.handles
    }

    /// The persistence store backing the dismissal record.
    #[must_use]
    pub fn dismissal_store(&self) -> &S {
        self.dismissal.store()
    }

    /// Listeners the host should currently have registered. Empty after
    /// [`detach`](Popup::detach).
    #[must_use]
    pub fn interest(&self) -> SignalInterest {
        let mut interest = self.trigger.interest();
        interest.key = !self.detached;
        interest
    }

    // --- Signal pump ---

    /// Handle one host signal. No-op after detachment.
    pub fn handle_signal(&mut self, signal: &Signal, surface: &mut impl Surface) {
        if self.detached {
            return;
        }
        match signal {
            Signal::Key(key) => self.handle_key(*key, surface),
            Signal::Tick => {
                let now_ms = self.clock.now_ms();
                if let Some(reason) = self.trigger.on_tick(now_ms) {
                    self.open_with(reason, surface);
                }
            }
            Signal::Scroll => {
                let metrics = surface.scroll_metrics();
                if let Some(reason) = self.trigger.on_scroll(metrics) {
                    self.open_with(reason, surface);
                }
            }
            Signal::Frame => {
                let metrics = surface.scroll_metrics();
                if let Some(reason) = self.trigger.on_frame(metrics) {
                    self.open_with(reason, surface);
                }
            }
            Signal::Wheel | Signal::TouchMove => {
                let metrics = surface.scroll_metrics();
                if let Some(reason) = self.trigger.on_intent(metrics) {
                    self.open_with(reason, surface);
                }
            }
        }
    }

    /// Route a click-equivalent on one of the five handles. Clicks on
    /// anything else are ignored. Active only while open.
    pub fn activate(&mut self, node: NodeId, surface: &mut impl Surface) {
        let reason = if node == self.handles.close {
            CloseReason::Close
        } else if node == self.handles.overlay {
            CloseReason::Overlay
        } else if node == self.handles.primary {
            CloseReason::Cta
        } else if node == self.handles.secondary {
            CloseReason::Secondary
        } else {
            return;
        };
        self.close(reason, surface);
    }

    // --- Transitions ---

    /// Open immediately, bypassing the trigger (reported as `"manual"`).
    pub fn open_now(&mut self, surface: &mut impl Surface) {
        self.open_with(OpenReason::Manual, surface);
    }

    /// The close transition. All close paths converge here; `reason` is the
    /// only difference between them. No-op when already closed.
    pub fn close(&mut self, reason: CloseReason, surface: &mut impl Surface) {
        if !self.open {
            return;
        }
        self.open = false;
        surface.set_open(false);
        self.dismissal.mark_dismissed(self.clock.now_ms());
        if let Some(lock) = self.scroll_lock.take() {
            surface.unlock_scroll(lock);
        }
        self.sink.dismissed(&DismissedEvent { reason });
        if let Some(node) = self.last_focused.take()
            && !surface.set_focus(node)
        {
            tracing::trace!(node, "previous focus target gone, leaving focus in place");
        }
        tracing::debug!(reason = reason.as_str(), "popup closed");
    }

    /// Tear the widget down. Unconditionally drops keyboard interest,
    /// disarms any pending trigger, and releases any held scroll lock, so
    /// no global listener or page lock outlives the widget. Idempotent.
    pub fn detach(&mut self, surface: &mut impl Surface) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.trigger.disarm();
        if let Some(lock) = self.scroll_lock.take() {
            surface.unlock_scroll(lock);
        }
        tracing::debug!("popup detached");
    }

    fn open_with(&mut self, reason: OpenReason, surface: &mut impl Surface) {
        if self.open {
            return;
        }
        // The trigger is never armed for a dismissed instance, but a manual
        // open can arrive while a dismissal is still active.
        if self.is_dismissed() {
            tracing::debug!(reason = reason.as_str(), "open suppressed by active dismissal");
            return;
        }

        self.last_focused = surface.focused();
        surface.set_open(true);
        self.trigger.disarm();

        // Re-acquire idempotently: release any lock still held first.
        if let Some(lock) = self.scroll_lock.take() {
            surface.unlock_scroll(lock);
        }
        self.scroll_lock = Some(surface.lock_scroll());

        surface.set_focus(self.handles.close);
        self.open = true;
        self.sink.opened(&OpenedEvent {
            reason,
            trigger_mode: self.config.trigger,
        });
        tracing::debug!(reason = reason.as_str(), "popup opened");
    }

    fn handle_key(&mut self, key: KeyEvent, surface: &mut impl Surface) {
        if !self.open || !key.is_down() {
            return;
        }
        match key.code {
            KeyCode::Escape => self.close(CloseReason::Escape, surface),
            KeyCode::Tab => {
                self.trap.cycle(surface, key.shift());
            }
            _ => {}
        }
    }
}

/// Builder for [`Popup`]. Defaults: resolved-default configuration, no
/// instance id, in-memory store, system clock, tracing sink.
pub struct PopupBuilder<S: KvStore = MemoryStore, C: Clock = SystemClock> {
    handles: PopupHandles,
    config: PopupConfig,
    instance_id: Option<String>,
    store: S,
    clock: C,
    sink: Box<dyn EventSink>,
}

impl PopupBuilder {
    /// Start from a validated handle set.
    #[must_use]
    pub fn new(handles: PopupHandles) -> Self {
        Self {
            handles,
            config: PopupConfig::default(),
            instance_id: None,
            store: MemoryStore::new(),
            clock: SystemClock,
            sink: Box::new(TracingSink),
        }
    }
}

impl<S: KvStore, C: Clock> PopupBuilder<S, C> {
    /// Use an already-resolved configuration.
    #[must_use]
    pub fn config(mut self, config: PopupConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve configuration from a raw JSON blob (loose parse with
    /// fallbacks; never fails).
    #[must_use]
    pub fn config_json(self, raw: Option<&str>) -> Self {
        let config = PopupConfig::resolve(raw);
        self.config(config)
    }

    /// Set the instance identifier used to derive the dismissal storage
    /// key. Absent or blank falls back to the shared default key.
    #[must_use]
    pub fn instance_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    /// Substitute the persistence store.
    #[must_use]
    pub fn store<S2: KvStore>(self, store: S2) -> PopupBuilder<S2, C> {
        PopupBuilder {
            handles: self.handles,
            config: self.config,
            instance_id: self.instance_id,
            store,
            clock: self.clock,
            sink: self.sink,
        }
    }

    /// Substitute the clock.
    #[must_use]
    pub fn clock<C2: Clock>(self, clock: C2) -> PopupBuilder<S, C2> {
        PopupBuilder {
            handles: self.handles,
            config: self.config,
            instance_id: self.instance_id,
            store: self.store,
            clock,
            sink: self.sink,
        }
    }

    /// Substitute the event sink.
    #[must_use]
    pub fn sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Attach the widget: resolve dismissal state and arm the trigger.
    ///
    /// A currently-dismissed instance comes up with an idle (never-armed)
    /// trigger engine.
    #[must_use]
    pub fn attach(self) -> Popup<S, C> {
        let dismissal = DismissalStore::new(self.store, self.instance_id.as_deref(), &self.config);
        let now_ms = self.clock.now_ms();
        let trigger = if dismissal.is_dismissed(now_ms) {
            tracing::debug!(key = dismissal.key(), "active dismissal, trigger not armed");
            TriggerEngine::idle()
        } else {
            TriggerEngine::armed(&self.config, now_ms)
        };

        Popup {
            trap: FocusTrap::new(self.handles.dialog),
            handles: self.handles,
            config: self.config,
            dismissal,
            trigger,
            clock: self.clock,
            sink: self.sink,
            open: false,
            last_focused: None,
            scroll_lock: None,
            detached: false,
        }
    }
}
