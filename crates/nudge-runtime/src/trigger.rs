#![forbid(unsafe_code)]

//! Trigger engine: decides when the popup opens.
//!
//! Exactly one of two mutually exclusive strategies is armed per cycle,
//! chosen from the resolved configuration:
//!
//! - **Delay**: a deadline computed at arm time; the host's tick pump
//!   fires the open transition once the deadline passes.
//! - **Scroll**: scroll signals are checked against a percent threshold;
//!   wheel/touch-move signals act as a substitute trigger on pages where
//!   the threshold is mathematically unsatisfiable, and a one-shot
//!   after-next-frame check catches pages already scrolled past threshold
//!   at load.
//!
//! All firing paths go through a shared [`ArmCycle`], so concurrent signal
//! sources racing to fire resolve to exactly one open transition.
//!
//! # Invariants
//!
//! 1. Arming one strategy never reports interest in the other's signals.
//! 2. At most one fire per arm cycle, regardless of signal interleaving.
//! 3. After fire or disarm, [`interest`](TriggerEngine::interest) is empty
//!    and every signal handler is a no-op.
//!
//! # Failure Modes
//!
//! - On a page whose maximum scroll distance is barely above zero, a wheel
//!   event and the scroll event it produces can both be eligible; whichever
//!   the host delivers first wins. The engine makes no ordering promise.

use nudge_core::config::{PopupConfig, TriggerMode};
use nudge_core::host::ScrollMetrics;

use crate::arm::ArmCycle;

/// Why the open transition fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenReason {
    /// The delay deadline elapsed.
    Delay,
    /// The scroll-percent threshold was met.
    Scroll,
    /// Scroll intent observed on a non-scrollable page.
    ScrollIntentFallback,
    /// Direct external invocation.
    Manual,
}

impl OpenReason {
    /// Stable name used in event payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delay => "delay",
            Self::Scroll => "scroll",
            Self::ScrollIntentFallback => "scroll-intent-fallback",
            Self::Manual => "manual",
        }
    }
}

/// Which global listeners the host should currently have registered.
///
/// The host reconciles against this after every pump: listeners whose flag
/// dropped to `false` are removed, newly-`true` ones are added. Disarming
/// is therefore expressed as interest going empty rather than as explicit
/// unhook calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalInterest {
    /// Timer pump ([`Signal::Tick`](nudge_core::Signal::Tick)).
    pub tick: bool,
    /// Scroll events on the window and nearest scrolling ancestor.
    pub scroll: bool,
    /// Wheel and touch-move events.
    pub intent: bool,
    /// The one-shot after-next-render-frame check.
    pub frame: bool,
    /// Global keyboard events.
    pub key: bool,
}

impl SignalInterest {
    /// No listeners wanted.
    pub const NONE: Self = Self {
        tick: false,
        scroll: false,
        intent: false,
        frame: false,
        key: false,
    };

    /// `true` when no listener is wanted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.tick || self.scroll || self.intent || self.frame || self.key)
    }
}

/// Strategy-specific armed state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Strategy {
    Delay {
        /// Epoch-ms instant at or after which the trigger fires.
        deadline_ms: i64,
    },
    Scroll {
        /// Clamped threshold in percent.
        threshold_percent: f64,
        /// Whether the one-shot initial check is still pending.
        frame_pending: bool,
    },
}

/// The trigger state machine. One instance per arm cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEngine {
    strategy: Option<Strategy>,
    cycle: ArmCycle,
}

impl TriggerEngine {
    /// An engine that was never armed (active dismissal at attach time).
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            strategy: None,
            cycle: ArmCycle::spent(),
        }
    }

    /// Arm the strategy selected by `config`. `now_ms` anchors the delay
    /// deadline.
    #[must_use]
    pub fn armed(config: &PopupConfig, now_ms: i64) -> Self {
        let strategy = match config.trigger {
            TriggerMode::Delay => {
                let deadline_ms = now_ms + config.effective_delay_ms();
                tracing::debug!(deadline_ms, "arming delay trigger");
                Strategy::Delay { deadline_ms }
            }
            TriggerMode::Scroll => {
                let threshold_percent = config.effective_scroll_threshold();
                tracing::debug!(threshold_percent, "arming scroll trigger");
                Strategy::Scroll {
                    threshold_percent,
                    frame_pending: true,
                }
            }
        };
        Self {
            strategy: Some(strategy),
            cycle: ArmCycle::armed(),
        }
    }

    /// Listeners this engine currently wants. Empty once spent.
    #[must_use]
    pub fn interest(&self) -> SignalInterest {
        if !self.cycle.is_armed() {
            return SignalInterest::NONE;
        }
        match self.strategy {
            Some(Strategy::Delay { .. }) => SignalInterest {
                tick: true,
                ..SignalInterest::NONE
            },
            Some(Strategy::Scroll { frame_pending, .. }) => SignalInterest {
                scroll: true,
                intent: true,
                frame: frame_pending,
                ..SignalInterest::NONE
            },
            None => SignalInterest::NONE,
        }
    }

    /// `true` while a strategy is armed and unspent.
    #[inline]
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.cycle.is_armed()
    }

    /// Cancel the pending trigger. Idempotent; no-op if already fired.
    pub fn disarm(&mut self) {
        if self.cycle.is_armed() {
            tracing::debug!("disarming trigger");
        }
        self.cycle.disarm();
    }

    /// Timer pump. Fires the delay strategy once `now_ms` reaches the
    /// deadline.
    pub fn on_tick(&mut self, now_ms: i64) -> Option<OpenReason> {
        let Some(Strategy::Delay { deadline_ms }) = self.strategy else {
            return None;
        };
        if now_ms >= deadline_ms && self.cycle.fire() {
            tracing::debug!(now_ms, deadline_ms, "delay trigger fired");
            return Some(OpenReason::Delay);
        }
        None
    }

    /// A scroll signal arrived; `metrics` were sampled at handling time.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<OpenReason> {
        self.check_threshold(metrics)
    }

    /// The one-shot after-next-render-frame check. Subsequent frame signals
    /// are ignored.
    pub fn on_frame(&mut self, metrics: ScrollMetrics) -> Option<OpenReason> {
        match &mut self.strategy {
            Some(Strategy::Scroll { frame_pending, .. }) if *frame_pending => {
                *frame_pending = false;
            }
            _ => return None,
        }
        self.check_threshold(metrics)
    }

    /// A wheel or touch-move signal arrived.
    ///
    /// Intent only substitutes for scrolling when the page cannot satisfy a
    /// percent threshold at all; on a scrollable page the signal is ignored
    /// and the derived scroll event carries the decision.
    pub fn on_intent(&mut self, metrics: ScrollMetrics) -> Option<OpenReason> {
        let Some(Strategy::Scroll { .. }) = self.strategy else {
            return None;
        };
        if metrics.progress_percent().is_some() {
            return None;
        }
        if self.cycle.fire() {
            tracing::debug!("scroll-intent fallback fired on non-scrollable page");
            return Some(OpenReason::ScrollIntentFallback);
        }
        None
    }

    fn check_threshold(&mut self, metrics: ScrollMetrics) -> Option<OpenReason> {
        let Some(Strategy::Scroll {
            threshold_percent, ..
        }) = self.strategy
        else {
            return None;
        };
        let percent = metrics.progress_percent()?;
        if percent >= threshold_percent && self.cycle.fire() {
            tracing::debug!(percent, threshold_percent, "scroll trigger fired");
            return Some(OpenReason::Scroll);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay_config(delay_ms: i64) -> PopupConfig {
        PopupConfig {
            trigger: TriggerMode::Delay,
            delay_ms,
            ..PopupConfig::default()
        }
    }

    fn scroll_config(scroll_percent: i64) -> PopupConfig {
        PopupConfig {
            trigger: TriggerMode::Scroll,
            scroll_percent,
            ..PopupConfig::default()
        }
    }

    fn scrollable(scroll_top: f64) -> ScrollMetrics {
        ScrollMetrics::new(scroll_top, 2000.0, 1000.0)
    }

    fn unscrollable() -> ScrollMetrics {
        ScrollMetrics::new(0.0, 800.0, 800.0)
    }

    // --- Strategy exclusivity ---

    #[test]
    fn delay_mode_reports_only_tick_interest() {
        let engine = TriggerEngine::armed(&delay_config(3000), 0);
        let interest = engine.interest();
        assert!(interest.tick);
        assert!(!interest.scroll);
        assert!(!interest.intent);
        assert!(!interest.frame);
    }

    #[test]
    fn scroll_mode_reports_scroll_intent_and_frame_interest() {
        let engine = TriggerEngine::armed(&scroll_config(50), 0);
        let interest = engine.interest();
        assert!(!interest.tick);
        assert!(interest.scroll);
        assert!(interest.intent);
        assert!(interest.frame);
    }

    #[test]
    fn scroll_signals_are_ignored_in_delay_mode() {
        let mut engine = TriggerEngine::armed(&delay_config(3000), 0);
        assert_eq!(engine.on_scroll(scrollable(1000.0)), None);
        assert_eq!(engine.on_intent(unscrollable()), None);
        assert_eq!(engine.on_frame(scrollable(1000.0)), None);
        assert!(engine.is_armed());
    }

    #[test]
    fn ticks_are_ignored_in_scroll_mode() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        assert_eq!(engine.on_tick(i64::MAX), None);
        assert!(engine.is_armed());
    }

    // --- Delay strategy ---

    #[test]
    fn delay_fires_at_deadline_never_before() {
        let mut engine = TriggerEngine::armed(&delay_config(3000), 1000);
        assert_eq!(engine.on_tick(1001), None);
        assert_eq!(engine.on_tick(3999), None);
        assert_eq!(engine.on_tick(4000), Some(OpenReason::Delay));
    }

    #[test]
    fn negative_delay_clamps_to_zero() {
        let mut engine = TriggerEngine::armed(&delay_config(-50), 1000);
        assert_eq!(engine.on_tick(1000), Some(OpenReason::Delay));
    }

    #[test]
    fn oversized_delay_clamps_to_two_minutes() {
        let mut engine = TriggerEngine::armed(&delay_config(9_999_999), 0);
        assert_eq!(engine.on_tick(119_999), None);
        assert_eq!(engine.on_tick(120_000), Some(OpenReason::Delay));
    }

    #[test]
    fn delay_fires_once() {
        let mut engine = TriggerEngine::armed(&delay_config(0), 0);
        assert_eq!(engine.on_tick(0), Some(OpenReason::Delay));
        assert_eq!(engine.on_tick(1), None);
        assert!(engine.interest().is_empty());
    }

    // --- Scroll strategy ---

    #[test]
    fn scroll_fires_at_threshold() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        assert_eq!(engine.on_scroll(scrollable(499.0)), None);
        assert_eq!(engine.on_scroll(scrollable(500.0)), Some(OpenReason::Scroll));
    }

    #[test]
    fn scroll_threshold_clamps_low_and_high() {
        // Threshold 0 clamps to 1%.
        let mut engine = TriggerEngine::armed(&scroll_config(0), 0);
        assert_eq!(engine.on_scroll(scrollable(5.0)), None);
        assert_eq!(engine.on_scroll(scrollable(10.0)), Some(OpenReason::Scroll));

        // Threshold 400 clamps to 95%.
        let mut engine = TriggerEngine::armed(&scroll_config(400), 0);
        assert_eq!(engine.on_scroll(scrollable(949.0)), None);
        assert_eq!(engine.on_scroll(scrollable(950.0)), Some(OpenReason::Scroll));
    }

    #[test]
    fn scroll_never_fires_on_unscrollable_page() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        assert_eq!(engine.on_scroll(unscrollable()), None);
        assert!(engine.is_armed());
    }

    #[test]
    fn intent_fires_fallback_on_unscrollable_page() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        assert_eq!(
            engine.on_intent(unscrollable()),
            Some(OpenReason::ScrollIntentFallback)
        );
        assert!(engine.interest().is_empty());
    }

    #[test]
    fn intent_is_ignored_on_scrollable_page() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        assert_eq!(engine.on_intent(scrollable(900.0)), None);
        assert!(engine.is_armed());
    }

    #[test]
    fn frame_check_catches_preloaded_scroll_position() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        assert_eq!(engine.on_frame(scrollable(800.0)), Some(OpenReason::Scroll));
    }

    #[test]
    fn frame_check_runs_once() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        assert_eq!(engine.on_frame(scrollable(100.0)), None);
        assert!(!engine.interest().frame);
        // A second frame signal is ignored even past threshold.
        assert_eq!(engine.on_frame(scrollable(900.0)), None);
        // Scroll signals still work.
        assert_eq!(engine.on_scroll(scrollable(900.0)), Some(OpenReason::Scroll));
    }

    // --- Exactly-once across racing sources ---

    #[test]
    fn first_firing_source_wins() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        assert_eq!(engine.on_scroll(scrollable(600.0)), Some(OpenReason::Scroll));
        // Late-arriving signals are no-ops.
        assert_eq!(engine.on_scroll(scrollable(700.0)), None);
        assert_eq!(engine.on_intent(unscrollable()), None);
        assert_eq!(engine.on_frame(scrollable(700.0)), None);
    }

    // --- Disarm ---

    #[test]
    fn disarm_is_idempotent_and_final() {
        let mut engine = TriggerEngine::armed(&scroll_config(50), 0);
        engine.disarm();
        engine.disarm();
        assert!(!engine.is_armed());
        assert!(engine.interest().is_empty());
        assert_eq!(engine.on_scroll(scrollable(900.0)), None);
    }

    #[test]
    fn disarm_after_fire_is_safe() {
        let mut engine = TriggerEngine::armed(&delay_config(0), 0);
        assert_eq!(engine.on_tick(0), Some(OpenReason::Delay));
        engine.disarm();
        assert_eq!(engine.on_tick(1), None);
    }

    #[test]
    fn idle_engine_ignores_everything() {
        let mut engine = TriggerEngine::idle();
        assert!(!engine.is_armed());
        assert!(engine.interest().is_empty());
        assert_eq!(engine.on_tick(i64::MAX), None);
        assert_eq!(engine.on_scroll(scrollable(2000.0)), None);
        assert_eq!(engine.on_intent(unscrollable()), None);
    }

    // --- Reason strings ---

    #[test]
    fn reason_strings_match_contract() {
        assert_eq!(OpenReason::Delay.as_str(), "delay");
        assert_eq!(OpenReason::Scroll.as_str(), "scroll");
        assert_eq!(
            OpenReason::ScrollIntentFallback.as_str(),
            "scroll-intent-fallback"
        );
        assert_eq!(OpenReason::Manual.as_str(), "manual");
    }
}
