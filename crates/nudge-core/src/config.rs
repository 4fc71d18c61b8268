#![forbid(unsafe_code)]

//! Configuration resolution for externally supplied popup settings.
//!
//! The storefront hands the widget a JSON blob assembled by the theme
//! editor. That blob is untrusted in shape: fields may be missing, numbers
//! may arrive as strings, the whole thing may fail to parse. Resolution is
//! therefore loose and total: a malformed blob falls back to the complete
//! default configuration, and each individually missing or invalid field
//! falls back to its own default. Resolution never fails outward.
//!
//! Range clamping deliberately does *not* happen here. The resolved record
//! preserves what the collaborator asked for; clamping happens at point of
//! use via the `effective_*` accessors, so an out-of-range value in the blob
//! stays observable in logs and debugging.

use serde_json::Value;

/// Upper clamp for the delay trigger, in milliseconds (two minutes).
pub const DELAY_MS_MAX: i64 = 120_000;

/// Inclusive clamp range for the scroll-percent threshold.
pub const SCROLL_PERCENT_MIN: i64 = 1;
/// See [`SCROLL_PERCENT_MIN`].
pub const SCROLL_PERCENT_MAX: i64 = 95;

/// Upper clamp for dismissal persistence, in hours (thirty days).
pub const DISMISS_HOURS_MAX: f64 = 720.0;

/// Which condition opens the popup. Exactly one mode is active per widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    /// Open after a fixed delay.
    #[default]
    Delay,
    /// Open once the page is scrolled past a percentage threshold.
    Scroll,
}

impl TriggerMode {
    /// Stable name used in event payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delay => "delay",
            Self::Scroll => "scroll",
        }
    }
}

/// Normalized popup configuration.
///
/// Constructed once at attachment via [`PopupConfig::resolve`]; immutable
/// for the widget's lifetime. The two trigger fields are mutually
/// irrelevant: `delay_ms` only matters in [`TriggerMode::Delay`],
/// `scroll_percent` only in [`TriggerMode::Scroll`].
#[derive(Debug, Clone, PartialEq)]
pub struct PopupConfig {
    /// Active trigger mode.
    pub trigger: TriggerMode,
    /// Delay before opening, milliseconds. Clamped to `[0, 120000]` at use.
    pub delay_ms: i64,
    /// Scroll threshold, percent. Clamped to `[1, 95]` at use.
    pub scroll_percent: i64,
    /// How long a dismissal suppresses re-triggering, hours. `<= 0` means
    /// dismissal is never persisted.
    pub dismiss_hours: f64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerMode::Delay,
            delay_ms: 4000,
            scroll_percent: 50,
            dismiss_hours: 24.0,
        }
    }
}

impl PopupConfig {
    /// Resolve a raw configuration blob into a normalized record.
    ///
    /// `None` or unparsable input yields the full defaults; a parsed object
    /// is resolved field by field via [`PopupConfig::from_value`].
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                tracing::debug!(%err, "malformed popup config, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve an already-parsed JSON value.
    ///
    /// Non-object values yield the defaults. String-typed numbers are
    /// accepted (the theme editor serializes attribute values as strings).
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = value.as_object() else {
            if !value.is_null() {
                tracing::debug!("popup config is not an object, using defaults");
            }
            return defaults;
        };

        let trigger = obj
            .get("trigger")
            .and_then(Value::as_str)
            .map(|s| {
                if s.trim().eq_ignore_ascii_case("scroll") {
                    TriggerMode::Scroll
                } else {
                    TriggerMode::Delay
                }
            })
            .unwrap_or(defaults.trigger);

        Self {
            trigger,
            delay_ms: coerce_i64(obj.get("delayMs")).unwrap_or(defaults.delay_ms),
            scroll_percent: coerce_i64(obj.get("scrollPercent")).unwrap_or(defaults.scroll_percent),
            dismiss_hours: coerce_f64(obj.get("dismissHours")).unwrap_or(defaults.dismiss_hours),
        }
    }

    // --- Point-of-use clamps ---

    /// Delay clamped to its valid range.
    #[must_use]
    pub fn effective_delay_ms(&self) -> i64 {
        self.delay_ms.clamp(0, DELAY_MS_MAX)
    }

    /// Scroll threshold clamped to its valid range, as a percentage.
    #[must_use]
    pub fn effective_scroll_threshold(&self) -> f64 {
        self.scroll_percent.clamp(SCROLL_PERCENT_MIN, SCROLL_PERCENT_MAX) as f64
    }

    /// Dismissal time-to-live in milliseconds, or `None` when persistence
    /// is disabled (`dismiss_hours <= 0`).
    #[must_use]
    pub fn dismiss_ttl_ms(&self) -> Option<i64> {
        if self.dismiss_hours <= 0.0 {
            return None;
        }
        let hours = self.dismiss_hours.clamp(0.0, DISMISS_HOURS_MAX);
        Some((hours * 3_600_000.0) as i64)
    }
}

/// Coerce a JSON value to an integer: native numbers pass through, numeric
/// strings are parsed, everything else is `None`.
fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

/// Float variant of [`coerce_i64`].
fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
