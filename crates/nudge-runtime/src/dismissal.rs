#![forbid(unsafe_code)]

//! Dismissal persistence: remember that the user closed the popup.
//!
//! A dismissal is stored as a JSON record `{"dismissedAt": <epoch-ms>}`
//! under a key derived from the widget's instance identifier, in whatever
//! key-value store the host wires in (browser local storage, a file, an
//! in-memory map in tests). Expiry is purely time-based on the next read;
//! records are never explicitly deleted.
//!
//! Persistence is best-effort in both directions: a read that fails for any
//! reason reports "not dismissed" (fail-open toward showing the popup), and
//! a failed write is logged and swallowed so it can never block the close
//! transition.

use serde::{Deserialize, Serialize};
use std::fmt;

use ahash::AHashMap;
use nudge_core::config::PopupConfig;

/// Fixed prefix for dismissal storage keys.
pub const STORAGE_KEY_PREFIX: &str = "nudge.dismissed.";

/// Instance identifier used when the widget has none of its own.
pub const DEFAULT_INSTANCE_ID: &str = "default";

/// Derive the storage key for a widget instance.
///
/// Blank identifiers fall back to [`DEFAULT_INSTANCE_ID`].
#[must_use]
pub fn storage_key(instance_id: Option<&str>) -> String {
    let id = match instance_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => DEFAULT_INSTANCE_ID,
    };
    format!("{STORAGE_KEY_PREFIX}{id}")
}

/// Error from a key-value store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    reason: String,
}

impl StoreError {
    /// Create an error with a host-supplied reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store write failed: {}", self.reason)
    }
}

impl std::error::Error for StoreError {}

/// Minimal key-value store the host provides for persistence.
///
/// Reads are infallible from the caller's perspective: a store that cannot
/// read should return `None`. Writes may fail (quota, storage disabled);
/// callers treat failure as best-effort.
pub trait KvStore {
    /// Read the value under `key`, if present and readable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store. The default for tests and for hosts that opt out of
/// persistence across sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: AHashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` when nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// The persisted record. Field name is part of the storage contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DismissalRecord {
    #[serde(rename = "dismissedAt", default)]
    dismissed_at: i64,
}

/// Reads and writes the dismissal record for one widget instance.
///
/// Time flows in from the caller (`now_ms`) so the TTL logic is a pure
/// function of its inputs.
#[derive(Debug, Clone)]
pub struct DismissalStore<S: KvStore> {
    key: String,
    ttl_ms: Option<i64>,
    store: S,
}

impl<S: KvStore> DismissalStore<S> {
    /// Build the store for one instance. The TTL comes from the resolved
    /// configuration; `None` (persistence disabled) short-circuits both
    /// reads and writes.
    pub fn new(store: S, instance_id: Option<&str>, config: &PopupConfig) -> Self {
        Self {
            key: storage_key(instance_id),
            ttl_ms: config.dismiss_ttl_ms(),
            store,
        }
    }

    /// The derived storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a dismissal is currently suppressing the trigger.
    ///
    /// `false` when persistence is disabled, when no record exists, when
    /// the record is unparsable or carries a zero/absent timestamp, and
    /// once the TTL has elapsed.
    #[must_use]
    pub fn is_dismissed(&self, now_ms: i64) -> bool {
        let Some(ttl_ms) = self.ttl_ms else {
            return false;
        };
        let Some(raw) = self.store.get(&self.key) else {
            return false;
        };
        let record: DismissalRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(key = %self.key, %err, "unreadable dismissal record, ignoring");
                return false;
            }
        };
        if record.dismissed_at <= 0 {
            return false;
        }
        now_ms - record.dismissed_at < ttl_ms
    }

    /// Record a dismissal at `now_ms`. No-op when persistence is disabled;
    /// write failures are logged and swallowed.
    pub fn mark_dismissed(&mut self, now_ms: i64) {
        if self.ttl_ms.is_none() {
            return;
        }
        let record = DismissalRecord {
            dismissed_at: now_ms,
        };
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(err) => {
                tracing::debug!(%err, "failed to serialize dismissal record");
                return;
            }
        };
        if let Err(err) = self.store.set(&self.key, &json) {
            tracing::debug!(key = %self.key, %err, "dismissal write failed, continuing");
        }
    }

    /// Access the underlying store (host inspection, tests).
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
