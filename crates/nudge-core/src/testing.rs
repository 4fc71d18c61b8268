#![forbid(unsafe_code)]

//! Test doubles for host-facing traits.
//!
//! Enabled with the `test-helpers` feature so downstream crates can drive
//! the controller against a scripted page in their own test suites.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::clock::Clock;
use crate::host::{NodeId, ScrollLock, ScrollMetrics, Surface};

/// Manually advanced clock. Clones share the same instant, so a handle kept
/// by the test keeps steering time after another clone moved into the
/// controller.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    now_ms: Arc<AtomicI64>,
}

impl FakeClock {
    /// Create a clock at `start_ms`.
    #[must_use]
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, ms: i64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Scriptable [`Surface`] that records everything the controller does.
#[derive(Debug, Default)]
pub struct MockSurface {
    /// Currently focused element.
    pub focused: Option<NodeId>,
    /// What `focusable_descendants` returns, regardless of root.
    pub focusables: Vec<NodeId>,
    /// Elements that refuse focus (simulates removed/hidden nodes).
    pub rejects_focus: Vec<NodeId>,
    /// Current scroll geometry.
    pub metrics: ScrollMetrics,
    /// Last value passed to `set_open`.
    pub open: bool,
    /// Outstanding scroll-lock tokens (acquired, not yet released).
    pub active_locks: Vec<u64>,
    /// Total locks ever acquired; doubles as the token counter.
    pub locks_acquired: u64,
}

impl MockSurface {
    /// A surface with no focusables and non-scrollable geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while at least one scroll lock is outstanding.
    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        !self.active_locks.is_empty()
    }
}

impl Surface for MockSurface {
    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn set_focus(&mut self, node: NodeId) -> bool {
        if self.rejects_focus.contains(&node) {
            return false;
        }
        self.focused = Some(node);
        true
    }

    fn focusable_descendants(&self, _root: NodeId) -> Vec<NodeId> {
        self.focusables.clone()
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn lock_scroll(&mut self) -> ScrollLock {
        self.locks_acquired += 1;
        self.active_locks.push(self.locks_acquired);
        ScrollLock::new(self.locks_acquired)
    }

    fn unlock_scroll(&mut self, lock: ScrollLock) {
        self.active_locks.retain(|&token| token != lock.token());
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }
}
