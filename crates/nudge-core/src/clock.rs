#![forbid(unsafe_code)]

//! Wall-clock seam.
//!
//! Dismissal TTLs and delay deadlines compare epoch-millisecond timestamps.
//! Production code uses [`SystemClock`]; tests substitute a fake.

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock {
    /// Current time, epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock backed by `web-time` (works on wasm targets too).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        web_time::SystemTime::now()
            .duration_since(web_time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z in epoch milliseconds.
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
