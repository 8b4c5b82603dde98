//! Deterministic test clock.

use async_trait::async_trait;
use plaza_core::effects::ClockEffects;
use plaza_core::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// A clock that advances by a fixed step on every read, so successive
/// events get distinct, strictly ordered timestamps.
#[derive(Debug)]
pub struct SteppingClock {
    now_ms: AtomicU64,
    step_ms: u64,
}

impl SteppingClock {
    /// Start at `ts_ms`, advancing one second per read
    pub fn starting_at(ts_ms: u64) -> Self {
        Self::with_step(ts_ms, 1_000)
    }

    /// Start at `ts_ms`, advancing `step_ms` per read
    pub fn with_step(ts_ms: u64, step_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(ts_ms),
            step_ms,
        }
    }

    /// Jump the clock to `ts_ms`.
    pub fn set(&self, ts_ms: u64) {
        self.now_ms.store(ts_ms, Ordering::Release);
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        // 2020-09-13T12:26:40Z
        Self::starting_at(1_600_000_000_000)
    }
}

#[async_trait]
impl ClockEffects for SteppingClock {
    async fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now_ms.fetch_add(self.step_ms, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_are_strictly_ordered() {
        let clock = SteppingClock::with_step(1_000, 10);
        let first = clock.now().await;
        let second = clock.now().await;
        assert_eq!(first.as_millis(), 1_000);
        assert_eq!(second.as_millis(), 1_010);
        assert!(second > first);
    }
}
