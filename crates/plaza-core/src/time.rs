//! Wall-clock timestamps.
//!
//! Timestamps are epoch milliseconds, matching the representation stored in
//! post, event, and comment documents. Operations never read ambient time;
//! they go through [`crate::effects::ClockEffects`] so tests stay
//! deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// A point in wall-clock time, in milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp {
    ts_ms: u64,
}

impl Timestamp {
    /// Construct from epoch milliseconds
    pub const fn from_millis(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Epoch milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.ts_ms
    }

    /// Calendar year (UTC) this timestamp falls in.
    ///
    /// Used for the profile age display, which the app derives as a plain
    /// calendar-year difference.
    pub fn year(&self) -> i32 {
        OffsetDateTime::from_unix_timestamp((self.ts_ms / 1000) as i64)
            .map(|t| t.year())
            .unwrap_or(1970)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}
