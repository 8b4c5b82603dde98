//! Wall-clock effect trait.
//!
//! Operations stamp posts, events, and comments with the current time; they
//! take it from here rather than the ambient clock so tests control it.

use crate::time::Timestamp;
use async_trait::async_trait;

/// Source of the current wall-clock time.
#[async_trait]
pub trait ClockEffects: Send + Sync {
    /// Current wall-clock time.
    async fn now(&self) -> Timestamp;
}
