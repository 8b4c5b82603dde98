//! Cursor pagination over the remote post collection.
//!
//! The paginator holds the position between pages: the opaque cursor of the
//! last fetched document, a terminal flag once the collection is exhausted,
//! and an in-flight flag that admits exactly one page fetch at a time. The
//! in-flight flag is a compare-and-swap, and the admission token releases it
//! on drop, so an error anywhere in a page load leaves the paginator
//! retryable.

use plaza_core::effects::PageCursor;
use std::sync::atomic::{AtomicBool, Ordering};

/// Feed page size.
pub const PAGE_SIZE: usize = 6;

/// Outcome of a `load_posts` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    /// A page was fetched
    Loaded {
        /// Number of documents in the page
        fetched: usize,
    },
    /// Another page fetch was already in flight; nothing was done
    InFlight,
    /// The terminal state had been reached; nothing was done
    Exhausted,
}

/// Pagination state for the feed.
#[derive(Debug, Default)]
pub struct FeedPaginator {
    cursor: parking_lot::Mutex<Option<PageCursor>>,
    exhausted: AtomicBool,
    in_flight: AtomicBool,
}

impl FeedPaginator {
    /// Create a paginator at the start of the feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the terminal "no more posts" state has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    /// Whether a page fetch is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Admit one page fetch. Returns `None` when one is already in flight.
    pub(crate) fn begin(&self) -> Option<PageToken<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PageToken { paginator: self })
    }

    /// The cursor the next page starts after.
    pub(crate) fn cursor(&self) -> Option<PageCursor> {
        self.cursor.lock().clone()
    }

    /// Advance past a fetched page.
    pub(crate) fn advance(&self, cursor: PageCursor) {
        *self.cursor.lock() = Some(cursor);
    }

    /// Enter the terminal state.
    pub(crate) fn mark_exhausted(&self) {
        self.exhausted.store(true, Ordering::Release);
    }

    /// Back to the start of the feed. Used when the session ends.
    pub fn reset(&self) {
        *self.cursor.lock() = None;
        self.exhausted.store(false, Ordering::Release);
    }
}

/// Admission token for one page fetch; releases the in-flight flag on drop.
pub(crate) struct PageToken<'a> {
    paginator: &'a FeedPaginator,
}

impl Drop for PageToken<'_> {
    fn drop(&mut self) {
        self.paginator.in_flight.store(false, Ordering::Release);
    }
}
