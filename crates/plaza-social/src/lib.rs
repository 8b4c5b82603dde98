//! Plaza's domain layer: the client-side social state.
//!
//! The remote store holds the truth: post documents, append-only engagement
//! event logs, comment sub-collections, profile documents. This crate keeps
//! a normalized in-memory mirror of the slice the user has seen, and defines
//! the only operations allowed to mutate it:
//!
//! - [`post`]: post records, the original/shared variants, attachments
//! - [`events`]: the engagement event log and its aggregation into
//!   distinct viewer/flagger/sharer sets
//! - [`comments`]: per-post comment lists
//! - [`profile`]: profile documents and partial updates
//! - [`cache`]: the normalized store itself, with two-phase post entries
//! - [`feed`]: cursor pagination over the post collection
//! - [`service`]: the operations, each one remote-write-then-local-merge

pub mod cache;
pub mod comments;
pub mod events;
pub mod feed;
pub mod post;
pub mod profile;
pub mod service;

pub use cache::{PostEntry, SocialCache};
pub use comments::Comment;
pub use events::EngagementEvent;
pub use feed::{FeedPaginator, PageLoad, PAGE_SIZE};
pub use post::{Attachment, Engagement, OriginalPost, Post, PostDoc, SharedPost};
pub use profile::{Profile, ProfileUpdate};
pub use service::{FlagAction, SocialService};
