//! The Plaza client: what the presentation layer talks to.
//!
//! Wraps the domain layer with the session-driven lifecycle (sign-in flows,
//! the profile-completion gate, cache clearing on sign-out) plus the input
//! policies the forms enforce (minimum post length, attachment limits) and
//! the attachment upload pipeline.

pub mod client;
pub mod session;
pub mod uploads;

pub use client::{Client, MIN_POST_CONTENT_LEN};
pub use session::SessionState;
pub use uploads::{AttachmentUpload, MAX_ATTACHMENT_BYTES};
