//! Deterministic in-memory effect handlers for testing Plaza.
//!
//! Each external service gets a faithful in-memory stand-in: a document
//! store with sub-collections, equality-filter queries, and cursor
//! pagination; an identity provider with a session watch channel; an object
//! store; and a stepping clock. [`TestEffects`] bundles them behind one
//! value satisfying every effect bound the domain and client layers take.
//!
//! The document store adds two test-only controls the real service does not
//! have: an offline switch for failure-path tests, and a page-query gate
//! for holding a page fetch in flight while another call races it.

pub mod bundle;
pub mod clock;
pub mod documents;
pub mod identity;
pub mod objects;

pub use bundle::TestEffects;
pub use clock::SteppingClock;
pub use documents::MemoryDocumentStore;
pub use identity::MemoryIdentity;
pub use objects::{MemoryObjectStore, StoredObject};
