//! Effect trait definitions for Plaza's external collaborators.
//!
//! Pure trait definitions: this module defines **what** the external
//! services can do; handlers define **how**. The document store, identity
//! provider, and object store are opaque managed services. Nothing in the
//! client depends on more than these surfaces, and the whole domain layer
//! is parameterized by them, so it runs unchanged against the in-memory
//! handlers in `plaza-testkit`.

pub mod clock;
pub mod documents;
pub mod identity;
pub mod objects;

pub use clock::ClockEffects;
pub use documents::{
    from_document, to_document, Direction, Document, DocumentStoreEffects, FieldFilter, OrderBy,
    Page, PageCursor, StoreError, StoredDocument,
};
pub use identity::{IdentityEffects, IdentityError};
pub use objects::{ObjectStoreEffects, ObjectStoreError};
