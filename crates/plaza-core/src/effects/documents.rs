//! Document store effect trait.
//!
//! Models the remote document database as an opaque service: JSON documents
//! keyed by store-assigned ids, one level of sub-collections per document,
//! equality-filter queries, and cursor-paginated ordered queries. The
//! surface is what the managed backend actually offers; there are no
//! transactions and no server-side aggregation.

use crate::errors::{PlazaError, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A stored document's field map.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Convert a typed record into its document field map.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(PlazaError::serialization(format!(
            "record serialized to {other:?}, expected an object"
        ))),
    }
}

/// Convert a document field map back into a typed record.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
}

/// Errors reported by the document store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The referenced document does not exist (partial updates and deletes only;
    /// reads report absence as `Ok(None)`)
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection the document was looked up in
        collection: String,
        /// Id of the missing document
        id: String,
    },

    /// The backing service could not be reached or failed the request
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Transport- or service-reported failure
        message: String,
    },

    /// The service rejected the request (malformed filter, stale cursor)
    #[error("store rejected request: {message}")]
    Rejected {
        /// Service-reported rejection reason
        message: String,
    },
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Equality filter on a single document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Field name to test
    pub field: String,
    /// Value the field must equal
    pub value: serde_json::Value,
}

impl FieldFilter {
    /// Filter documents whose `field` equals `value`
    pub fn equals(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest order key first
    Ascending,
    /// Largest order key first
    Descending,
}

/// Ordering clause for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Field holding the order key
    pub field: String,
    /// Sort direction
    pub direction: Direction,
}

impl OrderBy {
    /// Order by `field`, largest first
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Order by `field`, smallest first
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }
}

/// Opaque pagination cursor produced by the store.
///
/// A cursor identifies a position in an ordered query. The store constructs
/// it from the last document of a page so the next page starts strictly
/// after that document even when order keys collide. Callers hold and
/// return cursors; they never inspect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCursor(serde_json::Value);

impl PageCursor {
    /// Wrap a store-defined cursor token
    pub fn new(token: serde_json::Value) -> Self {
        Self(token)
    }

    /// The store-defined token (for handler implementations only)
    pub fn token(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A document together with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Store-assigned document id
    pub id: String,
    /// The document's fields
    pub fields: Document,
}

/// One page of an ordered collection query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Documents in query order
    pub docs: Vec<StoredDocument>,
    /// Cursor positioned after the last document; `None` for an empty page
    pub next_cursor: Option<PageCursor>,
}

/// The remote document database.
#[async_trait]
pub trait DocumentStoreEffects: Send + Sync {
    /// Mint a fresh store-assigned id for a document in `collection`.
    ///
    /// Allocation precedes the first write so a document can embed its own
    /// id in its fields.
    async fn allocate_id(&self, collection: &str) -> std::result::Result<String, StoreError>;

    /// Fetch a document by id. Absence is `Ok(None)`, never an error.
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> std::result::Result<Option<Document>, StoreError>;

    /// Create or replace a document.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> std::result::Result<(), StoreError>;

    /// Merge `fields` into an existing document, leaving other fields
    /// untouched. Fails with [`StoreError::NotFound`] if the document is
    /// absent.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> std::result::Result<(), StoreError>;

    /// Append a document to a sub-collection, returning its assigned id.
    async fn add_child(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        doc: Document,
    ) -> std::result::Result<String, StoreError>;

    /// Query a sub-collection. All `filters` must match (equality only);
    /// `order` sorts the result when given, otherwise the order is
    /// store-defined.
    async fn query_children(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        filters: &[FieldFilter],
        order: Option<OrderBy>,
    ) -> std::result::Result<Vec<StoredDocument>, StoreError>;

    /// Delete one sub-collection document.
    async fn delete_child(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        child_id: &str,
    ) -> std::result::Result<(), StoreError>;

    /// Fetch one ordered page of a collection, starting strictly after
    /// `after` (or from the beginning when `None`), at most `limit`
    /// documents.
    async fn query_page(
        &self,
        collection: &str,
        order: OrderBy,
        after: Option<&PageCursor>,
        limit: usize,
    ) -> std::result::Result<Page, StoreError>;
}
