//! Composite effect bundle.
//!
//! The domain and client layers take a single effects value bounded by the
//! traits they need. [`TestEffects`] implements all of them by delegating
//! to the in-memory handlers, so one value drives a whole test.

use crate::{MemoryDocumentStore, MemoryIdentity, MemoryObjectStore, SteppingClock};
use async_trait::async_trait;
use plaza_core::effects::{
    ClockEffects, Document, DocumentStoreEffects, FieldFilter, IdentityEffects, IdentityError,
    ObjectStoreEffects, ObjectStoreError, OrderBy, Page, PageCursor, StoreError, StoredDocument,
};
use plaza_core::{Timestamp, UserId};
use tokio::sync::watch;

/// All in-memory handlers behind one value.
#[derive(Debug, Default)]
pub struct TestEffects {
    /// The document store handler
    pub documents: MemoryDocumentStore,
    /// The identity provider handler
    pub identity: MemoryIdentity,
    /// The object store handler
    pub objects: MemoryObjectStore,
    /// The clock handler
    pub clock: SteppingClock,
}

impl TestEffects {
    /// Create a bundle of fresh handlers
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStoreEffects for TestEffects {
    async fn allocate_id(&self, collection: &str) -> Result<String, StoreError> {
        self.documents.allocate_id(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.documents.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<(), StoreError> {
        self.documents.set(collection, id, doc).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError> {
        self.documents.update(collection, id, fields).await
    }

    async fn add_child(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        doc: Document,
    ) -> Result<String, StoreError> {
        self.documents.add_child(collection, id, child, doc).await
    }

    async fn query_children(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        filters: &[FieldFilter],
        order: Option<OrderBy>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.documents
            .query_children(collection, id, child, filters, order)
            .await
    }

    async fn delete_child(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        child_id: &str,
    ) -> Result<(), StoreError> {
        self.documents
            .delete_child(collection, id, child, child_id)
            .await
    }

    async fn query_page(
        &self,
        collection: &str,
        order: OrderBy,
        after: Option<&PageCursor>,
        limit: usize,
    ) -> Result<Page, StoreError> {
        self.documents.query_page(collection, order, after, limit).await
    }
}

#[async_trait]
impl IdentityEffects for TestEffects {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId, IdentityError> {
        self.identity.sign_up(email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, IdentityError> {
        self.identity.sign_in(email, password).await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.identity.sign_out().await
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        self.identity.request_password_reset(email).await
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.identity.subscribe()
    }
}

#[async_trait]
impl ObjectStoreEffects for TestEffects {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        self.objects.upload(path, bytes, content_type).await
    }
}

#[async_trait]
impl ClockEffects for TestEffects {
    async fn now(&self) -> Timestamp {
        self.clock.now().await
    }
}
