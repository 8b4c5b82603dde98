//! In-memory document store handler for testing.

use async_trait::async_trait;
use plaza_core::effects::{
    Direction, Document, DocumentStoreEffects, FieldFilter, OrderBy, Page, PageCursor, StoreError,
    StoredDocument,
};
use serde_json::Value;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{watch, RwLock};

#[derive(Debug, Default)]
struct StoreState {
    collections: HashMap<String, BTreeMap<String, Document>>,
    children: HashMap<(String, String, String), BTreeMap<String, Document>>,
}

/// In-memory document store.
///
/// Documents are JSON field maps in named collections, each document with
/// one level of named sub-collections. Ordering and cursor semantics match
/// the trait contract: pages are ordered by the requested field with the
/// document id as tiebreak, and a cursor resumes strictly after the
/// document it was minted from.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    state: RwLock<StoreState>,
    offline: AtomicBool,
    page_queries: AtomicUsize,
    child_queries: AtomicUsize,
    page_gate: watch::Sender<bool>,
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (page_gate, _) = watch::channel(false);
        Self {
            state: RwLock::new(StoreState::default()),
            offline: AtomicBool::new(false),
            page_queries: AtomicUsize::new(0),
            child_queries: AtomicUsize::new(0),
            page_gate,
        }
    }

    /// Make every operation fail with [`StoreError::Unavailable`] until
    /// switched back. For failure-path tests.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    /// Hold page queries at a gate until [`Self::release_page_queries`].
    ///
    /// Lets a test keep one page fetch in flight while it drives a second,
    /// racing call.
    pub fn hold_page_queries(&self) {
        self.page_gate.send_replace(true);
    }

    /// Release page queries held by [`Self::hold_page_queries`].
    pub fn release_page_queries(&self) {
        self.page_gate.send_replace(false);
    }

    /// How many page queries have been issued.
    pub fn page_query_count(&self) -> usize {
        self.page_queries.load(Ordering::Acquire)
    }

    /// How many sub-collection queries have been issued.
    pub fn child_query_count(&self) -> usize {
        self.child_queries.load(Ordering::Acquire)
    }

    /// Number of documents in a sub-collection.
    pub async fn child_count(&self, collection: &str, id: &str, child: &str) -> usize {
        let state = self.state.read().await;
        state
            .children
            .get(&child_key(collection, id, child))
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::Acquire) {
            Err(StoreError::unavailable("store is offline (test)"))
        } else {
            Ok(())
        }
    }

    async fn wait_page_gate(&self) {
        let mut gate = self.page_gate.subscribe();
        while *gate.borrow() {
            if gate.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn child_key(collection: &str, id: &str, child: &str) -> (String, String, String) {
    (collection.to_string(), id.to_string(), child.to_string())
}

fn compare_values(a: &Value, b: &Value) -> CmpOrdering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(CmpOrdering::Equal),
            _ => CmpOrdering::Equal,
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => CmpOrdering::Equal,
    }
}

/// Position-order comparison: ascending or descending by order key, with
/// the document id as tiebreak in the same direction.
fn compare_in_order(
    key_a: &Value,
    id_a: &str,
    key_b: &Value,
    id_b: &str,
    direction: Direction,
) -> CmpOrdering {
    let ord = compare_values(key_a, key_b).then_with(|| id_a.cmp(id_b));
    match direction {
        Direction::Ascending => ord,
        Direction::Descending => ord.reverse(),
    }
}

fn matches_filters(doc: &Document, filters: &[FieldFilter]) -> bool {
    filters
        .iter()
        .all(|filter| doc.get(&filter.field) == Some(&filter.value))
}

#[async_trait]
impl DocumentStoreEffects for MemoryDocumentStore {
    async fn allocate_id(&self, _collection: &str) -> Result<String, StoreError> {
        self.ensure_online()?;
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let doc = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        for (field, value) in fields {
            doc.insert(field, value);
        }
        Ok(())
    }

    async fn add_child(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        doc: Document,
    ) -> Result<String, StoreError> {
        self.ensure_online()?;
        let child_id = uuid::Uuid::new_v4().to_string();
        let mut state = self.state.write().await;
        state
            .children
            .entry(child_key(collection, id, child))
            .or_default()
            .insert(child_id.clone(), doc);
        Ok(child_id)
    }

    async fn query_children(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        filters: &[FieldFilter],
        order: Option<OrderBy>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.ensure_online()?;
        self.child_queries.fetch_add(1, Ordering::AcqRel);
        let state = self.state.read().await;
        let mut docs: Vec<StoredDocument> = state
            .children
            .get(&child_key(collection, id, child))
            .map(|children| {
                children
                    .iter()
                    .filter(|(_, doc)| matches_filters(doc, filters))
                    .map(|(child_id, doc)| StoredDocument {
                        id: child_id.clone(),
                        fields: doc.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            docs.sort_by(|a, b| {
                let key_a = a.fields.get(&order.field).cloned().unwrap_or(Value::Null);
                let key_b = b.fields.get(&order.field).cloned().unwrap_or(Value::Null);
                compare_in_order(&key_a, &a.id, &key_b, &b.id, order.direction)
            });
        }
        Ok(docs)
    }

    async fn delete_child(
        &self,
        collection: &str,
        id: &str,
        child: &str,
        child_id: &str,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let children = state
            .children
            .get_mut(&child_key(collection, id, child))
            .ok_or_else(|| StoreError::not_found(child, child_id))?;
        children
            .remove(child_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(child, child_id))
    }

    async fn query_page(
        &self,
        collection: &str,
        order: OrderBy,
        after: Option<&PageCursor>,
        limit: usize,
    ) -> Result<Page, StoreError> {
        self.ensure_online()?;
        self.page_queries.fetch_add(1, Ordering::AcqRel);
        self.wait_page_gate().await;

        let state = self.state.read().await;
        let mut docs: Vec<StoredDocument> = state
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| StoredDocument {
                        id: id.clone(),
                        fields: doc.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        drop(state);

        docs.sort_by(|a, b| {
            let key_a = a.fields.get(&order.field).cloned().unwrap_or(Value::Null);
            let key_b = b.fields.get(&order.field).cloned().unwrap_or(Value::Null);
            compare_in_order(&key_a, &a.id, &key_b, &b.id, order.direction)
        });

        let start = match after {
            None => 0,
            Some(cursor) => {
                let cursor_key = cursor.token().get("key").cloned().unwrap_or(Value::Null);
                let cursor_id = cursor
                    .token()
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                docs.iter()
                    .position(|doc| {
                        let key = doc.fields.get(&order.field).cloned().unwrap_or(Value::Null);
                        compare_in_order(&key, &doc.id, &cursor_key, &cursor_id, order.direction)
                            == CmpOrdering::Greater
                    })
                    .unwrap_or(docs.len())
            }
        };

        let page: Vec<StoredDocument> = docs.into_iter().skip(start).take(limit).collect();
        let next_cursor = page.last().map(|doc| {
            let key = doc.fields.get(&order.field).cloned().unwrap_or(Value::Null);
            PageCursor::new(serde_json::json!({ "key": key, "id": doc.id }))
        });

        Ok(Page {
            docs: page,
            next_cursor,
        })
    }
}
