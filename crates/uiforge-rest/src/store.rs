//! Persistence abstraction.
//!
//! The endpoint factory talks to a `DataStore` and nothing else. The
//! store owns its own transaction discipline; each call is one atomic
//! unit from the factory's point of view.

use async_trait::async_trait;
use serde_json::Value;

use crate::query::ListQuery;

/// A stored item: field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// One page of a filtered, sorted listing.
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub items: Vec<Record>,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Filter/sort/paginate query capability over named model collections.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// List records matching the query's equality filters, ordered and
    /// windowed.
    async fn list(&self, model: &str, query: &ListQuery) -> Result<RecordPage, StoreError>;

    /// Fetch one record by primary key. `None` when the key does not
    /// resolve.
    async fn get(&self, model: &str, pk: &Value) -> Result<Option<Record>, StoreError>;

    /// Insert a record, assigning the primary key where the store owns
    /// it. Returns the stored record.
    async fn insert(&self, model: &str, record: Record) -> Result<Record, StoreError>;

    /// Partially update a record by primary key. Returns the updated
    /// record, or `None` when the key does not resolve.
    async fn update(
        &self,
        model: &str,
        pk: &Value,
        changes: Record,
    ) -> Result<Option<Record>, StoreError>;

    /// Delete a record by primary key. Deleting a missing key is not
    /// an error.
    async fn delete(&self, model: &str, pk: &Value) -> Result<(), StoreError>;
}
