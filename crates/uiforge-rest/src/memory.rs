//! In-memory `DataStore` used by the dev server and the test suite.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use uiforge_core::SchemaDefinition;

use crate::query::{ListQuery, SortDir};
use crate::store::{DataStore, Record, RecordPage, StoreError};

/// In-memory store over the model schemas of a snapshot. Assigns
/// sequential integer primary keys on insert when the payload does
/// not carry one.
pub struct MemoryStore {
    schema: SchemaDefinition,
    collections: RwLock<HashMap<String, Vec<Record>>>,
    next_pk: RwLock<HashMap<String, i64>>,
}

impl MemoryStore {
    /// Create an empty store with one collection per model.
    pub fn new(schema: SchemaDefinition) -> Self {
        let collections = schema
            .models
            .iter()
            .map(|m| (m.name.clone(), Vec::new()))
            .collect();
        let next_pk = schema
            .models
            .iter()
            .map(|m| (m.name.clone(), 1))
            .collect();
        Self {
            schema,
            collections: RwLock::new(collections),
            next_pk: RwLock::new(next_pk),
        }
    }

    /// Insert seed records, assigning primary keys where absent.
    pub async fn seed(&self, model: &str, records: Vec<Record>) -> Result<(), StoreError> {
        for record in records {
            self.insert(model, record).await?;
        }
        Ok(())
    }

    fn pk_field(&self, model: &str) -> Result<String, StoreError> {
        self.schema
            .get_model(model)
            .map(|m| m.primary_key.clone())
            .ok_or_else(|| StoreError::UnknownModel(model.to_string()))
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list(&self, model: &str, query: &ListQuery) -> Result<RecordPage, StoreError> {
        let collections = self.collections.read().await;
        let records = collections
            .get(model)
            .ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;

        let mut matching: Vec<Record> = records
            .iter()
            .filter(|r| {
                query
                    .filters
                    .iter()
                    .all(|(field, expected)| values_equal(r.get(field), expected))
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ord = compare_values(a.get(&query.sort_by), b.get(&query.sort_by));
            match query.sort_dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        });

        let total_items = matching.len() as u64;
        let total_pages = std::cmp::max(1, total_items.div_ceil(query.page_size));
        let start = query
            .page
            .saturating_sub(1)
            .saturating_mul(query.page_size) as usize;
        let items = matching
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .collect();

        Ok(RecordPage {
            items,
            total_items,
            total_pages,
        })
    }

    async fn get(&self, model: &str, pk: &Value) -> Result<Option<Record>, StoreError> {
        let pk_field = self.pk_field(model)?;
        let collections = self.collections.read().await;
        let records = collections
            .get(model)
            .ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;
        Ok(records
            .iter()
            .find(|r| values_equal(r.get(&pk_field), pk))
            .cloned())
    }

    async fn insert(&self, model: &str, mut record: Record) -> Result<Record, StoreError> {
        let pk_field = self.pk_field(model)?;

        let mut next_pk = self.next_pk.write().await;
        let counter = next_pk.entry(model.to_string()).or_insert(1);

        match record.get(&pk_field) {
            Some(v) if !v.is_null() => {
                // Keep the counter ahead of explicitly assigned keys.
                if let Some(n) = v.as_i64() {
                    *counter = std::cmp::max(*counter, n + 1);
                }
            }
            _ => {
                record.insert(pk_field, Value::from(*counter));
                *counter += 1;
            }
        }
        drop(next_pk);

        let mut collections = self.collections.write().await;
        collections
            .get_mut(model)
            .ok_or_else(|| StoreError::UnknownModel(model.to_string()))?
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        model: &str,
        pk: &Value,
        changes: Record,
    ) -> Result<Option<Record>, StoreError> {
        let pk_field = self.pk_field(model)?;
        let mut collections = self.collections.write().await;
        let records = collections
            .get_mut(model)
            .ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;

        let Some(record) = records
            .iter_mut()
            .find(|r| values_equal(r.get(&pk_field), pk))
        else {
            return Ok(None);
        };

        for (field, value) in changes {
            record.insert(field, value);
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, model: &str, pk: &Value) -> Result<(), StoreError> {
        let pk_field = self.pk_field(model)?;
        let mut collections = self.collections.write().await;
        let records = collections
            .get_mut(model)
            .ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;
        records.retain(|r| !values_equal(r.get(&pk_field), pk));
        Ok(())
    }
}

/// Equality with numeric normalization (integer filters must match
/// float-stored values and vice versa).
fn values_equal(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(actual) => {
            if let (Some(a), Some(b)) = (actual.as_f64(), expected.as_f64()) {
                a == b
            } else {
                actual == expected
            }
        }
    }
}

/// Total order over JSON values for sorting: null first, then
/// booleans, numbers, strings; everything else compares equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uiforge_core::{FieldMeta, FieldType, ModelSchema};

    fn schema() -> SchemaDefinition {
        SchemaDefinition {
            version: "1.0.0".to_string(),
            captured_at: None,
            models: vec![ModelSchema {
                name: "invoice".to_string(),
                primary_key: "id".to_string(),
                fields: vec![
                    FieldMeta::new("id", FieldType::Serial),
                    FieldMeta::new("total", FieldType::Decimal),
                    FieldMeta::new("status", FieldType::Text),
                ],
            }],
        }
    }

    fn record(total: f64, status: &str) -> Record {
        json!({ "total": total, "status": status })
            .as_object()
            .unwrap()
            .clone()
    }

    fn query(page: u64, page_size: u64) -> ListQuery {
        ListQuery {
            filters: vec![],
            sort_by: "id".to_string(),
            sort_dir: SortDir::Asc,
            page,
            page_size,
        }
    }

    #[tokio::test]
    async fn assigns_sequential_pks() {
        let store = MemoryStore::new(schema());
        let first = store.insert("invoice", record(1.0, "draft")).await.unwrap();
        let second = store.insert("invoice", record(2.0, "sent")).await.unwrap();
        assert_eq!(first["id"], json!(1));
        assert_eq!(second["id"], json!(2));
    }

    #[tokio::test]
    async fn filters_and_sorts() {
        let store = MemoryStore::new(schema());
        store
            .seed(
                "invoice",
                vec![record(30.0, "paid"), record(10.0, "paid"), record(20.0, "draft")],
            )
            .await
            .unwrap();

        let mut q = query(1, 10);
        q.filters = vec![("status".to_string(), json!("paid"))];
        q.sort_by = "total".to_string();
        q.sort_dir = SortDir::Desc;

        let page = store.list("invoice", &q).await.unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0]["total"], json!(30.0));
        assert_eq!(page.items[1]["total"], json!(10.0));
    }

    #[tokio::test]
    async fn paginates_with_ceiling() {
        let store = MemoryStore::new(schema());
        for i in 0..25 {
            store
                .insert("invoice", record(i as f64, "draft"))
                .await
                .unwrap();
        }
        let page1 = store.list("invoice", &query(1, 10)).await.unwrap();
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page1.total_items, 25);
        assert_eq!(page1.total_pages, 3);

        let page3 = store.list("invoice", &query(3, 10)).await.unwrap();
        assert_eq!(page3.items.len(), 5);
    }

    // Handlers only build 1-based pages, but `list` is public API and
    // must not underflow on a hand-built page 0.
    #[tokio::test]
    async fn page_zero_reads_as_first_window() {
        let store = MemoryStore::new(schema());
        store
            .seed("invoice", vec![record(1.0, "draft"), record(2.0, "sent")])
            .await
            .unwrap();

        let page = store.list("invoice", &query(0, 1)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0]["total"], json!(1.0));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let store = MemoryStore::new(schema());
        let created = store.insert("invoice", record(5.0, "draft")).await.unwrap();
        let pk = created["id"].clone();

        let mut changes = Record::new();
        changes.insert("status".to_string(), json!("paid"));
        let updated = store.update("invoice", &pk, changes).await.unwrap().unwrap();
        assert_eq!(updated["status"], json!("paid"));
        assert_eq!(updated["total"], json!(5.0));

        store.delete("invoice", &pk).await.unwrap();
        assert!(store.get("invoice", &pk).await.unwrap().is_none());

        // Deleting a missing key is not an error.
        store.delete("invoice", &pk).await.unwrap();
    }

    #[tokio::test]
    async fn missing_update_returns_none() {
        let store = MemoryStore::new(schema());
        let result = store
            .update("invoice", &json!(99), Record::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
