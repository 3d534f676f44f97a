//! CRUD endpoint factory.
//!
//! For each model with a consolidated `ModelAccess` policy, the
//! factory builds five handlers (list, get, create, patch, delete)
//! mounted at `/{model}s` and `/{model}s/{pk}`. Every handler
//! re-checks the policy against the caller's role set on each
//! request; nothing is cached per caller.

use axum::Json;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::routing::get;
use axum::Router;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use uiforge_core::{FieldMeta, FieldType, ModelSchema, SchemaDefinition};
use uiforge_policy::ModelAccess;

use crate::error::RestError;
use crate::query::{parse_list_params, parse_projection};
use crate::store::{DataStore, Record};

/// Role memberships of the calling identity, taken from the
/// comma-separated `x-roles` header. Authentication itself happens
/// upstream; this extractor only reads the result.
#[derive(Debug, Clone, Default)]
pub struct CallerRoles(pub Vec<String>);

impl<S> FromRequestParts<S> for CallerRoles
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let roles = parts
            .headers
            .get("x-roles")
            .and_then(|v| v.to_str().ok())
            .map(|s| {
                s.split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Ok(CallerRoles(roles))
    }
}

/// Shared state of one model's handler set.
struct ModelEndpoint {
    model: ModelSchema,
    access: ModelAccess,
    store: Arc<dyn DataStore>,
}

/// Builds policy-enforcing CRUD routers over a data store.
pub struct RestEndpointFactory {
    store: Arc<dyn DataStore>,
}

impl RestEndpointFactory {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Build the handler set for one model.
    pub fn model_router(&self, model: ModelSchema, access: ModelAccess) -> Router {
        let collection = model.collection_name();
        let state = Arc::new(ModelEndpoint {
            model,
            access,
            store: Arc::clone(&self.store),
        });
        Router::new()
            .route(
                &format!("/{}", collection),
                get(list_items).post(create_item),
            )
            .route(
                &format!("/{}/{{pk}}", collection),
                get(get_item).patch(patch_item).delete(delete_item),
            )
            .with_state(state)
    }

    /// Build the full REST surface: one handler set per model that has
    /// a consolidated policy.
    pub fn router(
        &self,
        schema: &SchemaDefinition,
        policies: &BTreeMap<String, ModelAccess>,
    ) -> Router {
        let mut router = Router::new();
        for (model_name, access) in policies {
            let Some(model) = schema.get_model(model_name) else {
                tracing::warn!(model = %model_name, "policy references unknown model, skipping");
                continue;
            };
            tracing::debug!(model = %model_name, "mounting CRUD endpoints");
            router = router.merge(self.model_router(model.clone(), access.clone()));
        }
        router.layer(TraceLayer::new_for_http())
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn list_items(
    State(state): State<Arc<ModelEndpoint>>,
    CallerRoles(roles): CallerRoles,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, RestError> {
    let parsed = parse_list_params(params, &state.model)?;

    for field in &parsed.fields {
        if !state.access.can_view(field, &roles) {
            return Err(RestError::field_not_visible(field));
        }
    }

    let page = state.store.list(&state.model.name, &parsed.query).await?;
    let items: Vec<Value> = page
        .items
        .iter()
        .map(|r| project(r, &parsed.fields, &state.model.primary_key))
        .collect();

    Ok(Json(json!({
        "items": items,
        "totalItems": page.total_items,
        "totalPages": page.total_pages,
        "page": parsed.query.page,
    })))
}

async fn get_item(
    State(state): State<Arc<ModelEndpoint>>,
    CallerRoles(roles): CallerRoles,
    Path(pk): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, RestError> {
    let fields = parse_projection(params);

    for field in &fields {
        if !state.access.can_view(field, &roles) {
            return Err(RestError::field_not_visible(field));
        }
    }

    // A missing key is an empty object, not an error: existence must
    // not leak through the error channel.
    match state.store.get(&state.model.name, &parse_pk(&pk)).await? {
        Some(record) => Ok(Json(project(&record, &fields, &state.model.primary_key))),
        None => Ok(Json(json!({}))),
    }
}

async fn create_item(
    State(state): State<Arc<ModelEndpoint>>,
    CallerRoles(roles): CallerRoles,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, RestError> {
    if !state.access.can_add(&roles) {
        return Err(RestError::add_not_allowed());
    }

    let record = as_object(payload)?;
    validate_payload(&state.model, &record)?;

    let (record, related) = split_related(&state.model, record);
    let created = state.store.insert(&state.model.name, record).await?;
    upsert_related(&state, related).await?;

    Ok(Json(serialize_full(&created, &state.model.primary_key)))
}

async fn patch_item(
    State(state): State<Arc<ModelEndpoint>>,
    CallerRoles(roles): CallerRoles,
    Path(pk): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, RestError> {
    let changes = as_object(payload)?;

    // All-or-nothing: every payload key is checked before any
    // validation or mutation. One missing authorization forbids the
    // whole request.
    for field in changes.keys() {
        if !state.access.can_modify(field, &roles) {
            return Err(RestError::modify_not_allowed(field));
        }
    }

    validate_payload(&state.model, &changes)?;

    let (changes, related) = split_related(&state.model, changes);
    let updated = state
        .store
        .update(&state.model.name, &parse_pk(&pk), changes)
        .await?;
    upsert_related(&state, related).await?;

    match updated {
        Some(record) => Ok(Json(serialize_full(&record, &state.model.primary_key))),
        None => Ok(Json(json!({}))),
    }
}

async fn delete_item(
    State(state): State<Arc<ModelEndpoint>>,
    CallerRoles(roles): CallerRoles,
    Path(pk): Path<String>,
) -> Result<StatusCode, RestError> {
    if !state.access.can_remove(&roles) {
        return Err(RestError::remove_not_allowed());
    }

    state.store.delete(&state.model.name, &parse_pk(&pk)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// HELPERS
// =============================================================================

/// Primary keys arrive as path strings; integers are normalized so
/// they compare equal to stored numeric keys.
fn parse_pk(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn as_object(payload: Value) -> Result<Record, RestError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(RestError::payload_not_object()),
    }
}

/// Project a record to the requested fields plus the primary key
/// under `pk`.
fn project(record: &Record, fields: &[String], pk_field: &str) -> Value {
    let mut out = Record::new();
    out.insert(
        "pk".to_string(),
        record.get(pk_field).cloned().unwrap_or(Value::Null),
    );
    for field in fields {
        out.insert(
            field.clone(),
            record.get(field).cloned().unwrap_or(Value::Null),
        );
    }
    Value::Object(out)
}

/// Serialize every stored field plus the primary key under `pk`.
fn serialize_full(record: &Record, pk_field: &str) -> Value {
    let mut out = record.clone();
    out.insert(
        "pk".to_string(),
        record.get(pk_field).cloned().unwrap_or(Value::Null),
    );
    Value::Object(out)
}

/// Validate every payload value against the model's field types and
/// choice sets. Nothing is mutated on failure.
fn validate_payload(model: &ModelSchema, payload: &Record) -> Result<(), RestError> {
    for (field, value) in payload {
        let meta = model
            .field(field)
            .ok_or_else(|| RestError::unknown_field(&model.name, field))?;
        validate_value(meta, value)?;
    }
    Ok(())
}

fn validate_value(meta: &FieldMeta, value: &Value) -> Result<(), RestError> {
    if value.is_null() {
        return Ok(());
    }

    let ok = match meta.field_type {
        t if t.is_numeric() => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Relation => {
            value.is_array() && value.as_array().unwrap().iter().all(|v| v.is_object())
        }
        _ => value.is_string(),
    };
    if !ok {
        let expected = match meta.field_type {
            t if t.is_numeric() => "a number",
            FieldType::Boolean => "a boolean",
            FieldType::Relation => "a list of objects",
            _ => "a string",
        };
        return Err(RestError::invalid_value(&meta.name, expected));
    }

    if !meta.choices.is_empty() {
        let matches = value
            .as_str()
            .map(|s| meta.choices.iter().any(|c| c == s))
            .unwrap_or(false);
        if !matches {
            return Err(RestError::value_not_in_choices(&meta.name, &meta.choices));
        }
    }

    Ok(())
}

/// Split list-valued relation fields out of a validated payload.
/// Returns the scalar record and `(related_model, items)` pairs.
fn split_related(
    model: &ModelSchema,
    mut payload: Record,
) -> (Record, Vec<(String, Vec<Record>)>) {
    let mut related = Vec::new();
    let relation_fields: Vec<(String, String)> = model
        .fields
        .iter()
        .filter(|f| f.field_type == FieldType::Relation)
        .filter_map(|f| {
            f.related_model
                .as_ref()
                .map(|target| (f.name.clone(), target.clone()))
        })
        .collect();

    for (field, target) in relation_fields {
        if let Some(Value::Array(items)) = payload.remove(&field) {
            let records = items
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            related.push((target, records));
        }
    }
    (payload, related)
}

/// Upsert related sub-objects by primary key where one is present;
/// items without a key are skipped.
async fn upsert_related(
    state: &ModelEndpoint,
    related: Vec<(String, Vec<Record>)>,
) -> Result<(), RestError> {
    for (target, items) in related {
        for mut item in items {
            let Some(pk) = item.remove("pk") else {
                continue;
            };
            state.store.update(&target, &pk, item).await?;
        }
    }
    Ok(())
}
