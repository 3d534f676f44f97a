//! End-to-end tests for the generated CRUD endpoints: policy
//! enforcement, projection, pagination, and the all-or-nothing patch
//! contract, exercised through the axum router over the in-memory
//! store.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use tower::ServiceExt;

use uiforge_core::{
    ComponentDescriptor, ComponentKind, FieldMeta, FieldOptions, FieldType, ModelSchema,
    SchemaDefinition, TableOptions, UiFramework, Visibility,
};
use uiforge_policy::aggregate;
use uiforge_rest::{DataStore, MemoryStore, Record, RestEndpointFactory};

fn roles(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn invoice_model() -> ModelSchema {
    ModelSchema {
        name: "invoice".to_string(),
        primary_key: "id".to_string(),
        fields: vec![
            FieldMeta::new("id", FieldType::Serial),
            FieldMeta::new("total", FieldType::Decimal),
            FieldMeta::new("status", FieldType::Text).with_choices(vec![
                "draft".into(),
                "sent".into(),
                "paid".into(),
            ]),
            FieldMeta::new("notes", FieldType::LongText),
        ],
    }
}

fn schema() -> SchemaDefinition {
    SchemaDefinition {
        version: "1.0.0".to_string(),
        captured_at: None,
        models: vec![invoice_model()],
    }
}

fn invoice_table() -> ComponentDescriptor {
    let model = invoice_model();
    ComponentDescriptor::build(
        "InvoiceTable",
        UiFramework::Vue,
        &model,
        ComponentKind::Table(TableOptions {
            max_items_per_page: 10,
            addable_by_roles: roles(&["billing"]),
            removable_by_roles: roles(&["admin"]),
        }),
        vec![
            FieldOptions {
                sortable: true,
                modifiable_by_roles: roles(&["billing", "clerk"]),
                ..FieldOptions::new("total")
            },
            FieldOptions {
                modifiable_by_roles: roles(&["billing"]),
                ..FieldOptions::new("status")
            },
            FieldOptions {
                visible_by_roles: Visibility::Roles(roles(&["admin"])),
                ..FieldOptions::new("notes")
            },
        ],
        vec![],
    )
    .unwrap()
}

async fn test_router(seed_count: usize) -> Router {
    let store = Arc::new(MemoryStore::new(schema()));
    let mut records = Vec::new();
    for i in 0..seed_count {
        let record: Record = json!({
            "total": (i as f64) * 10.0,
            "status": if i % 2 == 0 { "draft" } else { "paid" },
            "notes": format!("note {}", i),
        })
        .as_object()
        .unwrap()
        .clone();
        records.push(record);
    }
    store.seed("invoice", records).await.unwrap();

    let descriptors = [invoice_table()];
    let policies = aggregate(descriptors.iter());
    RestEndpointFactory::new(store).router(&schema(), &policies)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, caller_roles: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-roles", caller_roles)
        .body(Body::empty())
        .unwrap()
}

fn with_body(method: &str, uri: &str, caller_roles: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-roles", caller_roles)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn pagination_windows() {
    let router = test_router(25).await;

    let (status, body) = send(&router, get("/invoices?_fields=total&_pageSize=10", "viewer")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
    assert_eq!(body["totalItems"], json!(25));
    assert_eq!(body["totalPages"], json!(3));
    assert_eq!(body["page"], json!(1));

    let (_, body) = send(
        &router,
        get("/invoices?_fields=total&_pageSize=10&_page=3", "viewer"),
    )
    .await;
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["page"], json!(3));
}

#[tokio::test]
async fn projection_includes_pk_and_requested_fields_only() {
    let router = test_router(3).await;
    let (status, body) = send(&router, get("/invoices?_fields=total", "viewer")).await;
    assert_eq!(status, StatusCode::OK);
    let first = &body["items"][0];
    assert!(first.get("pk").is_some());
    assert!(first.get("total").is_some());
    assert!(first.get("status").is_none());
}

#[tokio::test]
async fn hidden_field_projection_is_forbidden_and_named() {
    let router = test_router(3).await;

    let (status, body) = send(&router, get("/invoices?_fields=notes", "viewer")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("notes"));

    // The admin role is in the field's visibility set.
    let (status, _) = send(&router, get("/invoices?_fields=notes", "admin")).await;
    assert_eq!(status, StatusCode::OK);

    // Same check applies on single-item reads.
    let (status, body) = send(&router, get("/invoices/1?_fields=notes", "viewer")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("notes"));
}

#[tokio::test]
async fn undeclared_field_is_visible_to_nobody() {
    let router = test_router(3).await;
    // "id" is never declared in any descriptor, so no role may project it.
    let (status, _) = send(&router, get("/invoices?_fields=id", "admin")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_item_reads_as_empty_object() {
    let router = test_router(2).await;
    let (status, body) = send(&router, get("/invoices/999?_fields=total", "viewer")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn equality_filters_apply() {
    let router = test_router(10).await;
    let (status, body) = send(
        &router,
        get("/invoices?_fields=status&status=paid&_pageSize=50", "viewer"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|i| i["status"] == json!("paid")));
}

#[tokio::test]
async fn unknown_sort_field_fails_loudly() {
    let router = test_router(2).await;
    let (status, body) = send(&router, get("/invoices?_sortBy=vat", "viewer")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("vat"));
}

#[tokio::test]
async fn sorting_descends() {
    let router = test_router(5).await;
    let (_, body) = send(
        &router,
        get("/invoices?_fields=total&_sortBy=total&_sortDir=desc", "viewer"),
    )
    .await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items[0]["total"], json!(40.0));
    assert_eq!(items[4]["total"], json!(0.0));
}

#[tokio::test]
async fn create_requires_addable_role() {
    let router = test_router(0).await;
    let payload = json!({ "total": 12.5, "status": "draft", "notes": "n" });

    let (status, _) = send(
        &router,
        with_body("POST", "/invoices", "viewer", payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&router, with_body("POST", "/invoices", "billing", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(12.5));
    assert_eq!(body["pk"], json!(1));
}

#[tokio::test]
async fn create_validates_before_mutating() {
    let router = test_router(0).await;

    // Wrong type.
    let (status, _) = send(
        &router,
        with_body("POST", "/invoices", "billing", json!({ "total": "lots" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Outside the choice set.
    let (status, body) = send(
        &router,
        with_body("POST", "/invoices", "billing", json!({ "status": "bogus" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("status"));

    // Unknown field.
    let (status, _) = send(
        &router,
        with_body("POST", "/invoices", "billing", json!({ "vat": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was created by the rejected requests.
    let (_, body) = send(&router, get("/invoices?_fields=total", "viewer")).await;
    assert_eq!(body["totalItems"], json!(0));
}

#[tokio::test]
async fn patch_enforces_per_field_modify_rights() {
    let router = test_router(2).await;

    // billing may change status.
    let (status, body) = send(
        &router,
        with_body("PATCH", "/invoices/1", "billing", json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("paid"));

    // viewer may not, and the error names the field.
    let (status, body) = send(
        &router,
        with_body("PATCH", "/invoices/1", "viewer", json!({ "status": "sent" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("status"));
}

#[tokio::test]
async fn patch_is_all_or_nothing() {
    let router = test_router(1).await;

    // clerk may modify total but not status; the whole request is
    // forbidden and total stays untouched.
    let (status, body) = send(
        &router,
        with_body(
            "PATCH",
            "/invoices/1",
            "clerk",
            json!({ "total": 999.0, "status": "paid" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("status"));

    let (_, body) = send(&router, get("/invoices/1?_fields=total", "viewer")).await;
    assert_eq!(body["total"], json!(0.0));
}

#[tokio::test]
async fn patch_missing_item_returns_empty_object() {
    let router = test_router(1).await;
    let (status, body) = send(
        &router,
        with_body("PATCH", "/invoices/42", "billing", json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn delete_requires_removable_role() {
    let router = test_router(2).await;

    let (status, _) = send(
        &router,
        with_body("DELETE", "/invoices/1", "viewer", json!(null)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("DELETE")
        .uri("/invoices/1")
        .header("x-roles", "admin")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, get("/invoices/1?_fields=total", "viewer")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn caller_with_multiple_roles_intersects() {
    let router = test_router(1).await;
    let (status, _) = send(
        &router,
        with_body(
            "PATCH",
            "/invoices/1",
            "viewer, billing",
            json!({ "status": "paid" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

fn order_schema() -> SchemaDefinition {
    SchemaDefinition {
        version: "1.0.0".to_string(),
        captured_at: None,
        models: vec![
            ModelSchema {
                name: "order".to_string(),
                primary_key: "id".to_string(),
                fields: vec![
                    FieldMeta::new("id", FieldType::Serial),
                    FieldMeta::new("reference", FieldType::Text),
                    FieldMeta::new("lines", FieldType::Relation).with_related_model("line"),
                ],
            },
            ModelSchema {
                name: "line".to_string(),
                primary_key: "id".to_string(),
                fields: vec![
                    FieldMeta::new("id", FieldType::Serial),
                    FieldMeta::new("quantity", FieldType::Integer),
                ],
            },
        ],
    }
}

#[tokio::test]
async fn create_upserts_related_items_by_primary_key() {
    let schema = order_schema();
    let store = Arc::new(MemoryStore::new(schema.clone()));
    let seed: Record = json!({ "quantity": 1 }).as_object().unwrap().clone();
    store.seed("line", vec![seed]).await.unwrap();

    let descriptor = ComponentDescriptor::build(
        "OrderTable",
        UiFramework::Vue,
        schema.get_model("order").unwrap(),
        ComponentKind::Table(TableOptions {
            max_items_per_page: 10,
            addable_by_roles: roles(&["billing"]),
            removable_by_roles: roles(&["billing"]),
        }),
        vec![FieldOptions::new("reference"), FieldOptions::new("lines")],
        vec![],
    )
    .unwrap();
    let descriptors = [descriptor];
    let policies = aggregate(descriptors.iter());
    let router = RestEndpointFactory::new(store.clone()).router(&schema, &policies);

    let payload = json!({
        "reference": "A-1",
        "lines": [
            { "pk": 1, "quantity": 9 },
            { "quantity": 5 },
        ],
    });
    let (status, body) = send(&router, with_body("POST", "/orders", "billing", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reference"], json!("A-1"));

    // The keyed sub-object was folded into the related collection.
    let line = store.get("line", &json!(1)).await.unwrap().unwrap();
    assert_eq!(line["quantity"], json!(9));

    // The key-less sub-object was skipped, not inserted.
    assert!(store.get("line", &json!(2)).await.unwrap().is_none());
}
