//! HTTP server integration tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot` against a
//! bootstrapped in-memory DuckDB.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tablecrud::cli::router;
use tablecrud::config::load_config_from_str;
use tablecrud::database::Database;
use tower::ServiceExt;

const CONFIG: &str = r"
pagination:
  default_limit: 2
  max_limit: 3
resources:
  - name: users
  - name: people
    table: users
";

fn app() -> Router {
    let config = load_config_from_str(CONFIG).unwrap();
    let db = Database::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE users (key BIGINT PRIMARY KEY, name VARCHAR, age INTEGER);
         INSERT INTO users VALUES
           (1, 'ada', 36), (2, 'bob', 25), (3, 'cy', 36), (4, 'dee', 25), (5, 'eve', 41);",
    )
    .unwrap();
    router(Arc::new(db), &config)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn keys(body: &Value) -> Vec<i64> {
    body["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["key"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_find_pages_with_cursor() {
    let app = app();

    let (status, first) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&first), vec![1, 2]);
    assert_eq!(first["meta"]["limit"], json!(2));
    let cursor = first["meta"]["cursor"].as_str().unwrap().to_string();
    assert_eq!(cursor, "Mg==");

    let (_, second) = send(&app, Method::GET, "/users?cursor=Mg%3D%3D&page=2", None).await;
    assert_eq!(keys(&second), vec![3, 4]);
    assert_eq!(second["meta"]["page"], json!(2));

    let (_, third) = send(&app, Method::GET, "/users?cursor=NA%3D%3D", None).await;
    assert_eq!(keys(&third), vec![5]);
    assert!(third["meta"].get("cursor").is_none());
}

#[tokio::test]
async fn test_find_with_filter_order_and_select() {
    let (status, body) = send(
        &app(),
        Method::GET,
        "/users?age=36&order=name,desc&select=name&limit=10",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "meta": {"limit": 3},
            "result": [{"key": 3, "name": "cy"}, {"key": 1, "name": "ada"}]
        })
    );
}

#[tokio::test]
async fn test_resource_alias_uses_configured_table() {
    let (status, body) = send(&app(), Method::GET, "/people/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"key": 4, "name": "dee", "age": 25}));
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/users?cursor=%21%21", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid cursor"));

    let (status, _) = send(&app, Method::GET, "/users?cursor=OTk%3D", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "entity not found"}));

    let (status, _) = send(&app, Method::GET, "/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/users?limit=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/users?order=bad-column", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_update_patch_delete() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({"key": 6, "name": "fay", "age": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created, json!({"key": 6, "name": "fay", "age": 30}));

    let (status, _) = send(&app, Method::PUT, "/users/6", Some(json!({"age": 31}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, fetched) = send(&app, Method::GET, "/users/6", None).await;
    assert_eq!(fetched, json!({"key": 6, "name": "fay", "age": 31}));

    let (status, _) = send(&app, Method::PUT, "/users/60", Some(json!({"age": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, patched) = send(
        &app,
        Method::PATCH,
        "/users/7",
        Some(json!({"name": "gus", "age": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched, json!({"key": 7, "name": "gus", "age": 50}));

    let (status, deleted) = send(&app, Method::DELETE, "/users/7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"key": 7}));

    let (status, _) = send(&app, Method::GET, "/users/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_rejects_bad_bodies() {
    let app = app();

    let (status, _) = send(&app, Method::POST, "/users", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/users")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/users", Some(json!({"key": 1}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
