//! HTTP server mode exposing configured tables as REST resources
//!
//! | Method | Path              | Operation |
//! |--------|-------------------|-----------|
//! | POST   | `/{name}`         | create    |
//! | GET    | `/{name}`         | find      |
//! | GET    | `/{name}/{key}`   | get       |
//! | PUT    | `/{name}/{key}`   | update    |
//! | PATCH  | `/{name}/{key}`   | patch     |
//! | DELETE | `/{name}/{key}`   | delete    |

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::service::{Binding, CrudService, Document, FindQuery, GetQuery, Model};
use crate::types::{JsonValue, StringMap};

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    /// One service per resource name
    services: HashMap<String, CrudService<Document>>,
    /// Time budget for one request's database work
    timeout: Duration,
}

impl AppState {
    fn service(&self, resource: &str) -> Result<CrudService<Document>> {
        self.services
            .get(resource)
            .cloned()
            .ok_or_else(|| Error::UnknownResource {
                name: resource.to_string(),
            })
    }
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Build the router for every configured resource
pub fn router(db: Arc<Database>, config: &AppConfig) -> Router {
    let services = config
        .resources
        .iter()
        .map(|resource| {
            tracing::info!(
                "Registering resource /{} -> table '{}'",
                resource.name,
                resource.table_name()
            );
            (
                resource.name.clone(),
                CrudService::new(Arc::clone(&db), resource.table_name(), config.pagination),
            )
        })
        .collect();

    let state = AppState {
        services,
        timeout: Duration::from_millis(config.server.request_timeout_ms),
    };

    // Build CORS layer - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/:resource", get(find_records).post(create_record))
        .route(
            "/:resource/:key",
            get(get_record)
                .put(update_record)
                .patch(patch_record)
                .delete(delete_record),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(db: Arc<Database>, config: AppConfig) -> Result<()> {
    let app = router(db, &config);

    let host = config.server.host.as_str();
    let port = config.server.port;
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {host}:{port}: {e}")))?;

    tracing::info!("Starting HTTP server on http://{}:{}", host, port);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run blocking database work for `resource` under the request time budget
async fn run<F>(state: &AppState, resource: &str, work: F) -> Result<JsonValue>
where
    F: FnOnce(&CrudService<Document>) -> Result<JsonValue> + Send + 'static,
{
    let service = state.service(resource)?;
    let task = tokio::task::spawn_blocking(move || work(&service));

    match tokio::time::timeout(state.timeout, task).await {
        Ok(joined) => joined.map_err(|e| Error::Other(format!("Request task failed: {e}")))?,
        Err(_) => {
            let timeout_ms = state.timeout.as_millis() as u64;
            tracing::warn!("Request on '{}' timed out after {}ms", resource, timeout_ms);
            Err(Error::Timeout { timeout_ms })
        }
    }
}

fn respond(result: Result<JsonValue>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!("Request failed: {}", e);
            } else {
                tracing::debug!("Request rejected: {}", e);
            }
            (
                status,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Parse an optional JSON body; an empty body binds nothing
fn parse_body(body: &Bytes) -> Result<JsonValue> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonValue::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

fn bind_document(params: &StringMap, body: &Bytes, key: Option<&str>) -> Result<Document> {
    let mut binding = Binding::new().query(params).body(parse_body(body)?)?;
    if let Some(key) = key {
        binding = binding.key(Document::KEY_COLUMN, key);
    }
    binding.bind()
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `GET /{name}`
async fn find_records(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    Query(params): Query<StringMap>,
) -> Response {
    let result = run(&state, &resource, move |service| {
        let query = FindQuery::from_params(&params)?;
        let model = bind_document(&params, &Bytes::new(), None)?;
        let page = service.find(&model, &query)?;
        Ok(serde_json::to_value(page)?)
    })
    .await;
    respond(result)
}

/// `GET /{name}/{key}`
async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((resource, key)): Path<(String, String)>,
    Query(params): Query<StringMap>,
) -> Response {
    let result = run(&state, &resource, move |service| {
        let query = GetQuery::from_params(&params);
        let model = bind_document(&params, &Bytes::new(), Some(&key))?;
        service.get(&model, &query)
    })
    .await;
    respond(result)
}

/// `POST /{name}`
async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(resource): Path<String>,
    Query(params): Query<StringMap>,
    body: Bytes,
) -> Response {
    let result = run(&state, &resource, move |service| {
        let model = bind_document(&params, &body, None)?;
        service.create(&model)
    })
    .await;
    respond(result)
}

/// `PUT /{name}/{key}`
async fn update_record(
    State(state): State<Arc<AppState>>,
    Path((resource, key)): Path<(String, String)>,
    Query(params): Query<StringMap>,
    body: Bytes,
) -> Response {
    let result = run(&state, &resource, move |service| {
        let model = bind_document(&params, &body, Some(&key))?;
        service.update(&model)
    })
    .await;
    respond(result)
}

/// `PATCH /{name}/{key}`
async fn patch_record(
    State(state): State<Arc<AppState>>,
    Path((resource, key)): Path<(String, String)>,
    Query(params): Query<StringMap>,
    body: Bytes,
) -> Response {
    let result = run(&state, &resource, move |service| {
        let model = bind_document(&params, &body, Some(&key))?;
        service.patch(&model)
    })
    .await;
    respond(result)
}

/// `DELETE /{name}/{key}`
async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path((resource, key)): Path<(String, String)>,
    Query(params): Query<StringMap>,
) -> Response {
    let result = run(&state, &resource, move |service| {
        let model = bind_document(&params, &Bytes::new(), Some(&key))?;
        service.delete(&model)
    })
    .await;
    respond(result)
}
