//! Breed catalog routes, mounted under the configured base path.

use super::state::{GuardedCatalogService, ServerState};
use crate::catalog::{AddBreedRequest, CatalogError, CatalogResult, CatalogService, PageRequest};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

/// Raw list query. Values stay strings so that garbage falls back to defaults
/// instead of being rejected.
#[derive(Deserialize, Debug, Default)]
struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct UpdateBreedBody {
    #[serde(default)]
    types: Option<Vec<String>>,
}

/// Store calls block, so they run on the blocking pool. The task completes
/// even if the client goes away mid-request.
async fn run_blocking<T, F>(service: GuardedCatalogService, op: F) -> CatalogResult<T>
where
    F: FnOnce(&CatalogService) -> CatalogResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|err| CatalogError::Internal(format!("Catalog task failed: {}", err)))?
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> CatalogResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| CatalogError::Validation(rejection.body_text()))
}

async fn list_breeds(
    State(service): State<GuardedCatalogService>,
    Query(query): Query<ListQuery>,
) -> Response {
    let request = PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref());
    match run_blocking(service, move |s| s.list(request)).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_breed(
    State(service): State<GuardedCatalogService>,
    Path(id): Path<String>,
) -> Response {
    match run_blocking(service, move |s| s.get_one(&id)).await {
        Ok(entry) => Json(entry).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn add_breed(
    State(service): State<GuardedCatalogService>,
    body: Result<Json<AddBreedRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    match run_blocking(service, move |s| s.add(request)).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn update_breed(
    State(service): State<GuardedCatalogService>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBreedBody>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(body) => body,
        Err(err) => return err.into_response(),
    };
    match run_blocking(service, move |s| s.update(&id, body.types)).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_breed(
    State(service): State<GuardedCatalogService>,
    Path(id): Path<String>,
) -> Response {
    match run_blocking(service, move |s| s.delete(&id)).await {
        Ok(message) => Json(json!({ "message": message })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn make_breed_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_breeds).post(add_breed))
        .route(
            "/{id}",
            get(get_breed).put(update_breed).delete(delete_breed),
        )
        .with_state(state)
}
