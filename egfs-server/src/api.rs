use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use egfs_core::{Backend, Error, FileStat, Store};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::error;

/// All requests share one checkout, so every store call is serialized here.
pub type SharedStore = Arc<Mutex<Store<Box<dyn Backend + Send>>>>;

type ApiResult<T> = Result<T, (StatusCode, String)>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/files", get(list_files))
        .route("/files/:name", get(get_file))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

fn status_for(err: &Error) -> StatusCode {
    match err.root_cause() {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidName(_) | Error::ReservedName(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Runs `op` against the store on the blocking pool, holding the lock for
/// the whole call.
async fn with_store<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Store<Box<dyn Backend + Send>>) -> egfs_core::Result<T> + Send + 'static,
{
    let store = Arc::clone(&state.store);

    tokio::task::spawn_blocking(move || {
        let mut guard = store.lock().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "store lock poisoned".to_string(),
            )
        })?;
        op(&mut guard).map_err(|e| {
            let status = status_for(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                error!("store request failed: {}", e);
            }
            (status, e.to_string())
        })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
}

async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<FileStat>>> {
    let stats: Vec<FileStat> = with_store(&state, |store| {
        Ok(store.list_all()?.iter().map(|f| f.stat()).collect())
    })
    .await?;

    Ok(Json(stats))
}

async fn get_file(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Response> {
    let handle = with_store(&state, move |store| store.open(&name)).await?;
    let stat = handle.stat();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    if let Some(modified) = stat.mod_time {
        let http_date = modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let value = HeaderValue::from_str(&http_date)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        headers.insert(header::LAST_MODIFIED, value);
    }

    Ok((headers, handle.into_content()).into_response())
}
