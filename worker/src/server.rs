//! HTTP surface of a fetch worker
//!
//! `POST /invoke` runs one batch; `GET /health` reports the worker's pool slot.

use std::sync::Arc;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use shared::{InvokeRequest, InvokeResponse, ProcessId, WorkerIndex, process_debug, process_info, process_warn};
use crate::batch::run_batch;
use crate::error::{WorkerError, WorkerResult};
use crate::traits::UrlFetcher;

/// Immutable state shared by all requests to one worker
pub struct WorkerState<F> {
    pub index: WorkerIndex,
    pub fetcher: F,
}

impl<F> WorkerState<F> {
    pub fn new(index: WorkerIndex, fetcher: F) -> Self {
        Self { index, fetcher }
    }
}

/// Build the worker router
pub fn build_router<F>(state: Arc<WorkerState<F>>) -> Router
where
    F: UrlFetcher + 'static,
{
    Router::new()
        .route("/invoke", post(invoke_handler::<F>))
        .route("/health", get(health_handler::<F>))
        .with_state(state)
}

/// Serve the router until the listener fails
pub async fn serve(listener: TcpListener, router: Router) -> WorkerResult<()> {
    let addr = listener.local_addr()?;
    process_info!(ProcessId::current(), "🌐 Worker listening on {}", addr);

    axum::serve(listener, router).await.map_err(|e| WorkerError::Bind {
        addr: addr.to_string(),
        message: e.to_string(),
    })
}

async fn invoke_handler<F>(
    State(state): State<Arc<WorkerState<F>>>,
    Json(request): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, (StatusCode, Json<Value>)>
where
    F: UrlFetcher + 'static,
{
    if !request.method.eq_ignore_ascii_case("GET") {
        let error = WorkerError::UnsupportedMethod {
            method: request.method.clone(),
        };
        process_warn!(ProcessId::current(), "⚠️ Rejected invocation: {}", error);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "errorMessage": error.to_string(), "worker": state.index })),
        ));
    }

    process_debug!(
        ProcessId::current(),
        "📥 Fetching batch of {} urls on worker {}",
        request.urls.len(),
        state.index
    );

    let response = run_batch(&state.fetcher, &request).await;

    process_debug!(
        ProcessId::current(),
        "📤 Batch done: {} responded, {} errored",
        response.url_list.len(),
        response.error_url_list.len()
    );

    Ok(Json(response))
}

async fn health_handler<F>(State(state): State<Arc<WorkerState<F>>>) -> Json<Value>
where
    F: UrlFetcher + 'static,
{
    Json(json!({ "status": "ok", "worker": state.index }))
}
