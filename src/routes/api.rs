//! JSON endpoints: health and a read-only view of an open page.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::instrument;

use crate::protocol::{to_view, HealthOut, PageView};
use crate::state::{AppState, PageId};

#[instrument(level = "info", skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthOut {
        ok: true,
        backend: state.service.backend_name(),
        open_pages: state.page_count().await,
    })
}

#[instrument(level = "info", skip(state))]
pub async fn page_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PageId>,
) -> Result<Json<PageView>, StatusCode> {
    let page = state.page(&id).await.ok_or(StatusCode::NOT_FOUND)?;
    let view = to_view(&*page.lock().await);
    Ok(Json(view))
}
