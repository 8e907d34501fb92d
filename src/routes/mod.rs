//! Router assembly: page routes, JSON API, static assets, cookie sessions, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tower_sessions::{cookie::time::Duration, cookie::SameSite, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::Level;

use crate::state::AppState;

pub mod api;
pub mod http;

/// Build the application router with:
/// - the page at `/` and its form actions under `/pages/:id/...`
/// - a small JSON API under `/api/v1/...`
/// - static assets from `./static`
/// - a cookie session carrying the candidate email, stored in `session_store`
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, session_store: SqliteStore) -> Router {
    let pages = &state.config.pages;
    let sessions = SessionManagerLayer::new(session_store)
        .with_name("assessment.sid")
        .with_secure(pages.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(pages.session_days)));

    Router::new()
        // Page
        .route("/", get(http::page_load))
        .route("/pages/:id", get(http::page_show))
        .route("/pages/:id/register", post(http::page_register))
        .route("/pages/:id/open", post(http::page_open))
        .route("/pages/:id/close", post(http::page_close))
        .route("/pages/:id/submit", post(http::page_submit))
        // JSON API
        .route("/api/v1/health", get(api::health))
        .route("/api/v1/pages/:id", get(api::page_view))
        .nest_service("/static", ServeDir::new("./static"))
        .with_state(state)
        .layer(sessions)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
