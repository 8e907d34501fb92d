//! Skills Assessment · page server
//!
//! - Axum HTTP server rendering the assessment page (askama) and a small JSON API
//! - Supabase (PostgREST) backend, or an in-memory backend when not configured
//! - Candidate identity kept in a cookie session (`candidate_email`), records in SQLite
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   SUPABASE_URL           : project URL; enables the Supabase backend together with the key
//!   SUPABASE_ANON_KEY      : API key sent as `apikey` and bearer token
//!   ASSESSMENT_CONFIG_PATH : path to TOML config (branding, service, pages, local challenge bank);
//!                            `pages.session_db` points at the session database
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

mod config;
mod domain;
mod logic;
mod memory;
mod page;
mod protocol;
mod routes;
mod seeds;
mod service;
mod session;
mod state;
mod supabase;
mod telemetry;
mod util;
mod view;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_sessions::ExpiredDeletion;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::session::open_session_store;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, data service, open pages.
  let state = Arc::new(AppState::new(AppConfig::from_env())?);

  // Session records outlive the process; expired ones are swept in the background.
  let sessions = open_session_store(&state.config.pages.session_db).await?;
  info!(target: "assessment", db = %state.config.pages.session_db, "Session store ready");
  tokio::task::spawn({
    let sessions = sessions.clone();
    async move {
      if let Err(e) = sessions.continuously_delete_expired(Duration::from_secs(60)).await {
        error!(target: "assessment", error = %e, "Expired session sweep stopped");
      }
    }
  });

  let app = build_router(state.clone(), sessions);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "assessment", %addr, backend = state.service.backend_name(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "assessment", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "assessment", error = %e, "Could not install Ctrl-C handler");
    std::future::pending::<()>().await;
  }
}
