//! Durable candidate identity: a single key holding the candidate's email.
//!
//! The page only needs `load_email` / `store_email`; where the key lives (cookie
//! session, memory, something else) is up to the implementation.

#[cfg(test)]
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
#[cfg(test)]
use tokio::sync::RwLock;
use tower_sessions::Session;
use tower_sessions_sqlx_store::SqliteStore;

/// Key under which the email is kept.
pub const CANDIDATE_EMAIL_KEY: &str = "candidate_email";

#[derive(Debug, thiserror::Error)]
#[error("session store error: {0}")]
pub struct SessionError(pub String);

#[async_trait]
pub trait SessionStore: Send + Sync {
  async fn load_email(&self) -> Result<Option<String>, SessionError>;
  async fn store_email(&self, email: &str) -> Result<(), SessionError>;
}

/// Open the SQLite database behind the cookie sessions and create its table if needed.
/// The cookie only carries a session id; the records outlive the process.
pub async fn open_session_store(url: &str) -> Result<SqliteStore, sqlx::Error> {
  let pool = SqlitePool::connect(url).await?;
  let store = SqliteStore::new(pool);
  store.migrate().await?;
  Ok(store)
}

/// Fresh on-disk database URL under the temp dir.
#[cfg(test)]
pub fn temp_session_db() -> String {
  let path = std::env::temp_dir().join(format!("assessment-sessions-{}.db", uuid::Uuid::new_v4()));
  format!("sqlite://{}?mode=rwc", path.display())
}

/// Cookie-backed session (tower-sessions).
pub struct CookieSession(pub Session);

#[async_trait]
impl SessionStore for CookieSession {
  async fn load_email(&self) -> Result<Option<String>, SessionError> {
    self.0
      .get::<String>(CANDIDATE_EMAIL_KEY)
      .await
      .map_err(|e| SessionError(e.to_string()))
  }

  async fn store_email(&self, email: &str) -> Result<(), SessionError> {
    self.0
      .insert(CANDIDATE_EMAIL_KEY, email.to_string())
      .await
      .map_err(|e| SessionError(e.to_string()))
  }
}

/// Process-local store; cloning shares the same slot.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemorySession {
  email: Arc<RwLock<Option<String>>>,
}

#[cfg(test)]
impl MemorySession {
  pub fn with_email(email: &str) -> Self {
    Self { email: Arc::new(RwLock::new(Some(email.to_string()))) }
  }
}

#[cfg(test)]
#[async_trait]
impl SessionStore for MemorySession {
  async fn load_email(&self) -> Result<Option<String>, SessionError> {
    Ok(self.email.read().await.clone())
  }

  async fn store_email(&self, email: &str) -> Result<(), SessionError> {
    *self.email.write().await = Some(email.to_string());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn memory_session_shares_slot_between_clones() {
    let a = MemorySession::default();
    let b = a.clone();
    assert_eq!(b.load_email().await.expect("load"), None);
    a.store_email("ada@example.com").await.expect("store");
    assert_eq!(b.load_email().await.expect("load").as_deref(), Some("ada@example.com"));
  }

  #[tokio::test]
  async fn session_store_reopens_existing_database() {
    let db = temp_session_db();
    open_session_store(&db).await.expect("first open");
    // Migration is idempotent; a restart reopens the same file.
    open_session_store(&db).await.expect("second open");
  }
}
