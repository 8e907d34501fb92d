//! The data-service seam: table-like reads and inserts the page needs.
//!
//! Two implementations exist: `supabase::SupabaseClient` (hosted PostgREST) and
//! `memory::MemoryService` (offline mode and tests).

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::{Candidate, CandidateId, Challenge, ChallengeId, NewCandidate, NewSubmission};

/// Postgres error code for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("service returned HTTP {status} ({code}): {message}")]
  Api {
    status: StatusCode,
    code: String,
    message: String,
  },

  #[error("could not decode service response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("insert into {0} returned no row")]
  EmptyInsert(&'static str),

  #[error("invalid service configuration: {0}")]
  Config(String),

  #[error("data service unavailable")]
  Unavailable,
}

impl ServiceError {
  /// True when the service rejected an insert because the row already exists.
  pub fn is_unique_violation(&self) -> bool {
    match self {
      ServiceError::Api { status, code, .. } => {
        code == UNIQUE_VIOLATION || (code.is_empty() && *status == StatusCode::CONFLICT)
      }
      _ => false,
    }
  }
}

#[async_trait]
pub trait DataService: Send + Sync {
  /// All challenges ordered by `challenge_number`.
  async fn list_challenges(&self) -> Result<Vec<Challenge>, ServiceError>;

  /// Exact email match; zero or one row.
  async fn find_candidate_by_email(&self, email: &str) -> Result<Option<Candidate>, ServiceError>;

  /// Insert a candidate and return the stored row.
  async fn insert_candidate(&self, candidate: &NewCandidate) -> Result<Candidate, ServiceError>;

  /// Challenge ids the candidate has submitted, projected from `submissions`.
  async fn list_submitted_challenge_ids(
    &self,
    candidate_id: &CandidateId,
  ) -> Result<Vec<ChallengeId>, ServiceError>;

  async fn insert_submission(&self, submission: &NewSubmission) -> Result<(), ServiceError>;

  /// Short name for logs.
  fn backend_name(&self) -> &'static str;
}
