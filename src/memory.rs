//! In-memory data service: the offline backend and the test double.
//!
//! Enforces the constraints the hosted schema is expected to carry: unique candidate
//! emails and at most one submission per (candidate, challenge).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{Candidate, CandidateId, Challenge, ChallengeId, NewCandidate, NewSubmission};
use crate::service::{DataService, ServiceError, UNIQUE_VIOLATION};

pub struct MemoryService {
  challenges: Vec<Challenge>,
  candidates: RwLock<Vec<Candidate>>,
  submissions: RwLock<Vec<NewSubmission>>,
  offline: AtomicBool,
  calls: AtomicUsize,
}

impl MemoryService {
  pub fn new(challenges: Vec<Challenge>) -> Self {
    Self {
      challenges,
      candidates: RwLock::new(Vec::new()),
      submissions: RwLock::new(Vec::new()),
      offline: AtomicBool::new(false),
      calls: AtomicUsize::new(0),
    }
  }

  /// Simulate an outage: every call fails with `ServiceError::Unavailable`.
  #[cfg(test)]
  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  /// Number of calls served so far (including failed ones).
  #[cfg(test)]
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  #[cfg(test)]
  pub async fn candidate_count(&self) -> usize {
    self.candidates.read().await.len()
  }

  #[cfg(test)]
  pub async fn submission_count(&self) -> usize {
    self.submissions.read().await.len()
  }

  fn enter(&self) -> Result<(), ServiceError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.offline.load(Ordering::SeqCst) {
      return Err(ServiceError::Unavailable);
    }
    Ok(())
  }
}

fn conflict(message: &str) -> ServiceError {
  ServiceError::Api {
    status: StatusCode::CONFLICT,
    code: UNIQUE_VIOLATION.into(),
    message: message.into(),
  }
}

#[async_trait]
impl DataService for MemoryService {
  async fn list_challenges(&self) -> Result<Vec<Challenge>, ServiceError> {
    self.enter()?;
    let mut rows = self.challenges.clone();
    rows.sort_by_key(|c| c.challenge_number);
    Ok(rows)
  }

  async fn find_candidate_by_email(&self, email: &str) -> Result<Option<Candidate>, ServiceError> {
    self.enter()?;
    let candidates = self.candidates.read().await;
    Ok(candidates.iter().find(|c| c.email == email).cloned())
  }

  #[instrument(level = "debug", skip_all)]
  async fn insert_candidate(&self, candidate: &NewCandidate) -> Result<Candidate, ServiceError> {
    self.enter()?;
    let mut candidates = self.candidates.write().await;
    if candidates.iter().any(|c| c.email == candidate.email) {
      return Err(conflict("duplicate key value violates unique constraint \"candidates_email_key\""));
    }
    let row = Candidate {
      id: CandidateId(Uuid::new_v4().to_string()),
      email: candidate.email.clone(),
      name: candidate.name.clone(),
    };
    candidates.push(row.clone());
    Ok(row)
  }

  async fn list_submitted_challenge_ids(
    &self,
    candidate_id: &CandidateId,
  ) -> Result<Vec<ChallengeId>, ServiceError> {
    self.enter()?;
    let submissions = self.submissions.read().await;
    Ok(submissions
      .iter()
      .filter(|s| &s.candidate_id == candidate_id)
      .map(|s| s.challenge_id.clone())
      .collect())
  }

  #[instrument(level = "debug", skip_all)]
  async fn insert_submission(&self, submission: &NewSubmission) -> Result<(), ServiceError> {
    self.enter()?;
    let mut submissions = self.submissions.write().await;
    let duplicate = submissions
      .iter()
      .any(|s| s.candidate_id == submission.candidate_id && s.challenge_id == submission.challenge_id);
    if duplicate {
      return Err(conflict("duplicate key value violates unique constraint \"submissions_candidate_challenge_key\""));
    }
    submissions.push(submission.clone());
    Ok(())
  }

  fn backend_name(&self) -> &'static str { "memory" }
}
