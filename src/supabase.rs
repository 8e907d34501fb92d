//! Minimal Supabase (PostgREST) client for the three tables the page touches.
//!
//! Calls are instrumented and log table names, latencies and row counts (never the API key,
//! never raw emails).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::{Candidate, CandidateId, Challenge, ChallengeId, NewCandidate, NewSubmission};
use crate::service::{DataService, ServiceError};
use crate::util::mask_email;

#[derive(Clone)]
pub struct SupabaseClient {
  pub client: reqwest::Client,
  pub base_url: String,
}

#[derive(Deserialize)]
struct SubmissionRow {
  challenge_id: ChallengeId,
}

impl SupabaseClient {
  /// Build a client for `{url}/rest/v1` authenticated with the anon (or service) key.
  pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self, ServiceError> {
    let mut headers = HeaderMap::new();
    let key = HeaderValue::from_str(api_key).map_err(|e| ServiceError::Config(e.to_string()))?;
    let bearer =
      HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| ServiceError::Config(e.to_string()))?;
    headers.insert("apikey", key);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(USER_AGENT, HeaderValue::from_static("assessment-server/0.1"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
      .timeout(timeout)
      .default_headers(headers)
      .build()?;

    Ok(Self { client, base_url: rest_base(url) })
  }

  fn table(&self, name: &str) -> String {
    format!("{}/{}", self.base_url, name)
  }

  /// Send, check status, decode a JSON body.
  async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ServiceError> {
    let res = checked(req.send().await?).await?;
    let bytes = res.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

/// Normalize a project URL into the PostgREST base (`.../rest/v1`).
fn rest_base(url: &str) -> String {
  let trimmed = url.trim_end_matches('/');
  if trimmed.ends_with("/rest/v1") {
    trimmed.to_string()
  } else {
    format!("{trimmed}/rest/v1")
  }
}

/// Turn a non-2xx response into `ServiceError::Api`, keeping the PostgREST error code.
async fn checked(res: Response) -> Result<Response, ServiceError> {
  let status = res.status();
  if status.is_success() {
    return Ok(res);
  }
  let body = res.text().await.unwrap_or_default();
  let (code, message) = extract_postgrest_error(&body).unwrap_or_else(|| (String::new(), body));
  Err(ServiceError::Api { status, code, message })
}

fn extract_postgrest_error(body: &str) -> Option<(String, String)> {
  #[derive(Deserialize)]
  struct PgError {
    #[serde(default)] code: Option<String>,
    #[serde(default)] message: Option<String>,
  }
  let e = serde_json::from_str::<PgError>(body).ok()?;
  Some((e.code.unwrap_or_default(), e.message.unwrap_or_default()))
}

#[async_trait]
impl DataService for SupabaseClient {
  #[instrument(level = "info", skip(self), err)]
  async fn list_challenges(&self) -> Result<Vec<Challenge>, ServiceError> {
    let start = Instant::now();
    let req = self
      .client
      .get(self.table("challenges"))
      .query(&[("select", "*"), ("order", "challenge_number.asc")]);
    let rows: Vec<Challenge> = self.fetch(req).await?;
    debug!(target: "catalog", rows = rows.len(), elapsed = ?start.elapsed(), "challenges fetched");
    Ok(rows)
  }

  #[instrument(level = "info", skip(self, email), fields(email = %mask_email(email)), err)]
  async fn find_candidate_by_email(&self, email: &str) -> Result<Option<Candidate>, ServiceError> {
    let filter = format!("eq.{email}");
    let req = self
      .client
      .get(self.table("candidates"))
      .query(&[("select", "*"), ("email", filter.as_str()), ("limit", "1")]);
    let rows: Vec<Candidate> = self.fetch(req).await?;
    Ok(rows.into_iter().next())
  }

  #[instrument(level = "info", skip(self, candidate), fields(email = %mask_email(&candidate.email)), err)]
  async fn insert_candidate(&self, candidate: &NewCandidate) -> Result<Candidate, ServiceError> {
    let req = self
      .client
      .post(self.table("candidates"))
      .header(CONTENT_TYPE, "application/json")
      .header("Prefer", "return=representation")
      .json(candidate);
    let rows: Vec<Candidate> = self.fetch(req).await?;
    // An empty array means a policy filtered the returned row out.
    rows.into_iter().next().ok_or(ServiceError::EmptyInsert("candidates"))
  }

  #[instrument(level = "info", skip_all, fields(%candidate_id), err)]
  async fn list_submitted_challenge_ids(
    &self,
    candidate_id: &CandidateId,
  ) -> Result<Vec<ChallengeId>, ServiceError> {
    let filter = format!("eq.{}", candidate_id.0);
    let req = self
      .client
      .get(self.table("submissions"))
      .query(&[("select", "challenge_id"), ("candidate_id", filter.as_str())]);
    let rows: Vec<SubmissionRow> = self.fetch(req).await?;
    Ok(rows.into_iter().map(|r| r.challenge_id).collect())
  }

  #[instrument(level = "info", skip(self, submission),
               fields(candidate_id = %submission.candidate_id, challenge_id = %submission.challenge_id, answer_len = submission.answer.len()),
               err)]
  async fn insert_submission(&self, submission: &NewSubmission) -> Result<(), ServiceError> {
    let req = self
      .client
      .post(self.table("submissions"))
      .header(CONTENT_TYPE, "application/json")
      .header("Prefer", "return=minimal")
      .json(submission);
    checked(req.send().await?).await?;
    Ok(())
  }

  fn backend_name(&self) -> &'static str { "supabase" }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rest_base_appends_once() {
    assert_eq!(rest_base("https://abc.supabase.co"), "https://abc.supabase.co/rest/v1");
    assert_eq!(rest_base("https://abc.supabase.co/"), "https://abc.supabase.co/rest/v1");
    assert_eq!(rest_base("http://localhost:54321/rest/v1/"), "http://localhost:54321/rest/v1");
  }

  #[test]
  fn postgrest_error_body_is_parsed() {
    let body = r#"{"code":"23505","details":"Key (email)=(a@b.c) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"candidates_email_key\""}"#;
    let (code, message) = extract_postgrest_error(body).expect("parsed");
    assert_eq!(code, "23505");
    assert!(message.starts_with("duplicate key"));
    assert!(extract_postgrest_error("<html>bad gateway</html>").is_none());
  }

  #[test]
  fn client_builds_table_urls() {
    let client = SupabaseClient::new("https://abc.supabase.co", "anon", Duration::from_secs(5)).expect("client");
    assert_eq!(client.table("challenges"), "https://abc.supabase.co/rest/v1/challenges");
    assert_eq!(client.backend_name(), "supabase");
  }
}
