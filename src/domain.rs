//! Domain models: challenges, candidates, submissions and their typed ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a challenge row (opaque string, usually a uuid).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(pub String);

/// Identifier of a candidate row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl fmt::Display for ChallengeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl fmt::Display for CandidateId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ChallengeId {
  fn from(s: &str) -> Self { Self(s.to_string()) }
}

/// How hard a challenge is. Unknown values survive a round trip as `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
  Other(String),
}

impl From<String> for Difficulty {
  fn from(s: String) -> Self {
    match s.as_str() {
      "easy" => Difficulty::Easy,
      "medium" => Difficulty::Medium,
      "hard" => Difficulty::Hard,
      _ => Difficulty::Other(s),
    }
  }
}

impl From<Difficulty> for String {
  fn from(d: Difficulty) -> Self { d.as_str().to_string() }
}

impl Difficulty {
  pub fn as_str(&self) -> &str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
      Difficulty::Other(s) => s,
    }
  }
}

/// Topic area of a challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
  Rls,
  Storage,
  Auth,
  Queries,
  Migrations,
  Other(String),
}

impl From<String> for Category {
  fn from(s: String) -> Self {
    match s.as_str() {
      "rls" => Category::Rls,
      "storage" => Category::Storage,
      "auth" => Category::Auth,
      "queries" => Category::Queries,
      "migrations" => Category::Migrations,
      _ => Category::Other(s),
    }
  }
}

impl From<Category> for String {
  fn from(c: Category) -> Self { c.as_str().to_string() }
}

impl Category {
  pub fn as_str(&self) -> &str {
    match self {
      Category::Rls => "rls",
      Category::Storage => "storage",
      Category::Auth => "auth",
      Category::Queries => "queries",
      Category::Migrations => "migrations",
      Category::Other(s) => s,
    }
  }
}

/// A fixed assessment question. Read-only from the page's point of view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
  pub id: ChallengeId,
  pub challenge_number: i32,
  pub title: String,
  pub description: String,
  pub difficulty: Difficulty,
  pub category: Category,
  pub points: i32,
  #[serde(default)] pub hint: Option<String>,
}

impl Challenge {
  /// Hint text worth rendering, if any.
  pub fn visible_hint(&self) -> Option<&str> {
    self.hint.as_deref().filter(|h| !h.is_empty())
  }
}

/// A registered test-taker, identified by email.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  pub id: CandidateId,
  pub email: String,
  pub name: String,
}

/// Insert payload for `candidates`.
#[derive(Clone, Debug, Serialize)]
pub struct NewCandidate {
  pub email: String,
  pub name: String,
}

/// Insert payload for `submissions`. `code_snippet` is sent as `null` when absent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewSubmission {
  pub candidate_id: CandidateId,
  pub challenge_id: ChallengeId,
  pub answer: String,
  pub code_snippet: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn challenge_row_decodes_with_unknown_enum_values() {
    let row = serde_json::json!({
      "id": "c-1",
      "challenge_number": 4,
      "title": "Policies",
      "description": "Write an RLS policy",
      "difficulty": "extreme",
      "category": "rls",
      "points": 30,
      "hint": null,
      "created_at": "2024-01-01T00:00:00Z"
    });
    let ch: Challenge = serde_json::from_value(row).expect("decode");
    assert_eq!(ch.difficulty, Difficulty::Other("extreme".into()));
    assert_eq!(ch.category, Category::Rls);
    assert_eq!(ch.hint, None);
    assert_eq!(ch.difficulty.as_str(), "extreme");
  }

  #[test]
  fn empty_hint_is_not_visible() {
    let mut ch = crate::seeds::seed_challenges().remove(0);
    ch.hint = Some(String::new());
    assert_eq!(ch.visible_hint(), None);
    ch.hint = Some("use auth.uid()".into());
    assert_eq!(ch.visible_hint(), Some("use auth.uid()"));
  }

  #[test]
  fn empty_code_snippet_serializes_as_null() {
    let sub = NewSubmission {
      candidate_id: CandidateId("cand".into()),
      challenge_id: "ch".into(),
      answer: "a".into(),
      code_snippet: None,
    };
    let v = serde_json::to_value(&sub).expect("encode");
    assert!(v["code_snippet"].is_null());
    assert_eq!(v["challenge_id"], "ch");
  }
}
