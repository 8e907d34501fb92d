//! Page state container and its per-action update function.
//!
//! `PageState` holds everything one opened page knows: the catalog, the active
//! candidate, the registration and modal drafts, in-flight flags and the set of
//! submitted challenge ids. All mutation goes through `PageState::apply`, which
//! returns `false` when an action is refused by its guard (and then changes nothing).

use std::collections::HashSet;

use crate::domain::{Candidate, Challenge, ChallengeId, NewCandidate, NewSubmission};
use crate::util::non_empty;

/// User-visible failure of the last action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
  RegistrationFailed,
  SubmissionFailed,
}

impl Notice {
  pub fn message(&self) -> &'static str {
    match self {
      Notice::RegistrationFailed => "Registration failed, please try again.",
      Notice::SubmissionFailed => "Submission failed, please try again.",
    }
  }
}

#[derive(Clone, Debug)]
pub enum Action {
  CatalogLoaded(Vec<Challenge>),
  CatalogFailed,
  CandidateRecalled(Candidate),
  SubmissionsLoaded(Vec<ChallengeId>),
  NameEdited(String),
  EmailEdited(String),
  RegistrationStarted,
  Registered(Candidate),
  RegistrationFailed,
  ChallengeOpened(ChallengeId),
  ModalClosed,
  AnswerEdited(String),
  CodeSnippetEdited(String),
  SubmissionStarted,
  SubmissionAccepted(ChallengeId),
  SubmissionFailed,
}

#[derive(Clone, Debug)]
pub struct PageState {
  loading: bool,
  catalog_unavailable: bool,
  catalog: Vec<Challenge>,
  candidate: Option<Candidate>,
  name: String,
  email: String,
  registering: bool,
  selected: Option<Challenge>,
  answer: String,
  code_snippet: String,
  submitting: bool,
  // Raw ids as reported by the service; may briefly precede the catalog.
  submitted: HashSet<ChallengeId>,
  notice: Option<Notice>,
}

impl Default for PageState {
  fn default() -> Self {
    Self {
      loading: true,
      catalog_unavailable: false,
      catalog: Vec::new(),
      candidate: None,
      name: String::new(),
      email: String::new(),
      registering: false,
      selected: None,
      answer: String::new(),
      code_snippet: String::new(),
      submitting: false,
      submitted: HashSet::new(),
      notice: None,
    }
  }
}

impl PageState {
  pub fn new() -> Self { Self::default() }

  /// Apply one action. Returns whether it was accepted.
  pub fn apply(&mut self, action: Action) -> bool {
    match action {
      Action::CatalogLoaded(mut rows) => {
        rows.sort_by_key(|c| c.challenge_number);
        self.catalog = rows;
        self.catalog_unavailable = false;
        self.loading = false;
        true
      }
      Action::CatalogFailed => {
        self.catalog_unavailable = true;
        self.loading = false;
        true
      }
      Action::CandidateRecalled(candidate) => {
        self.candidate = Some(candidate);
        true
      }
      Action::SubmissionsLoaded(ids) => {
        self.submitted = ids.into_iter().collect();
        true
      }
      Action::NameEdited(name) => {
        self.name = name;
        true
      }
      Action::EmailEdited(email) => {
        self.email = email;
        true
      }
      Action::RegistrationStarted => {
        if !self.can_register() {
          return false;
        }
        self.registering = true;
        self.notice = None;
        true
      }
      Action::Registered(candidate) => {
        self.candidate = Some(candidate);
        self.registering = false;
        true
      }
      Action::RegistrationFailed => {
        self.registering = false;
        self.notice = Some(Notice::RegistrationFailed);
        true
      }
      Action::ChallengeOpened(id) => {
        if self.candidate.is_none() || self.selected.is_some() || self.submitted.contains(&id) {
          return false;
        }
        match self.catalog.iter().find(|c| c.id == id) {
          Some(challenge) => {
            self.selected = Some(challenge.clone());
            self.notice = None;
            true
          }
          None => false,
        }
      }
      Action::ModalClosed => {
        self.selected = None;
        self.answer.clear();
        self.code_snippet.clear();
        self.notice = None;
        true
      }
      Action::AnswerEdited(answer) => {
        if self.selected.is_none() {
          return false;
        }
        self.answer = answer;
        true
      }
      Action::CodeSnippetEdited(code) => {
        if self.selected.is_none() {
          return false;
        }
        self.code_snippet = code;
        true
      }
      Action::SubmissionStarted => {
        if !self.can_submit() {
          return false;
        }
        self.submitting = true;
        self.notice = None;
        true
      }
      Action::SubmissionAccepted(id) => {
        self.submitted.insert(id);
        self.selected = None;
        self.answer.clear();
        self.code_snippet.clear();
        self.submitting = false;
        true
      }
      Action::SubmissionFailed => {
        self.submitting = false;
        self.notice = Some(Notice::SubmissionFailed);
        true
      }
    }
  }

  pub fn can_register(&self) -> bool {
    self.candidate.is_none() && !self.registering && !self.name.is_empty() && !self.email.is_empty()
  }

  pub fn can_submit(&self) -> bool {
    self.candidate.is_some() && self.selected.is_some() && !self.answer.is_empty() && !self.submitting
  }

  /// Payload for the registration insert, built from the current drafts.
  pub fn pending_candidate(&self) -> NewCandidate {
    NewCandidate { email: self.email.clone(), name: self.name.clone() }
  }

  /// Payload for the submission insert; `None` without a candidate or selection.
  pub fn pending_submission(&self) -> Option<NewSubmission> {
    let candidate = self.candidate.as_ref()?;
    let challenge = self.selected.as_ref()?;
    Some(NewSubmission {
      candidate_id: candidate.id.clone(),
      challenge_id: challenge.id.clone(),
      answer: self.answer.clone(),
      code_snippet: non_empty(&self.code_snippet),
    })
  }

  /// Submitted and present in the catalog.
  pub fn is_submitted(&self, id: &ChallengeId) -> bool {
    self.submitted.contains(id) && self.catalog.iter().any(|c| &c.id == id)
  }

  /// Number of catalog challenges with a recorded submission.
  pub fn completed_count(&self) -> usize {
    self.catalog.iter().filter(|c| self.submitted.contains(&c.id)).count()
  }

  pub fn loading(&self) -> bool { self.loading }
  pub fn catalog_unavailable(&self) -> bool { self.catalog_unavailable }
  pub fn catalog(&self) -> &[Challenge] { &self.catalog }
  pub fn candidate(&self) -> Option<&Candidate> { self.candidate.as_ref() }
  pub fn name(&self) -> &str { &self.name }
  pub fn email(&self) -> &str { &self.email }
  pub fn registering(&self) -> bool { self.registering }
  pub fn selected(&self) -> Option<&Challenge> { self.selected.as_ref() }
  pub fn answer(&self) -> &str { &self.answer }
  pub fn code_snippet(&self) -> &str { &self.code_snippet }
  pub fn submitting(&self) -> bool { self.submitting }
  pub fn notice(&self) -> Option<Notice> { self.notice }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::CandidateId;
  use crate::seeds::seed_challenges;

  fn ada() -> Candidate {
    Candidate { id: CandidateId("cand-1".into()), email: "ada@example.com".into(), name: "Ada Lovelace".into() }
  }

  fn registered_page() -> PageState {
    let mut page = PageState::new();
    page.apply(Action::CatalogLoaded(seed_challenges()));
    page.apply(Action::CandidateRecalled(ada()));
    page
  }

  #[test]
  fn loading_clears_only_on_catalog_outcome() {
    let mut page = PageState::new();
    assert!(page.loading());
    page.apply(Action::CandidateRecalled(ada()));
    assert!(page.loading());
    page.apply(Action::CatalogFailed);
    assert!(!page.loading());
    assert!(page.catalog_unavailable());
    assert!(page.catalog().is_empty());
  }

  #[test]
  fn catalog_is_kept_in_sequence_order() {
    let mut rows = seed_challenges();
    rows.swap(0, 4);
    rows.swap(1, 3);
    let mut page = PageState::new();
    page.apply(Action::CatalogLoaded(rows));
    let numbers: Vec<i32> = page.catalog().iter().map(|c| c.challenge_number).collect();
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]), "{numbers:?}");
  }

  #[test]
  fn registration_needs_both_fields() {
    let mut page = PageState::new();
    assert!(!page.can_register());
    page.apply(Action::NameEdited("Ada Lovelace".into()));
    assert!(!page.can_register());
    assert!(!page.apply(Action::RegistrationStarted));
    page.apply(Action::EmailEdited("ada@example.com".into()));
    page.apply(Action::NameEdited(String::new()));
    assert!(!page.can_register());
    page.apply(Action::NameEdited("Ada Lovelace".into()));
    assert!(page.can_register());
    assert!(page.apply(Action::RegistrationStarted));
    assert!(page.registering());
    // In flight: a second start is refused.
    assert!(!page.apply(Action::RegistrationStarted));
  }

  #[test]
  fn failed_registration_keeps_drafts_and_shows_notice() {
    let mut page = PageState::new();
    page.apply(Action::NameEdited("Ada".into()));
    page.apply(Action::EmailEdited("ada@example.com".into()));
    page.apply(Action::RegistrationStarted);
    page.apply(Action::RegistrationFailed);
    assert!(page.candidate().is_none());
    assert!(!page.registering());
    assert_eq!(page.email(), "ada@example.com");
    assert_eq!(page.notice(), Some(Notice::RegistrationFailed));
  }

  #[test]
  fn submitted_challenge_cannot_be_reopened() {
    let mut page = registered_page();
    page.apply(Action::SubmissionsLoaded(vec!["seed-02".into()]));
    assert!(!page.apply(Action::ChallengeOpened("seed-02".into())));
    assert!(page.selected().is_none());
    assert!(page.apply(Action::ChallengeOpened("seed-01".into())));
    assert_eq!(page.selected().map(|c| c.challenge_number), Some(1));
  }

  #[test]
  fn unknown_challenge_or_no_candidate_is_refused() {
    let mut page = PageState::new();
    page.apply(Action::CatalogLoaded(seed_challenges()));
    assert!(!page.apply(Action::ChallengeOpened("seed-01".into())));
    page.apply(Action::CandidateRecalled(ada()));
    assert!(!page.apply(Action::ChallengeOpened("missing".into())));
  }

  #[test]
  fn closing_discards_drafts() {
    let mut page = registered_page();
    page.apply(Action::ChallengeOpened("seed-01".into()));
    page.apply(Action::AnswerEdited("draft".into()));
    page.apply(Action::CodeSnippetEdited("select 1;".into()));
    page.apply(Action::ModalClosed);
    assert!(page.selected().is_none());
    assert_eq!(page.answer(), "");
    assert_eq!(page.code_snippet(), "");
    // No drafts survive a reopen.
    page.apply(Action::ChallengeOpened("seed-01".into()));
    assert_eq!(page.answer(), "");
  }

  #[test]
  fn submit_requires_answer() {
    let mut page = registered_page();
    page.apply(Action::ChallengeOpened("seed-01".into()));
    assert!(!page.can_submit());
    assert!(!page.apply(Action::SubmissionStarted));
    page.apply(Action::AnswerEdited("uses auth.uid() in policy".into()));
    assert!(page.can_submit());
    assert!(page.apply(Action::SubmissionStarted));
    assert!(!page.can_submit());
  }

  #[test]
  fn accepted_submission_closes_modal_and_counts() {
    let mut page = registered_page();
    page.apply(Action::ChallengeOpened("seed-01".into()));
    page.apply(Action::AnswerEdited("uses auth.uid() in policy".into()));
    let pending = page.pending_submission().expect("pending");
    assert_eq!(pending.code_snippet, None);
    page.apply(Action::SubmissionStarted);
    page.apply(Action::SubmissionAccepted(pending.challenge_id));
    assert!(page.selected().is_none());
    assert_eq!(page.answer(), "");
    assert!(page.is_submitted(&"seed-01".into()));
    assert_eq!(page.completed_count(), 1);
  }

  #[test]
  fn failed_submission_keeps_text() {
    let mut page = registered_page();
    page.apply(Action::ChallengeOpened("seed-03".into()));
    page.apply(Action::AnswerEdited("answer".into()));
    page.apply(Action::CodeSnippetEdited("code".into()));
    page.apply(Action::SubmissionStarted);
    page.apply(Action::SubmissionFailed);
    assert_eq!(page.selected().map(|c| c.id.0.as_str()), Some("seed-03"));
    assert_eq!(page.answer(), "answer");
    assert_eq!(page.code_snippet(), "code");
    assert_eq!(page.notice(), Some(Notice::SubmissionFailed));
    assert!(page.can_submit());
  }

  #[test]
  fn completion_counts_only_catalog_ids() {
    let mut page = PageState::new();
    // Submissions may land before the catalog.
    page.apply(Action::SubmissionsLoaded(vec!["seed-01".into(), "seed-01".into(), "retired".into()]));
    assert_eq!(page.completed_count(), 0);
    page.apply(Action::CatalogLoaded(seed_challenges()));
    assert_eq!(page.completed_count(), 1);
    assert!(!page.is_submitted(&"retired".into()));
    assert!(page.completed_count() <= page.catalog().len());
  }
}
