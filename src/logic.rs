//! Page controller: the network-backed operations of one page.
//!
//! Every operation follows the same shape: take the page lock, apply the action(s)
//! that start it, release the lock, call the data service, then apply the outcome.
//! The lock is never held across a service call.

use tracing::{debug, error, info, instrument, warn};

use crate::domain::{CandidateId, ChallengeId};
use crate::page::Action;
use crate::session::SessionStore;
use crate::state::{AppState, PageCell};
use crate::util::mask_email;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
  /// A new candidate row was created.
  Created,
  /// The email already existed; the stored candidate was adopted.
  Existing,
  /// Guard refused (empty field, already registered, request in flight). No call made.
  Rejected,
  Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
  Accepted,
  /// The service already holds a row for this (candidate, challenge).
  AlreadySubmitted,
  /// Guard refused (no selection, empty answer, request in flight). No call made.
  Rejected,
  Failed,
}

async fn dispatch(page: &PageCell, action: Action) -> bool {
  page.lock().await.apply(action)
}

/// Page load: fetch the catalog and recall the session concurrently.
#[instrument(level = "info", skip_all)]
pub async fn bootstrap(state: &AppState, session: &dyn SessionStore, page: &PageCell) {
  tokio::join!(load_catalog(state, page), recall_session(state, session, page));
}

#[instrument(level = "info", skip_all)]
pub async fn load_catalog(state: &AppState, page: &PageCell) {
  match state.service.list_challenges().await {
    Ok(rows) => {
      info!(target: "catalog", rows = rows.len(), backend = state.service.backend_name(), "Catalog loaded");
      dispatch(page, Action::CatalogLoaded(rows)).await;
    }
    Err(e) => {
      error!(target: "catalog", error = %e, "Catalog load failed");
      dispatch(page, Action::CatalogFailed).await;
    }
  }
}

/// Restore the candidate from the stored email. Returns the candidate id when found.
#[instrument(level = "info", skip_all)]
pub async fn recall_session(
  state: &AppState,
  session: &dyn SessionStore,
  page: &PageCell,
) -> Option<CandidateId> {
  let email = match session.load_email().await {
    Ok(Some(email)) => email,
    Ok(None) => {
      debug!(target: "registration", "No stored email; page starts unregistered");
      return None;
    }
    Err(e) => {
      warn!(target: "registration", error = %e, "Could not read session");
      return None;
    }
  };

  match state.service.find_candidate_by_email(&email).await {
    Ok(Some(candidate)) => {
      let id = candidate.id.clone();
      info!(target: "registration", candidate_id = %id, email = %mask_email(&email), "Session recalled");
      dispatch(page, Action::CandidateRecalled(candidate)).await;
      load_submissions(state, page, &id).await;
      Some(id)
    }
    Ok(None) => {
      warn!(target: "registration", email = %mask_email(&email), "Stored email has no candidate row");
      None
    }
    Err(e) => {
      error!(target: "registration", error = %e, "Candidate lookup failed during recall");
      None
    }
  }
}

/// Replace the page's submitted set with the service's view. Returns whether it succeeded.
#[instrument(level = "info", skip_all, fields(%candidate_id))]
pub async fn load_submissions(state: &AppState, page: &PageCell, candidate_id: &CandidateId) -> bool {
  match state.service.list_submitted_challenge_ids(candidate_id).await {
    Ok(ids) => {
      debug!(target: "submission", count = ids.len(), "Submissions loaded");
      dispatch(page, Action::SubmissionsLoaded(ids)).await;
      true
    }
    Err(e) => {
      error!(target: "submission", error = %e, "Submission load failed");
      false
    }
  }
}

/// Register with the given name/email, falling back to the existing row on a duplicate email.
#[instrument(level = "info", skip_all, fields(email = %mask_email(&email)))]
pub async fn register(
  state: &AppState,
  session: &dyn SessionStore,
  page: &PageCell,
  name: String,
  email: String,
) -> RegisterOutcome {
  let new = {
    let mut p = page.lock().await;
    p.apply(Action::NameEdited(name));
    p.apply(Action::EmailEdited(email));
    if !p.apply(Action::RegistrationStarted) {
      debug!(target: "registration", "Registration refused by guard");
      return RegisterOutcome::Rejected;
    }
    p.pending_candidate()
  };

  match state.service.insert_candidate(&new).await {
    Ok(candidate) => {
      info!(target: "registration", candidate_id = %candidate.id, "Candidate created");
      dispatch(page, Action::Registered(candidate)).await;
      remember(session, &new.email).await;
      RegisterOutcome::Created
    }
    Err(e) if e.is_unique_violation() => match state.service.find_candidate_by_email(&new.email).await {
      Ok(Some(existing)) => {
        let id = existing.id.clone();
        info!(target: "registration", candidate_id = %id, "Email already registered; adopting existing candidate");
        dispatch(page, Action::Registered(existing)).await;
        remember(session, &new.email).await;
        load_submissions(state, page, &id).await;
        RegisterOutcome::Existing
      }
      Ok(None) => {
        error!(target: "registration", "Duplicate email reported but no candidate found");
        dispatch(page, Action::RegistrationFailed).await;
        RegisterOutcome::Failed
      }
      Err(e) => {
        error!(target: "registration", error = %e, "Lookup after duplicate email failed");
        dispatch(page, Action::RegistrationFailed).await;
        RegisterOutcome::Failed
      }
    },
    Err(e) => {
      error!(target: "registration", error = %e, "Candidate insert failed");
      dispatch(page, Action::RegistrationFailed).await;
      RegisterOutcome::Failed
    }
  }
}

async fn remember(session: &dyn SessionStore, email: &str) {
  if let Err(e) = session.store_email(email).await {
    warn!(target: "registration", error = %e, "Could not persist candidate email");
  }
}

#[instrument(level = "info", skip_all, fields(%challenge_id))]
pub async fn open_challenge(page: &PageCell, challenge_id: ChallengeId) -> bool {
  let opened = dispatch(page, Action::ChallengeOpened(challenge_id)).await;
  if !opened {
    debug!(target: "submission", "Open refused (submitted, unknown, or modal already open)");
  }
  opened
}

#[instrument(level = "info", skip(page))]
pub async fn close_challenge(page: &PageCell) {
  dispatch(page, Action::ModalClosed).await;
}

/// Submit the selected challenge with the given answer and optional code.
#[instrument(level = "info", skip_all, fields(answer_len = answer.len(), code_len = code_snippet.len()))]
pub async fn submit(state: &AppState, page: &PageCell, answer: String, code_snippet: String) -> SubmitOutcome {
  let submission = {
    let mut p = page.lock().await;
    p.apply(Action::AnswerEdited(answer));
    p.apply(Action::CodeSnippetEdited(code_snippet));
    let Some(submission) = p.pending_submission() else {
      return SubmitOutcome::Rejected;
    };
    if !p.apply(Action::SubmissionStarted) {
      debug!(target: "submission", "Submit refused by guard");
      return SubmitOutcome::Rejected;
    }
    submission
  };

  let challenge_id = submission.challenge_id.clone();
  match state.service.insert_submission(&submission).await {
    Ok(()) => {
      info!(target: "submission", %challenge_id, candidate_id = %submission.candidate_id, "Submission recorded");
      dispatch(page, Action::SubmissionAccepted(challenge_id)).await;
      if state.config.service.reconcile_after_submit {
        load_submissions(state, page, &submission.candidate_id).await;
      }
      SubmitOutcome::Accepted
    }
    Err(e) if e.is_unique_violation() => {
      warn!(target: "submission", %challenge_id, "Challenge already submitted for this candidate");
      dispatch(page, Action::SubmissionAccepted(challenge_id)).await;
      SubmitOutcome::AlreadySubmitted
    }
    Err(e) => {
      error!(target: "submission", %challenge_id, error = %e, "Submission insert failed");
      dispatch(page, Action::SubmissionFailed).await;
      SubmitOutcome::Failed
    }
  }
}
