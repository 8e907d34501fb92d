//! Page handlers. Each action forwards to the page controller and redirects back to the
//! page (POST, then 303 to `GET /pages/:id`).

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;
use tracing::{error, info, instrument};

use crate::domain::ChallengeId;
use crate::logic::{bootstrap, close_challenge, open_challenge, register, submit};
use crate::protocol::{to_view, OpenForm, RegisterForm, SubmitForm};
use crate::session::CookieSession;
use crate::state::{AppState, PageCell, PageId};
use crate::view::PageTemplate;

/// Failure to produce a page; logged and answered with a bare 500.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("template render failed: {0}")]
    Render(#[from] askama::Error),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!(target: "assessment", error = %self, "Page error");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

async fn render(state: &AppState, id: PageId, page: &PageCell) -> Result<Html<String>, PageError> {
    let view = to_view(&*page.lock().await);
    let html = PageTemplate::new(id.to_string(), &state.config.branding, view).render()?;
    Ok(Html(html))
}

fn back_to(id: PageId) -> Response {
    Redirect::to(&format!("/pages/{id}")).into_response()
}

/// Page (re)load: a fresh page state, bootstrapped from the service and the session cookie.
#[instrument(level = "info", skip_all)]
pub async fn page_load(State(state): State<Arc<AppState>>, session: Session) -> Result<Html<String>, PageError> {
    let (id, page) = state.open_page().await;
    bootstrap(&state, &CookieSession(session), &page).await;
    info!(target: "assessment", page_id = %id, "Page opened");
    render(&state, id, &page).await
}

#[instrument(level = "info", skip(state))]
pub async fn page_show(State(state): State<Arc<AppState>>, Path(id): Path<PageId>) -> Result<Response, PageError> {
    match state.page(&id).await {
        Some(page) => Ok(render(&state, id, &page).await?.into_response()),
        None => Ok(Redirect::to("/").into_response()),
    }
}

#[instrument(level = "info", skip(state, session, form), fields(name_len = form.name.len()))]
pub async fn page_register(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PageId>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let Some(page) = state.page(&id).await else {
        return Redirect::to("/").into_response();
    };
    let outcome = register(&state, &CookieSession(session), &page, form.name, form.email).await;
    info!(target: "registration", page_id = %id, ?outcome, "Register handled");
    back_to(id)
}

#[instrument(level = "info", skip(state, form), fields(challenge_id = %form.challenge_id))]
pub async fn page_open(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PageId>,
    Form(form): Form<OpenForm>,
) -> Response {
    let Some(page) = state.page(&id).await else {
        return Redirect::to("/").into_response();
    };
    open_challenge(&page, ChallengeId(form.challenge_id)).await;
    back_to(id)
}

#[instrument(level = "info", skip(state))]
pub async fn page_close(State(state): State<Arc<AppState>>, Path(id): Path<PageId>) -> Response {
    let Some(page) = state.page(&id).await else {
        return Redirect::to("/").into_response();
    };
    close_challenge(&page).await;
    back_to(id)
}

#[instrument(level = "info", skip(state, form), fields(answer_len = form.answer.len()))]
pub async fn page_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PageId>,
    Form(form): Form<SubmitForm>,
) -> Response {
    let Some(page) = state.page(&id).await else {
        return Redirect::to("/").into_response();
    };
    let outcome = submit(&state, &page, form.answer, form.code_snippet).await;
    info!(target: "submission", page_id = %id, ?outcome, "Submit handled");
    back_to(id)
}
