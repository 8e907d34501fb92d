//! Form payloads accepted by the page routes and the serializable page view.
//! The same `PageView` feeds the HTML template and the JSON API.

use serde::{Deserialize, Serialize};

use crate::domain::Challenge;
use crate::page::PageState;
use crate::view::{category_class, difficulty_class};

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenForm {
    pub challenge_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub code_snippet: String,
}

#[derive(Debug, Serialize)]
pub struct CandidateView {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CardView {
    pub id: String,
    pub number: i32,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub difficulty_class: &'static str,
    pub category: String,
    pub category_class: &'static str,
    pub points: i32,
    pub submitted: bool,
}

#[derive(Debug, Serialize)]
pub struct ModalView {
    pub card: CardView,
    pub hint: Option<String>,
    pub answer: String,
    pub code_snippet: String,
    pub can_submit: bool,
    pub submitting: bool,
    pub submit_label: String,
}

#[derive(Debug, Serialize)]
pub struct PageView {
    pub loading: bool,
    pub catalog_unavailable: bool,
    pub notice: Option<&'static str>,
    pub candidate: Option<CandidateView>,
    pub name: String,
    pub email: String,
    pub can_register: bool,
    pub registering: bool,
    pub register_label: &'static str,
    pub completed: usize,
    pub total: usize,
    pub cards: Vec<CardView>,
    pub modal: Option<ModalView>,
}

fn card(c: &Challenge, submitted: bool) -> CardView {
    CardView {
        id: c.id.0.clone(),
        number: c.challenge_number,
        title: c.title.clone(),
        description: c.description.clone(),
        difficulty: c.difficulty.as_str().to_string(),
        difficulty_class: difficulty_class(&c.difficulty),
        category: c.category.as_str().to_string(),
        category_class: category_class(&c.category),
        points: c.points,
        submitted,
    }
}

/// Project the page state into what gets rendered.
pub fn to_view(page: &PageState) -> PageView {
    let modal = page.selected().map(|c| ModalView {
        card: card(c, false),
        hint: c.visible_hint().map(str::to_string),
        answer: page.answer().to_string(),
        code_snippet: page.code_snippet().to_string(),
        can_submit: page.can_submit(),
        submitting: page.submitting(),
        submit_label: if page.submitting() {
            "Submitting...".to_string()
        } else {
            format!("Submit Answer (+{} pts)", c.points)
        },
    });

    PageView {
        loading: page.loading(),
        catalog_unavailable: page.catalog_unavailable(),
        notice: page.notice().map(|n| n.message()),
        candidate: page.candidate().map(|c| CandidateView {
            id: c.id.0.clone(),
            name: c.name.clone(),
            email: c.email.clone(),
        }),
        name: page.name().to_string(),
        email: page.email().to_string(),
        can_register: page.can_register(),
        registering: page.registering(),
        register_label: if page.registering() { "Registering..." } else { "Start Assessment" },
        completed: page.completed_count(),
        total: page.catalog().len(),
        cards: page
            .catalog()
            .iter()
            .map(|c| card(c, page.is_submitted(&c.id)))
            .collect(),
        modal,
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub backend: &'static str,
    pub open_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candidate, CandidateId};
    use crate::page::Action;
    use crate::seeds::seed_challenges;

    #[test]
    fn view_tracks_counter_and_modal() {
        let mut page = PageState::new();
        page.apply(Action::CatalogLoaded(seed_challenges()));
        page.apply(Action::CandidateRecalled(Candidate {
            id: CandidateId("c".into()),
            email: "ada@example.com".into(),
            name: "Ada Lovelace".into(),
        }));
        page.apply(Action::SubmissionsLoaded(vec!["seed-05".into()]));
        page.apply(Action::ChallengeOpened("seed-03".into()));

        let view = to_view(&page);
        assert_eq!((view.completed, view.total), (1, 5));
        assert!(view.cards[4].submitted);
        assert!(!view.cards[0].submitted);
        let modal = view.modal.expect("modal");
        assert_eq!(modal.card.number, 3);
        // seed-03 has no hint
        assert!(modal.hint.is_none());
        assert!(!modal.can_submit);
        assert_eq!(modal.submit_label, "Submit Answer (+10 pts)");
    }

    #[test]
    fn register_label_follows_flight() {
        let mut page = PageState::new();
        page.apply(Action::NameEdited("Ada".into()));
        page.apply(Action::EmailEdited("ada@example.com".into()));
        assert_eq!(to_view(&page).register_label, "Start Assessment");
        page.apply(Action::RegistrationStarted);
        let view = to_view(&page);
        assert_eq!(view.register_label, "Registering...");
        assert!(view.registering);
        assert!(!view.can_register);
    }
}
