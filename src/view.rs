//! HTML rendering: badge class mapping and the askama page template.

use askama::Template;

use crate::config::Branding;
use crate::domain::{Category, Difficulty};
use crate::protocol::PageView;

const NEUTRAL: &str = "badge-gray";

pub fn difficulty_class(d: &Difficulty) -> &'static str {
  match d {
    Difficulty::Easy => "badge-green",
    Difficulty::Medium => "badge-yellow",
    Difficulty::Hard => "badge-red",
    Difficulty::Other(_) => NEUTRAL,
  }
}

pub fn category_class(c: &Category) -> &'static str {
  match c {
    Category::Rls => "badge-purple",
    Category::Storage => "badge-blue",
    Category::Auth => "badge-orange",
    Category::Queries => "badge-cyan",
    Category::Migrations => "badge-pink",
    Category::Other(_) => NEUTRAL,
  }
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
  pub page_id: String,
  pub title: String,
  pub subtitle: String,
  pub footer: String,
  pub view: PageView,
}

impl PageTemplate {
  pub fn new(page_id: String, branding: &Branding, view: PageView) -> Self {
    Self {
      page_id,
      title: branding.title.clone(),
      subtitle: branding.subtitle.clone(),
      footer: branding.footer.clone(),
      view,
    }
  }
}
