//! Server configuration: optional TOML file plus environment overrides.
//!
//! ```toml
//! [branding]
//! title = "IGTA-Tech Skills Assessment"
//!
//! [service]
//! url = "https://xyz.supabase.co"
//! anon_key = "..."
//! request_timeout_secs = 20
//! reconcile_after_submit = false
//!
//! [pages]
//! ttl_secs = 21600
//! session_days = 30
//!
//! [[challenges]]          # only used by the in-memory backend
//! challenge_number = 1
//! title = "Owner-only rows"
//! description = "..."
//! difficulty = "easy"
//! category = "rls"
//! points = 10
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Challenge, ChallengeId};
use crate::seeds::seed_challenges;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub branding: Branding,
  #[serde(default)]
  pub service: ServiceSettings,
  #[serde(default)]
  pub pages: PageSettings,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Branding {
  pub title: String,
  pub subtitle: String,
  pub footer: String,
}

impl Default for Branding {
  fn default() -> Self {
    Self {
      title: "IGTA-Tech Skills Assessment".into(),
      subtitle: "Supabase & Full-Stack Developer Evaluation".into(),
      footer: "IGTA-Tech Skills Assessment Platform".into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
  pub url: Option<String>,
  pub anon_key: Option<String>,
  pub request_timeout_secs: u64,
  /// Re-fetch submissions after a successful submit instead of trusting the local update alone.
  pub reconcile_after_submit: bool,
}

impl Default for ServiceSettings {
  fn default() -> Self {
    Self { url: None, anon_key: None, request_timeout_secs: 20, reconcile_after_submit: false }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PageSettings {
  /// Idle pages older than this are dropped when a new page opens.
  pub ttl_secs: u64,
  /// Lifetime of the candidate cookie after the last visit.
  pub session_days: i64,
  pub secure_cookie: bool,
  /// SQLite database holding session records; survives restarts.
  pub session_db: String,
}

impl Default for PageSettings {
  fn default() -> Self {
    Self {
      ttl_secs: 6 * 60 * 60,
      session_days: 30,
      secure_cookie: false,
      session_db: "sqlite://assessment-sessions.db?mode=rwc".to_string(),
    }
  }
}

/// Challenge entry accepted in TOML configuration (in-memory backend only).
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  #[serde(default)] pub id: Option<String>,
  pub challenge_number: i32,
  pub title: String,
  pub description: String,
  pub difficulty: String,
  pub category: String,
  #[serde(default)] pub points: i32,
  #[serde(default)] pub hint: Option<String>,
}

impl AppConfig {
  /// Load from ASSESSMENT_CONFIG_PATH (if set) and apply SUPABASE_URL / SUPABASE_ANON_KEY.
  /// A missing or broken file is logged and replaced by defaults.
  pub fn from_env() -> Self {
    let base = std::env::var("ASSESSMENT_CONFIG_PATH")
      .ok()
      .and_then(|path| load_file(&path))
      .unwrap_or_default();
    base.with_overrides(std::env::var("SUPABASE_URL").ok(), std::env::var("SUPABASE_ANON_KEY").ok())
  }

  pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(s)
  }

  /// Environment values win over file values; empty strings are ignored.
  pub fn with_overrides(mut self, url: Option<String>, anon_key: Option<String>) -> Self {
    if let Some(url) = url.filter(|u| !u.is_empty()) {
      self.service.url = Some(url);
    }
    if let Some(key) = anon_key.filter(|k| !k.is_empty()) {
      self.service.anon_key = Some(key);
    }
    self
  }

  /// URL and key of the hosted service, when both are configured.
  pub fn supabase(&self) -> Option<(&str, &str)> {
    match (&self.service.url, &self.service.anon_key) {
      (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
      _ => None,
    }
  }

  /// Catalog for the in-memory backend: TOML challenges, or the built-in seeds.
  pub fn local_catalog(&self) -> Vec<Challenge> {
    if self.challenges.is_empty() {
      return seed_challenges();
    }
    self
      .challenges
      .iter()
      .map(|c| Challenge {
        id: ChallengeId(c.id.clone().unwrap_or_else(|| format!("bank-{:02}", c.challenge_number))),
        challenge_number: c.challenge_number,
        title: c.title.clone(),
        description: c.description.clone(),
        difficulty: c.difficulty.clone().into(),
        category: c.category.clone().into(),
        points: c.points,
        hint: c.hint.clone(),
      })
      .collect()
  }
}

fn load_file(path: &str) -> Option<AppConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match AppConfig::from_toml(&s) {
      Ok(cfg) => {
        info!(target: "assessment", %path, challenges = cfg.challenges.len(), "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "assessment", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "assessment", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Category, Difficulty};

  #[test]
  fn empty_file_gives_defaults() {
    let cfg = AppConfig::from_toml("").expect("parse");
    assert_eq!(cfg.branding.title, "IGTA-Tech Skills Assessment");
    assert_eq!(cfg.service.request_timeout_secs, 20);
    assert!(!cfg.service.reconcile_after_submit);
    assert!(cfg.supabase().is_none());
    assert_eq!(cfg.local_catalog().len(), seed_challenges().len());
  }

  #[test]
  fn partial_sections_keep_other_defaults() {
    let cfg = AppConfig::from_toml(
      r#"
      [service]
      reconcile_after_submit = true

      [pages]
      session_days = 7

      [[challenges]]
      challenge_number = 2
      title = "Buckets"
      description = "Make a bucket"
      difficulty = "medium"
      category = "storage"
      points = 15
      "#,
    )
    .expect("parse");
    assert!(cfg.service.reconcile_after_submit);
    assert_eq!(cfg.service.request_timeout_secs, 20);
    assert_eq!(cfg.pages.session_days, 7);
    assert_eq!(cfg.pages.ttl_secs, 6 * 60 * 60);
    assert_eq!(cfg.pages.session_db, "sqlite://assessment-sessions.db?mode=rwc");

    let catalog = cfg.local_catalog();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id.0, "bank-02");
    assert_eq!(catalog[0].difficulty, Difficulty::Medium);
    assert_eq!(catalog[0].category, Category::Storage);
  }

  #[test]
  fn env_overrides_win_and_need_both_values() {
    let cfg = AppConfig::default().with_overrides(Some("https://abc.supabase.co".into()), None);
    assert!(cfg.supabase().is_none());
    let cfg = cfg.with_overrides(None, Some("anon".into()));
    assert_eq!(cfg.supabase(), Some(("https://abc.supabase.co", "anon")));
    let cfg = cfg.with_overrides(Some(String::new()), None);
    assert_eq!(cfg.service.url.as_deref(), Some("https://abc.supabase.co"));
  }
}
