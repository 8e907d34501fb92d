//! Built-in challenge catalog used when no data service is configured.

use crate::domain::{Category, Challenge, ChallengeId, Difficulty};

#[allow(clippy::too_many_arguments)]
fn seed(
  id: &str,
  challenge_number: i32,
  title: &str,
  description: &str,
  difficulty: Difficulty,
  category: Category,
  points: i32,
  hint: Option<&str>,
) -> Challenge {
  Challenge {
    id: ChallengeId(id.into()),
    challenge_number,
    title: title.into(),
    description: description.into(),
    difficulty,
    category,
    points,
    hint: hint.map(Into::into),
  }
}

/// Minimal catalog that keeps the page useful without a hosted database.
pub fn seed_challenges() -> Vec<Challenge> {
  vec![
    seed(
      "seed-01",
      1,
      "Owner-only rows",
      "Write a row level security policy so that users can only read and update the rows they created in a `notes` table.",
      Difficulty::Easy,
      Category::Rls,
      10,
      Some("Compare the owner column against auth.uid()."),
    ),
    seed(
      "seed-02",
      2,
      "Private avatars bucket",
      "Configure a storage bucket where each user can upload exactly one avatar under a folder named after their id.",
      Difficulty::Medium,
      Category::Storage,
      20,
      Some("storage.foldername(name) returns the path segments."),
    ),
    seed(
      "seed-03",
      3,
      "Magic link sign-in",
      "Describe the client and server steps needed to sign a user in with a magic link and keep the session refreshed.",
      Difficulty::Easy,
      Category::Auth,
      10,
      None,
    ),
    seed(
      "seed-04",
      4,
      "Leaderboard query",
      "Return the top ten candidates by total points with a single query, including ties.",
      Difficulty::Hard,
      Category::Queries,
      30,
      Some("Window functions rank ties for you."),
    ),
    seed(
      "seed-05",
      5,
      "Zero-downtime column rename",
      "Plan a migration that renames a heavily used column without breaking clients that still read the old name.",
      Difficulty::Hard,
      Category::Migrations,
      30,
      None,
    ),
  ]
}
