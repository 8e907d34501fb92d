//! Small utility helpers used across modules.

/// Mask an email for logs: keeps the first character of the local part and the domain.
/// `ada@example.com` becomes `a***@example.com`.
pub fn mask_email(email: &str) -> String {
  match email.split_once('@') {
    Some((local, domain)) => {
      let first: String = local.chars().take(1).collect();
      format!("{first}***@{domain}")
    }
    None => "***".to_string(),
  }
}

/// `None` for empty strings; the service expects `null` rather than `""` for optional text.
pub fn non_empty(s: &str) -> Option<String> {
  if s.is_empty() { None } else { Some(s.to_string()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn masks_local_part() {
    assert_eq!(mask_email("ada@example.com"), "a***@example.com");
    assert_eq!(mask_email("not-an-email"), "***");
    assert_eq!(mask_email("@x.io"), "***@x.io");
  }

  #[test]
  fn non_empty_keeps_whitespace_only_text() {
    assert_eq!(non_empty(""), None);
    assert_eq!(non_empty(" "), Some(" ".into()));
  }
}
