//! Type-ahead suggestion ranking.
//!
//! Backends produce candidates with a case-insensitive substring match on
//! title or url; [`rank`] scores and orders them.
//!
//! # Scoring
//!
//! Each field scores 0 without a match, otherwise `2` for a match at the
//! start of the field or `1` elsewhere, plus the share of the field the
//! pattern covers. The url is measured after stripping its scheme and a
//! leading `www.`, so typing a host name counts as a prefix match. The total
//! is `2 × title + url`. Equal totals put bookmarks before history; the sort
//! is stable, so remaining ties keep the backend's order.

use serde::{Deserialize, Serialize};

// ─── Types ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
  History  = 1,
  Bookmark = 2,
}

impl SuggestionKind {
  pub fn from_bookmark_flag(is_bookmark: bool) -> Self {
    if is_bookmark { Self::Bookmark } else { Self::History }
  }

  /// Numeric kind as shown to presentation layers.
  pub fn code(self) -> u8 { self as u8 }
}

/// A row matched by the backend, before ranking.
#[derive(Debug, Clone)]
pub struct Candidate {
  pub title: Option<String>,
  pub url:   String,
  pub kind:  SuggestionKind,
}

/// A ranked suggestion. `id` is the position in the ranked list and has no
/// relation to the storage id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
  pub id:    usize,
  pub title: Option<String>,
  pub url:   String,
  pub kind:  SuggestionKind,
}

// ─── Matching ────────────────────────────────────────────────────────────────

/// `%pattern%` for a SQL `LIKE ... ESCAPE '\'`, with the pattern's own
/// wildcards escaped.
pub fn like_pattern(pattern: &str) -> String {
  let mut out = String::with_capacity(pattern.len() + 2);
  out.push('%');
  for c in pattern.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

fn strip_url_prefix(url: &str) -> &str {
  let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
  rest.strip_prefix("www.").unwrap_or(rest)
}

/// Score of one field against an already-lowercased pattern.
fn field_score(field: &str, pattern: &str) -> f64 {
  if pattern.is_empty() || field.is_empty() {
    return 0.0;
  }
  let Some(pos) = field.find(pattern) else {
    return 0.0;
  };
  let position = if pos == 0 { 2.0 } else { 1.0 };
  let coverage =
    pattern.chars().count() as f64 / field.chars().count() as f64;
  position + coverage
}

/// Score of a candidate against `pattern`; higher ranks first.
pub fn score(pattern: &str, candidate: &Candidate) -> f64 {
  let pattern = pattern.to_lowercase();
  let title = candidate.title.as_deref().unwrap_or("").to_lowercase();
  let url = candidate.url.to_lowercase();
  2.0 * field_score(&title, &pattern)
    + field_score(strip_url_prefix(&url), &pattern)
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

/// Order candidates best first and number them from 0.
pub fn rank(pattern: &str, candidates: Vec<Candidate>) -> Vec<Suggestion> {
  let mut scored: Vec<(f64, Candidate)> = candidates
    .into_iter()
    .map(|c| (score(pattern, &c), c))
    .collect();

  scored.sort_by(|(sa, a), (sb, b)| {
    sb.total_cmp(sa).then_with(|| b.kind.cmp(&a.kind))
  });

  scored
    .into_iter()
    .enumerate()
    .map(|(id, (_, c))| Suggestion {
      id,
      title: c.title,
      url: c.url,
      kind: c.kind,
    })
    .collect()
}
