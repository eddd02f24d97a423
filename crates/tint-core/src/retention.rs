//! Retention policy: how long history is kept, and how deletions merge the
//! bookmark and history facets of a record.
//!
//! The merge rules are pure functions over [`RecordState`]; backends look up
//! the state, ask for a [`DeleteAction`] and apply it within one transaction.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, calendar, record::DeleteOutcome};

/// History horizon used when the configured value cannot be parsed.
pub const DEFAULT_HISTORY_SIZE_DAYS: u32 = 90;

// ─── History size ────────────────────────────────────────────────────────────

/// Strict parse of a configured history size, in days.
pub fn try_parse_history_size(raw: &str) -> Result<u32> {
  raw
    .trim()
    .parse()
    .map_err(|_| Error::InvalidHistorySize(raw.to_owned()))
}

/// Lenient parse of a configured history size: anything unparseable falls
/// back to [`DEFAULT_HISTORY_SIZE_DAYS`].
pub fn parse_history_size(raw: &str) -> u32 {
  try_parse_history_size(raw).unwrap_or_else(|e| {
    tracing::warn!(
      "{e}; keeping {DEFAULT_HISTORY_SIZE_DAYS} days of history"
    );
    DEFAULT_HISTORY_SIZE_DAYS
  })
}

/// Visits strictly before this instant are expired: local midnight today
/// minus `max_age_days` calendar days.
pub fn truncation_threshold(now: DateTime<Local>, max_age_days: u32) -> DateTime<Utc> {
  calendar::days_before(now, max_age_days).with_timezone(&Utc)
}

/// Rows touched by a truncation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncateReport {
  /// Expired pure-history rows removed.
  pub deleted: usize,
  /// Expired bookmarks whose visit stats were reset.
  pub demoted: usize,
}

// ─── Merge rules ─────────────────────────────────────────────────────────────

/// The facets of a record that decide how a deletion is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordState {
  pub is_bookmark: bool,
  pub visit_count: u32,
}

/// What a backend must do to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAction {
  /// Delete the row.
  Remove,
  /// Clear the bookmark flag, creation date and thumbnail; keep the visits.
  ClearBookmark,
  /// Reset the visit count and visited date; keep the bookmark.
  ResetVisits,
  Nothing,
}

impl From<DeleteAction> for DeleteOutcome {
  fn from(a: DeleteAction) -> Self {
    match a {
      DeleteAction::Remove => DeleteOutcome::Removed,
      DeleteAction::ClearBookmark => DeleteOutcome::BookmarkCleared,
      DeleteAction::ResetVisits => DeleteOutcome::VisitsReset,
      DeleteAction::Nothing => DeleteOutcome::Unchanged,
    }
  }
}

/// Deleting the bookmark facet. A visited bookmark falls back to a plain
/// history entry; an unvisited row has nothing left and is removed, whether
/// or not its flag is still set.
pub fn on_delete_bookmark(state: RecordState) -> DeleteAction {
  match (state.is_bookmark, state.visit_count > 0) {
    (true, true) => DeleteAction::ClearBookmark,
    (false, true) => DeleteAction::Nothing,
    (_, false) => DeleteAction::Remove,
  }
}

/// Deleting the history facet. A bookmark keeps its row with its visits
/// forgotten; anything else is removed.
pub fn on_delete_history(state: RecordState) -> DeleteAction {
  if state.is_bookmark {
    DeleteAction::ResetVisits
  } else {
    DeleteAction::Remove
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn state(is_bookmark: bool, visit_count: u32) -> RecordState {
    RecordState { is_bookmark, visit_count }
  }

  #[test]
  fn history_size_falls_back_to_ninety_days() {
    assert_eq!(parse_history_size("30"), 30);
    assert_eq!(parse_history_size(" 7 "), 7);
    assert_eq!(parse_history_size("a month"), DEFAULT_HISTORY_SIZE_DAYS);
    assert_eq!(parse_history_size("-3"), DEFAULT_HISTORY_SIZE_DAYS);
    assert!(matches!(
      try_parse_history_size(""),
      Err(Error::InvalidHistorySize(_))
    ));
  }

  #[test]
  fn threshold_is_midnight_based() {
    let now = Local::now();
    let t = truncation_threshold(now, 30);
    assert_eq!(t, calendar::days_before(now, 30).with_timezone(&Utc));
    assert!(t < now.with_timezone(&Utc));
  }

  #[test]
  fn delete_bookmark_rules() {
    assert_eq!(on_delete_bookmark(state(true, 4)), DeleteAction::ClearBookmark);
    assert_eq!(on_delete_bookmark(state(true, 0)), DeleteAction::Remove);
    assert_eq!(on_delete_bookmark(state(false, 0)), DeleteAction::Remove);
    assert_eq!(on_delete_bookmark(state(false, 2)), DeleteAction::Nothing);
  }

  #[test]
  fn delete_history_rules() {
    assert_eq!(on_delete_history(state(true, 4)), DeleteAction::ResetVisits);
    assert_eq!(on_delete_history(state(true, 0)), DeleteAction::ResetVisits);
    assert_eq!(on_delete_history(state(false, 3)), DeleteAction::Remove);
  }
}
