//! The unified bookmark/history row.
//!
//! A record is a bookmark when `is_bookmark` is set and a history entry when
//! it has been visited at least once; it can be both at the same time. A
//! record that is neither does not exist: the store deletes it instead.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, retention::RecordState};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Surrogate key assigned by the store at creation; never reused.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One row of the history/bookmarks table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
  pub id:            RecordId,
  pub title:         Option<String>,
  pub url:           String,
  pub visit_count:   u32,
  /// Set iff `is_bookmark`.
  pub creation_date: Option<DateTime<Utc>>,
  /// Set iff `visit_count > 0`.
  pub visited_date:  Option<DateTime<Utc>>,
  pub is_bookmark:   bool,
  /// Encoded image bytes supplied by the page loader; never interpreted.
  #[serde(skip)]
  pub favicon:       Option<Vec<u8>>,
  /// Only kept for bookmarks.
  #[serde(skip)]
  pub thumbnail:     Option<Vec<u8>>,
}

impl Record {
  pub fn is_history(&self) -> bool { self.visit_count > 0 }

  /// The title, falling back to the url for untitled pages.
  pub fn display_title(&self) -> &str {
    self
      .title
      .as_deref()
      .filter(|t| !t.is_empty())
      .unwrap_or(&self.url)
  }

  /// The fields the merge rules in [`crate::retention`] look at.
  pub fn state(&self) -> RecordState {
    RecordState {
      is_bookmark: self.is_bookmark,
      visit_count: self.visit_count,
    }
  }
}

// ─── NewRecord ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::BookmarkStore::insert_raw_record`]: a complete
/// record as produced by an import. The id is always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
  pub title:         Option<String>,
  pub url:           String,
  #[serde(default)]
  pub visit_count:   u32,
  pub visited_date:  Option<DateTime<Utc>>,
  pub creation_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub is_bookmark:   bool,
}

impl NewRecord {
  /// Bring the optional dates in line with the record invariants.
  ///
  /// Dates that contradict the flags are dropped; a bookmark without a
  /// creation date, or a visited record without a visit date, gets `now`.
  /// Fails for a record that would be neither a bookmark nor history.
  pub fn normalized(mut self, now: DateTime<Utc>) -> Result<Self> {
    if !self.is_bookmark && self.visit_count == 0 {
      return Err(Error::EmptyRecord(self.url));
    }

    self.creation_date = if self.is_bookmark {
      Some(self.creation_date.unwrap_or(now))
    } else {
      None
    };

    self.visited_date = if self.visit_count > 0 {
      Some(self.visited_date.unwrap_or(now))
    } else {
      None
    };

    Ok(self)
  }
}

impl From<Record> for NewRecord {
  fn from(r: Record) -> Self {
    NewRecord {
      title:         r.title,
      url:           r.url,
      visit_count:   r.visit_count,
      visited_date:  r.visited_date,
      creation_date: r.creation_date,
      is_bookmark:   r.is_bookmark,
    }
  }
}

// ─── DeleteOutcome ───────────────────────────────────────────────────────────

/// What a bookmark or history deletion did to the targeted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
  /// The row was deleted.
  Removed,
  /// The row stays as pure history; bookmark flag and creation date cleared.
  BookmarkCleared,
  /// The row stays as an unvisited bookmark; visit stats reset.
  VisitsReset,
  /// The row exists but there was nothing to delete on that facet.
  Unchanged,
  NotFound,
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn new_record(visit_count: u32, is_bookmark: bool) -> NewRecord {
    NewRecord {
      title: Some("Example".into()),
      url: "https://example.com/".into(),
      visit_count,
      visited_date: None,
      creation_date: None,
      is_bookmark,
    }
  }

  #[test]
  fn normalized_fills_missing_dates() {
    let now = Utc::now();
    let r = new_record(3, true).normalized(now).unwrap();
    assert_eq!(r.visited_date, Some(now));
    assert_eq!(r.creation_date, Some(now));
  }

  #[test]
  fn normalized_drops_contradicting_dates() {
    let now = Utc::now();
    let mut input = new_record(0, true);
    input.visited_date = Some(now - Duration::days(2));
    let r = input.normalized(now).unwrap();
    assert!(r.visited_date.is_none());

    let mut input = new_record(2, false);
    input.creation_date = Some(now - Duration::days(2));
    let r = input.normalized(now).unwrap();
    assert!(r.creation_date.is_none());
  }

  #[test]
  fn normalized_rejects_empty_record() {
    let err = new_record(0, false).normalized(Utc::now()).unwrap_err();
    assert!(matches!(err, Error::EmptyRecord(_)));
  }

  #[test]
  fn display_title_falls_back_to_url() {
    let r = Record {
      id:            RecordId(1),
      title:         Some(String::new()),
      url:           "https://example.com/".into(),
      visit_count:   1,
      creation_date: None,
      visited_date:  Some(Utc::now()),
      is_bookmark:   false,
      favicon:       None,
      thumbnail:     None,
    };
    assert_eq!(r.display_title(), "https://example.com/");
  }
}
