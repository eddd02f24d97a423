//! Read views: fixed predicate, ordering and row limit descriptions that
//! collaborators execute against a [`crate::store::BookmarkStore`].
//!
//! Views are plain data; backends render them into their own query language.
//! [`ReadView::matches`] and [`ReadView::compare`] state the same semantics in
//! memory.

use std::cmp::Ordering;

use chrono::{DateTime, Local, Utc};

use crate::{calendar, record::Record};

/// How many days back the start page looks for recently visited records.
pub const START_PAGE_WINDOW_DAYS: u32 = 14;

// ─── Filter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFilter {
  /// Every record.
  All,
  /// Records whose `visited_date` is strictly after the instant.
  VisitedAfter(DateTime<Utc>),
  /// Records with the bookmark flag set.
  Bookmarked,
  /// Records with at least one visit.
  Visited,
}

impl ViewFilter {
  pub fn matches(&self, record: &Record) -> bool {
    match self {
      Self::All => true,
      Self::VisitedAfter(t) => record.visited_date.is_some_and(|d| d > *t),
      Self::Bookmarked => record.is_bookmark,
      Self::Visited => record.visit_count > 0,
    }
  }
}

// ─── Ordering ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKey {
  VisitCountDesc,
  /// Most recent first; never-visited records sort last.
  VisitedDateDesc,
  /// Case-insensitive (ASCII) title, ascending; untitled records sort first.
  TitleAsc,
}

impl OrderKey {
  pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
    match self {
      Self::VisitCountDesc => b.visit_count.cmp(&a.visit_count),
      Self::VisitedDateDesc => b.visited_date.cmp(&a.visited_date),
      Self::TitleAsc => {
        let a = a.title.as_deref().map(str::to_ascii_lowercase);
        let b = b.title.as_deref().map(str::to_ascii_lowercase);
        a.cmp(&b)
      }
    }
  }
}

// ─── ReadView ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadView {
  pub filter: ViewFilter,
  pub order:  Vec<OrderKey>,
  pub limit:  Option<usize>,
  /// Rows to skip before the first returned row.
  pub offset: usize,
}

impl ReadView {
  fn new(filter: ViewFilter, order: Vec<OrderKey>) -> Self {
    Self { filter, order, limit: None, offset: 0 }
  }

  /// Every record, in storage order. Used for export.
  pub fn all() -> Self { Self::new(ViewFilter::All, Vec::new()) }

  /// Most visited records of the last two weeks, counted from local midnight.
  pub fn start_page(now: DateTime<Local>, limit: usize) -> Self {
    let since = calendar::days_before(now, START_PAGE_WINDOW_DAYS);
    Self::new(
      ViewFilter::VisitedAfter(since.with_timezone(&Utc)),
      vec![
        OrderKey::VisitCountDesc,
        OrderKey::VisitedDateDesc,
        OrderKey::TitleAsc,
      ],
    )
    .with_limit(limit)
  }

  pub fn bookmarks() -> Self {
    Self::new(ViewFilter::Bookmarked, vec![
      OrderKey::VisitCountDesc,
      OrderKey::TitleAsc,
    ])
  }

  /// History, most recent visit first. This is the ordering the
  /// [`crate::pager::DateBinnedPager`] relies on.
  pub fn history() -> Self {
    Self::new(ViewFilter::Visited, vec![OrderKey::VisitedDateDesc])
  }

  /// Most visited bookmarks, without the title tie-break.
  pub fn bookmarks_limited(limit: usize) -> Self {
    Self::new(ViewFilter::Bookmarked, vec![OrderKey::VisitCountDesc])
      .with_limit(limit)
  }

  /// Most recent history entries.
  pub fn history_limited(limit: usize) -> Self { Self::history().with_limit(limit) }

  pub fn with_limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn with_offset(mut self, offset: usize) -> Self {
    self.offset = offset;
    self
  }

  pub fn matches(&self, record: &Record) -> bool { self.filter.matches(record) }

  /// Compare two records by the view's ordering keys, in order.
  pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
    self
      .order
      .iter()
      .map(|key| key.compare(a, b))
      .find(|o| o.is_ne())
      .unwrap_or(Ordering::Equal)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;
  use crate::record::RecordId;

  fn record(title: &str, visits: u32, visited: Option<DateTime<Utc>>) -> Record {
    Record {
      id:            RecordId(0),
      title:         Some(title.into()),
      url:           format!("https://{title}.example/"),
      visit_count:   visits,
      creation_date: None,
      visited_date:  visited,
      is_bookmark:   false,
      favicon:       None,
      thumbnail:     None,
    }
  }

  #[test]
  fn start_page_window_starts_fourteen_midnights_ago() {
    let now = Local::now();
    let view = ReadView::start_page(now, 8);
    let ViewFilter::VisitedAfter(since) = view.filter else {
      panic!("unexpected filter {:?}", view.filter);
    };
    assert_eq!(since, calendar::days_before(now, 14).with_timezone(&Utc));
    assert_eq!(view.limit, Some(8));

    let old = record("old", 5, Some(since - Duration::hours(1)));
    let fresh = record("fresh", 5, Some(since + Duration::hours(1)));
    assert!(!view.matches(&old));
    assert!(view.matches(&fresh));
  }

  #[test]
  fn start_page_orders_by_visits_then_recency_then_title() {
    let now = Utc::now();
    let view = ReadView::start_page(Local::now(), 10);

    let many = record("zeta", 9, Some(now - Duration::days(3)));
    let recent = record("beta", 2, Some(now));
    let older = record("alpha", 2, Some(now - Duration::days(1)));
    let same_time_a = record("Alpha", 1, Some(now));
    let same_time_b = record("bravo", 1, Some(now));

    assert_eq!(view.compare(&many, &recent), Ordering::Less);
    assert_eq!(view.compare(&recent, &older), Ordering::Less);
    assert_eq!(view.compare(&same_time_a, &same_time_b), Ordering::Less);
  }

  #[test]
  fn bookmarks_limited_drops_title_tie_break() {
    let view = ReadView::bookmarks_limited(3);
    assert_eq!(view.order, vec![OrderKey::VisitCountDesc]);
    assert_eq!(view.limit, Some(3));
    assert_eq!(ReadView::bookmarks().limit, None);
  }

  #[test]
  fn history_puts_unvisited_last() {
    let view = ReadView::history();
    let visited = record("a", 1, Some(Utc::now()));
    let never = record("b", 0, None);
    assert_eq!(view.compare(&visited, &never), Ordering::Less);
    assert!(!view.matches(&never));
  }
}
