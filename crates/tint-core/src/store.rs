//! The `BookmarkStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tint-store-sqlite`).
//! Higher layers (`tint-api`, `tint-cli`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use chrono::{DateTime, Local, Utc};

use crate::{
  pager::{DateBinnedPager, DateSorter},
  record::{DeleteOutcome, NewRecord, Record, RecordId},
  retention::TruncateReport,
  suggest::Suggestion,
  view::ReadView,
};

/// Abstraction over a history/bookmarks backend.
///
/// Every mutation is atomic: it either applies completely or not at all.
/// [`BookmarkStore::truncate_history`] is the exception; each of its two
/// steps is atomic on its own.
/// A row that ends up neither bookmarked nor visited is deleted within the
/// same mutation.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BookmarkStore: Send + Sync {
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  // ── Visits and bookmarks ──────────────────────────────────────────────

  /// Record a page visit.
  ///
  /// The lowest-id row whose url equals `url` or `original_url` gets its
  /// visit count bumped and its visit date set to now; its title is replaced
  /// only when the row is not a bookmark. Other matching rows are left alone.
  /// Without a match a new history row is inserted. Returns the id of the
  /// updated or inserted row.
  fn record_visit(
    &self,
    title: Option<String>,
    url: String,
    original_url: Option<String>,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  /// Create, update or un-flag a bookmark.
  ///
  /// With `id` the row is addressed directly; otherwise by `url`. Setting
  /// the flag stamps the creation date; clearing it removes the creation
  /// date. Without a matching row, setting the flag inserts an unvisited
  /// bookmark and clearing it does nothing (`None`).
  fn set_bookmark(
    &self,
    id: Option<RecordId>,
    title: Option<String>,
    url: Option<String>,
    is_bookmark: bool,
  ) -> impl Future<Output = Result<Option<RecordId>, Self::Error>> + Send + '_;

  /// Flip the bookmark flag of an existing row. Clearing the flag also drops
  /// the creation date and thumbnail. Returns whether a row was changed.
  fn toggle_bookmark(
    &self,
    id: RecordId,
    is_bookmark: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete the bookmark facet of a row, per
  /// [`crate::retention::on_delete_bookmark`].
  fn delete_bookmark(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send + '_;

  /// Delete the history facet of a row, per
  /// [`crate::retention::on_delete_history`].
  fn delete_history(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send + '_;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Bulk clear. `history` alone removes rows that are not bookmarks;
  /// `bookmarks` alone removes bookmarked rows; both wipe the store.
  /// Returns the number of rows removed.
  fn clear(
    &self,
    history: bool,
    bookmarks: bool,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Expire visits older than `max_age_days` local midnights.
  ///
  /// Expired history rows are deleted; expired bookmarks keep their row with
  /// visits reset. The two steps apply independently: a step that fails is
  /// logged and counted as zero while the other still applies. Failures are
  /// never returned.
  fn truncate_history(
    &self,
    max_age_days: u32,
  ) -> impl Future<Output = Result<TruncateReport, Self::Error>> + Send + '_;

  // ── Media ─────────────────────────────────────────────────────────────

  /// Attach a favicon to every row matching `url` or `original_url`.
  /// Failures are logged and count as zero rows.
  fn update_favicon(
    &self,
    url: String,
    original_url: Option<String>,
    image: Vec<u8>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Attach a thumbnail to every bookmarked row matching `url` or
  /// `original_url`. Failures are logged and count as zero rows.
  fn update_thumbnail(
    &self,
    url: String,
    original_url: Option<String>,
    image: Vec<u8>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Whether a bookmarked row matches `url` or `original_url`.
  fn url_has_bookmark(
    &self,
    url: String,
    original_url: Option<String>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_record(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  /// Execute a read view.
  fn query<'a>(
    &'a self,
    view: &'a ReadView,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + 'a;

  /// Visit dates of the rows a view selects, in view order. Feeds the
  /// [`DateBinnedPager`] without loading whole rows.
  fn visit_dates<'a>(
    &'a self,
    view: &'a ReadView,
  ) -> impl Future<Output = Result<Vec<Option<DateTime<Utc>>>, Self::Error>>
  + Send
  + 'a;

  /// A pager over the history view as of `now` and the rows of `group`,
  /// both read from one snapshot. The rows are empty when `group` is out of
  /// range; [`DateBinnedPager::check_group`] tells the two cases apart.
  fn history_window(
    &self,
    now: DateTime<Local>,
    group: usize,
  ) -> impl Future<Output = Result<(DateBinnedPager, Vec<Record>), Self::Error>>
  + Send
  + '_;

  /// Type-ahead suggestions for `pattern`, ranked by [`crate::suggest::rank`].
  /// An empty pattern yields nothing.
  fn suggest(
    &self,
    pattern: String,
  ) -> impl Future<Output = Result<Vec<Suggestion>, Self::Error>> + Send + '_;

  /// Insert a complete record, normalised by [`NewRecord::normalized`].
  fn insert_raw_record(
    &self,
    record: NewRecord,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  // ── Provided ──────────────────────────────────────────────────────────

  /// Every record, in storage order. Used for export.
  fn all_records(
    &self,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_ {
    async move { self.query(&ReadView::all()).await }
  }

  fn query_start_page(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_ {
    async move {
      let view = ReadView::start_page(Local::now(), limit);
      self.query(&view).await
    }
  }

  fn query_bookmarks(
    &self,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_ {
    async move { self.query(&ReadView::bookmarks()).await }
  }

  fn query_history(
    &self,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_ {
    async move { self.query(&ReadView::history()).await }
  }

  /// Build a pager over the full history view as of `now`.
  fn history_pager(
    &self,
    now: DateTime<Local>,
  ) -> impl Future<Output = Result<DateBinnedPager, Self::Error>> + Send + '_ {
    async move {
      let dates = self.visit_dates(&ReadView::history()).await?;
      Ok(DateBinnedPager::build(dates, &DateSorter::new(now)))
    }
  }

  /// The history rows shown under one pager group.
  fn history_group<'a>(
    &'a self,
    pager: &'a DateBinnedPager,
    group: usize,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + 'a {
    async move {
      pager.check_group(group)?;
      let view = ReadView::history()
        .with_offset(pager.locate(group, 0))
        .with_limit(pager.child_count(group));
      self.query(&view).await
    }
  }
}
