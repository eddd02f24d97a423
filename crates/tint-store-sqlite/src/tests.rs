//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Duration, Local, Utc};
use tint_core::{
  calendar,
  pager::DateBin,
  record::{DeleteOutcome, NewRecord, RecordId},
  store::BookmarkStore,
  suggest::SuggestionKind,
  view::ReadView,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Current time truncated to the stored millisecond precision.
fn now_ms() -> DateTime<Utc> {
  DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap()
}

fn visited(url: &str, visits: u32, at: DateTime<Utc>) -> NewRecord {
  NewRecord {
    title:         Some(url.trim_start_matches("https://").into()),
    url:           url.into(),
    visit_count:   visits,
    visited_date:  Some(at),
    creation_date: None,
    is_bookmark:   false,
  }
}

fn bookmarked(url: &str, visits: u32, at: Option<DateTime<Utc>>) -> NewRecord {
  NewRecord {
    is_bookmark:  true,
    visited_date: at,
    ..visited(url, visits, Utc::now())
  }
}

// ─── Visits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_visits_count_and_refresh_date() {
  let s = store().await;

  let first = s
    .record_visit(Some("Rust".into()), "https://rust-lang.org/".into(), None)
    .await
    .unwrap();
  s.record_visit(Some("Rust".into()), "https://rust-lang.org/".into(), None)
    .await
    .unwrap();

  let before = now_ms();
  let last = s
    .record_visit(Some("Rust".into()), "https://rust-lang.org/".into(), None)
    .await
    .unwrap();
  let after = Utc::now();

  assert_eq!(first, last);
  let r = s.get_record(first).await.unwrap().unwrap();
  assert_eq!(r.visit_count, 3);
  assert!(!r.is_bookmark);
  assert!(r.creation_date.is_none());
  let visited = r.visited_date.unwrap();
  assert!(visited >= before && visited <= after);
}

#[tokio::test]
async fn visit_matches_original_url() {
  let s = store().await;
  let id = s
    .record_visit(None, "https://example.com/".into(), None)
    .await
    .unwrap();

  let redirected = s
    .record_visit(
      Some("Example".into()),
      "https://www.example.com/".into(),
      Some("https://example.com/".into()),
    )
    .await
    .unwrap();

  assert_eq!(redirected, id);
  let r = s.get_record(id).await.unwrap().unwrap();
  assert_eq!(r.visit_count, 2);
  assert_eq!(r.title.as_deref(), Some("Example"));
  assert_eq!(s.all_records().await.unwrap().len(), 1);
}

#[tokio::test]
async fn redirect_across_two_rows_bumps_only_one() {
  let s = store().await;
  let a = s
    .record_visit(Some("A".into()), "https://a.example/".into(), None)
    .await
    .unwrap();
  let b = s
    .record_visit(Some("B".into()), "https://b.example/".into(), None)
    .await
    .unwrap();

  let hit = s
    .record_visit(
      Some("A2".into()),
      "https://a.example/".into(),
      Some("https://b.example/".into()),
    )
    .await
    .unwrap();
  assert_eq!(hit, a);

  let a = s.get_record(a).await.unwrap().unwrap();
  assert_eq!(a.visit_count, 2);
  assert_eq!(a.title.as_deref(), Some("A2"));

  let b = s.get_record(b).await.unwrap().unwrap();
  assert_eq!(b.visit_count, 1);
  assert_eq!(b.title.as_deref(), Some("B"));
}

#[tokio::test]
async fn visit_keeps_bookmark_title() {
  let s = store().await;
  let id = s
    .set_bookmark(None, Some("My docs".into()), Some("https://docs.rs/".into()), true)
    .await
    .unwrap()
    .unwrap();

  s.record_visit(Some("Docs.rs".into()), "https://docs.rs/".into(), None)
    .await
    .unwrap();

  let r = s.get_record(id).await.unwrap().unwrap();
  assert_eq!(r.title.as_deref(), Some("My docs"));
  assert_eq!(r.visit_count, 1);
  assert!(r.visited_date.is_some());
}

// ─── Bookmarks ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_bookmark_inserts_unvisited_bookmark() {
  let s = store().await;
  let before = now_ms();
  let id = s
    .set_bookmark(None, Some("Crates".into()), Some("https://crates.io/".into()), true)
    .await
    .unwrap()
    .unwrap();

  let r = s.get_record(id).await.unwrap().unwrap();
  assert!(r.is_bookmark);
  assert_eq!(r.visit_count, 0);
  assert!(r.visited_date.is_none());
  assert!(r.creation_date.unwrap() >= before);
}

#[tokio::test]
async fn set_bookmark_updates_by_id_and_by_url() {
  let s = store().await;
  let id = s
    .record_visit(Some("Blog".into()), "https://blog.example/".into(), None)
    .await
    .unwrap();

  let by_url = s
    .set_bookmark(None, None, Some("https://blog.example/".into()), true)
    .await
    .unwrap();
  assert_eq!(by_url, Some(id));

  let by_id = s
    .set_bookmark(Some(id), Some("Renamed".into()), None, true)
    .await
    .unwrap();
  assert_eq!(by_id, Some(id));

  let r = s.get_record(id).await.unwrap().unwrap();
  assert!(r.is_bookmark);
  assert_eq!(r.title.as_deref(), Some("Renamed"));
  assert_eq!(r.url, "https://blog.example/");
  assert_eq!(r.visit_count, 1);
}

#[tokio::test]
async fn unset_bookmark_without_match_is_a_noop() {
  let s = store().await;
  let result = s
    .set_bookmark(None, None, Some("https://nowhere.example/".into()), false)
    .await
    .unwrap();
  assert!(result.is_none());
  assert!(s.all_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn unset_bookmark_removes_unvisited_row() {
  let s = store().await;
  let id = s
    .set_bookmark(None, None, Some("https://once.example/".into()), true)
    .await
    .unwrap()
    .unwrap();

  s.set_bookmark(Some(id), None, None, false).await.unwrap();

  assert!(s.get_record(id).await.unwrap().is_none());
}

#[tokio::test]
async fn toggle_bookmark_clears_thumbnail_and_creation_date() {
  let s = store().await;
  let id = s
    .record_visit(None, "https://photos.example/".into(), None)
    .await
    .unwrap();

  assert!(s.toggle_bookmark(id, true).await.unwrap());
  let n = s
    .update_thumbnail("https://photos.example/".into(), None, vec![1, 2, 3])
    .await
    .unwrap();
  assert_eq!(n, 1);

  assert!(s.toggle_bookmark(id, false).await.unwrap());
  let r = s.get_record(id).await.unwrap().unwrap();
  assert!(!r.is_bookmark);
  assert!(r.creation_date.is_none());
  assert!(r.thumbnail.is_none());
  assert_eq!(r.visit_count, 1);

  assert!(!s.toggle_bookmark(RecordId(9999), true).await.unwrap());
}

#[tokio::test]
async fn toggle_on_off_then_delete_leaves_nothing() {
  let s = store().await;
  let id = s
    .insert_raw_record(bookmarked("https://temp.example/", 0, None))
    .await
    .unwrap();

  s.toggle_bookmark(id, true).await.unwrap();
  s.toggle_bookmark(id, false).await.unwrap();
  s.delete_bookmark(id).await.unwrap();

  assert!(s.get_record(id).await.unwrap().is_none());
}

// ─── Deletion merge rules ────────────────────────────────────────────────────

#[tokio::test]
async fn delete_bookmark_demotes_visited_bookmark() {
  let s = store().await;
  let id = s
    .insert_raw_record(bookmarked("https://both.example/", 4, Some(Utc::now())))
    .await
    .unwrap();

  let outcome = s.delete_bookmark(id).await.unwrap();
  assert_eq!(outcome, DeleteOutcome::BookmarkCleared);

  let r = s.get_record(id).await.unwrap().unwrap();
  assert!(!r.is_bookmark);
  assert!(r.creation_date.is_none());
  assert_eq!(r.visit_count, 4);
}

#[tokio::test]
async fn delete_bookmark_removes_unvisited_bookmark() {
  let s = store().await;
  let id = s
    .insert_raw_record(bookmarked("https://only.example/", 0, None))
    .await
    .unwrap();

  assert_eq!(s.delete_bookmark(id).await.unwrap(), DeleteOutcome::Removed);
  assert!(s.get_record(id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_history_keeps_bookmark() {
  let s = store().await;
  let id = s
    .insert_raw_record(bookmarked("https://both.example/", 4, Some(Utc::now())))
    .await
    .unwrap();

  let outcome = s.delete_history(id).await.unwrap();
  assert_eq!(outcome, DeleteOutcome::VisitsReset);

  let r = s.get_record(id).await.unwrap().unwrap();
  assert!(r.is_bookmark);
  assert_eq!(r.visit_count, 0);
  assert!(r.visited_date.is_none());
}

#[tokio::test]
async fn delete_history_removes_plain_history() {
  let s = store().await;
  let id = s
    .record_visit(None, "https://gone.example/".into(), None)
    .await
    .unwrap();

  assert_eq!(s.delete_history(id).await.unwrap(), DeleteOutcome::Removed);
  assert!(s.get_record(id).await.unwrap().is_none());
  assert_eq!(s.delete_history(id).await.unwrap(), DeleteOutcome::NotFound);
  assert_eq!(s.delete_bookmark(id).await.unwrap(), DeleteOutcome::NotFound);
}

#[tokio::test]
async fn delete_bookmark_on_plain_history_changes_nothing() {
  let s = store().await;
  let id = s
    .record_visit(None, "https://stay.example/".into(), None)
    .await
    .unwrap();

  assert_eq!(s.delete_bookmark(id).await.unwrap(), DeleteOutcome::Unchanged);
  assert!(s.get_record(id).await.unwrap().is_some());
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

async fn mixed_store() -> SqliteStore {
  let s = store().await;
  let now = Utc::now();
  s.insert_raw_record(visited("https://a.example/", 1, now)).await.unwrap();
  s.insert_raw_record(visited("https://b.example/", 2, now)).await.unwrap();
  s.insert_raw_record(bookmarked("https://c.example/", 0, None))
    .await
    .unwrap();
  s.insert_raw_record(bookmarked("https://d.example/", 3, Some(now)))
    .await
    .unwrap();
  s
}

#[tokio::test]
async fn clear_history_only_keeps_bookmarks() {
  let s = mixed_store().await;
  assert_eq!(s.clear(true, false).await.unwrap(), 2);
  let left = s.all_records().await.unwrap();
  assert_eq!(left.len(), 2);
  assert!(left.iter().all(|r| r.is_bookmark));
}

#[tokio::test]
async fn clear_bookmarks_only_keeps_history() {
  let s = mixed_store().await;
  assert_eq!(s.clear(false, true).await.unwrap(), 2);
  let left = s.all_records().await.unwrap();
  assert!(left.iter().all(|r| !r.is_bookmark));
}

#[tokio::test]
async fn clear_both_and_neither() {
  let s = mixed_store().await;
  assert_eq!(s.clear(false, false).await.unwrap(), 0);
  assert_eq!(s.all_records().await.unwrap().len(), 4);
  assert_eq!(s.clear(true, true).await.unwrap(), 4);
  assert!(s.all_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn truncate_history_expires_old_visits() {
  let s = store().await;
  let old = Utc::now() - Duration::days(40);
  let fresh = Utc::now() - Duration::days(2);

  let old_history = s
    .insert_raw_record(visited("https://old.example/", 3, old))
    .await
    .unwrap();
  let old_bookmark = s
    .insert_raw_record(bookmarked("https://kept.example/", 3, Some(old)))
    .await
    .unwrap();
  let recent = s
    .insert_raw_record(visited("https://new.example/", 1, fresh))
    .await
    .unwrap();

  let report = s.truncate_history(30).await.unwrap();
  assert_eq!(report.deleted, 1);
  assert_eq!(report.demoted, 1);

  assert!(s.get_record(old_history).await.unwrap().is_none());
  let kept = s.get_record(old_bookmark).await.unwrap().unwrap();
  assert!(kept.is_bookmark);
  assert_eq!(kept.visit_count, 0);
  assert!(kept.visited_date.is_none());
  assert!(s.get_record(recent).await.unwrap().is_some());
}

#[tokio::test]
async fn truncate_reports_demotions_when_expiry_rolls_back() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("tint.db");
  let s = SqliteStore::open(&path).await.unwrap();

  let old = Utc::now() - Duration::days(40);
  let old_history = s
    .insert_raw_record(visited("https://old.example/", 3, old))
    .await
    .unwrap();
  let old_bookmark = s
    .insert_raw_record(bookmarked("https://kept.example/", 3, Some(old)))
    .await
    .unwrap();

  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TRIGGER block_delete BEFORE DELETE ON records
         BEGIN SELECT RAISE(ROLLBACK, 'expiry blocked'); END;",
      )
      .unwrap();
  }

  let report = s.truncate_history(30).await.unwrap();
  assert_eq!(report.deleted, 0);
  assert_eq!(report.demoted, 1);

  assert!(s.get_record(old_history).await.unwrap().is_some());
  let kept = s.get_record(old_bookmark).await.unwrap().unwrap();
  assert_eq!(kept.visit_count, 0);
  assert!(kept.visited_date.is_none());
}

// ─── Media ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn favicon_matches_url_or_original_url() {
  let s = store().await;
  let id = s
    .record_visit(None, "https://icon.example/".into(), None)
    .await
    .unwrap();

  let n = s
    .update_favicon(
      "https://redirect.example/".into(),
      Some("https://icon.example/".into()),
      vec![0x89, b'P', b'N', b'G'],
    )
    .await
    .unwrap();
  assert_eq!(n, 1);

  let r = s.get_record(id).await.unwrap().unwrap();
  assert_eq!(r.favicon.as_deref(), Some(&[0x89, b'P', b'N', b'G'][..]));
}

#[tokio::test]
async fn thumbnail_only_for_bookmarks() {
  let s = store().await;
  s.record_visit(None, "https://plain.example/".into(), None)
    .await
    .unwrap();

  let n = s
    .update_thumbnail("https://plain.example/".into(), None, vec![1])
    .await
    .unwrap();
  assert_eq!(n, 0);
}

#[tokio::test]
async fn url_has_bookmark_checks_both_urls() {
  let s = store().await;
  s.set_bookmark(None, None, Some("https://saved.example/".into()), true)
    .await
    .unwrap();
  s.record_visit(None, "https://visited.example/".into(), None)
    .await
    .unwrap();

  assert!(
    s.url_has_bookmark("https://saved.example/".into(), None)
      .await
      .unwrap()
  );
  assert!(
    s.url_has_bookmark(
      "https://other.example/".into(),
      Some("https://saved.example/".into())
    )
    .await
    .unwrap()
  );
  assert!(
    !s.url_has_bookmark("https://visited.example/".into(), None)
      .await
      .unwrap()
  );
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_page_orders_and_limits_recent_visits() {
  let s = store().await;
  let now = Utc::now();
  s.insert_raw_record(visited("https://often.example/", 9, now - Duration::days(2)))
    .await
    .unwrap();
  s.insert_raw_record(visited("https://stale.example/", 50, now - Duration::days(20)))
    .await
    .unwrap();
  s.insert_raw_record(visited("https://recent.example/", 2, now))
    .await
    .unwrap();
  s.insert_raw_record(visited("https://earlier.example/", 2, now - Duration::hours(1)))
    .await
    .unwrap();

  let page = s.query_start_page(10).await.unwrap();
  let urls: Vec<_> = page.iter().map(|r| r.url.as_str()).collect();
  assert_eq!(urls, vec![
    "https://often.example/",
    "https://recent.example/",
    "https://earlier.example/",
  ]);

  assert_eq!(s.query_start_page(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn bookmarks_view_orders_by_visits_then_title() {
  let s = store().await;
  s.set_bookmark(None, Some("beta".into()), Some("https://b.example/".into()), true)
    .await
    .unwrap();
  s.set_bookmark(None, Some("Alpha".into()), Some("https://a.example/".into()), true)
    .await
    .unwrap();
  s.insert_raw_record(bookmarked("https://z.example/", 5, Some(Utc::now())))
    .await
    .unwrap();
  s.record_visit(None, "https://history.example/".into(), None)
    .await
    .unwrap();

  let titles: Vec<_> = s
    .query_bookmarks()
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.title.unwrap_or_default())
    .collect();
  assert_eq!(titles, vec!["z.example/", "Alpha", "beta"]);

  let limited = s.query(&ReadView::bookmarks_limited(1)).await.unwrap();
  assert_eq!(limited.len(), 1);
  assert_eq!(limited[0].url, "https://z.example/");
}

#[tokio::test]
async fn history_view_is_most_recent_first() {
  let s = store().await;
  let now = Utc::now();
  s.insert_raw_record(visited("https://one.example/", 1, now - Duration::days(3)))
    .await
    .unwrap();
  s.insert_raw_record(visited("https://two.example/", 1, now))
    .await
    .unwrap();
  s.insert_raw_record(bookmarked("https://never.example/", 0, None))
    .await
    .unwrap();

  let history = s.query_history().await.unwrap();
  let urls: Vec<_> = history.iter().map(|r| r.url.as_str()).collect();
  assert_eq!(urls, vec!["https://two.example/", "https://one.example/"]);

  let limited = s.query(&ReadView::history_limited(1)).await.unwrap();
  assert_eq!(limited[0].url, "https://two.example/");
}

// ─── Pager ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn history_pager_groups_by_date() {
  let s = store().await;
  let now = Local::now();
  let today = (calendar::start_of_day(now) + Duration::minutes(1)).with_timezone(&Utc);
  let utc_now = now.with_timezone(&Utc);

  s.insert_raw_record(visited("https://t1.example/", 1, today)).await.unwrap();
  s.insert_raw_record(visited("https://t2.example/", 1, today)).await.unwrap();
  s.insert_raw_record(visited("https://w.example/", 1, utc_now - Duration::days(3)))
    .await
    .unwrap();
  s.insert_raw_record(visited("https://o.example/", 1, utc_now - Duration::days(40)))
    .await
    .unwrap();

  let pager = s.history_pager(now).await.unwrap();
  assert_eq!(pager.group_count(), 3);
  assert_eq!(pager.child_count(0), 2);
  assert_eq!(pager.locate(1, 0), 2);
  assert_eq!(pager.bin(1), DateBin::LastSevenDays);

  let week = s.history_group(&pager, 1).await.unwrap();
  assert_eq!(week.len(), 1);
  assert_eq!(week[0].url, "https://w.example/");

  let older = s.history_group(&pager, 2).await.unwrap();
  assert_eq!(older[0].url, "https://o.example/");

  assert!(matches!(
    s.history_group(&pager, 3).await,
    Err(crate::Error::Core(tint_core::Error::GroupOutOfRange { .. }))
  ));
}

#[tokio::test]
async fn history_window_reads_group_with_current_bounds() {
  let s = store().await;
  let utc_now = Utc::now();
  s.insert_raw_record(visited("https://t.example/", 1, utc_now)).await.unwrap();
  s.insert_raw_record(visited("https://o.example/", 1, utc_now - Duration::days(40)))
    .await
    .unwrap();

  let stale = s.history_pager(Local::now()).await.unwrap();
  assert_eq!(stale.child_count(0), 1);

  s.record_visit(None, "https://new.example/".into(), None)
    .await
    .unwrap();

  let (pager, older) = s.history_window(Local::now(), 1).await.unwrap();
  assert_eq!(pager.child_count(0), 2);
  assert_eq!(pager.bin(1), DateBin::Older);
  assert_eq!(older.len(), 1);
  assert_eq!(older[0].url, "https://o.example/");

  let (pager, rows) = s.history_window(Local::now(), 2).await.unwrap();
  assert!(pager.check_group(2).is_err());
  assert!(rows.is_empty());
}

#[tokio::test]
async fn empty_history_pager() {
  let s = store().await;
  let pager = s.history_pager(Local::now()).await.unwrap();
  assert_eq!(pager.group_count(), 0);
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn suggest_ranks_title_prefix_first() {
  let s = store().await;
  s.record_visit(Some("Legit".into()), "https://example.com/legit".into(), None)
    .await
    .unwrap();
  s.set_bookmark(None, Some("GitHub".into()), Some("https://github.com/".into()), true)
    .await
    .unwrap();
  s.record_visit(Some("Unrelated".into()), "https://example.org/".into(), None)
    .await
    .unwrap();

  let suggestions = s.suggest("git".into()).await.unwrap();
  assert_eq!(suggestions.len(), 2);
  assert_eq!(suggestions[0].title.as_deref(), Some("GitHub"));
  assert_eq!(suggestions[0].kind, SuggestionKind::Bookmark);
  assert_eq!(suggestions[0].id, 0);
  assert_eq!(suggestions[1].title.as_deref(), Some("Legit"));
  assert_eq!(suggestions[1].kind, SuggestionKind::History);
  assert_eq!(suggestions[1].id, 1);
}

#[tokio::test]
async fn suggest_treats_wildcards_literally() {
  let s = store().await;
  s.record_visit(Some("100% cotton".into()), "https://shop.example/".into(), None)
    .await
    .unwrap();
  s.record_visit(Some("100 pages".into()), "https://book.example/".into(), None)
    .await
    .unwrap();

  let suggestions = s.suggest("100%".into()).await.unwrap();
  assert_eq!(suggestions.len(), 1);
  assert!(s.suggest(String::new()).await.unwrap().is_empty());
}

// ─── Raw records ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_raw_record_rejects_empty_record() {
  let s = store().await;
  let err = s
    .insert_raw_record(visited("https://x.example/", 0, Utc::now()))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(tint_core::Error::EmptyRecord(_))
  ));
}

#[tokio::test]
async fn records_persist_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("tint.db");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.record_visit(Some("Saved".into()), "https://disk.example/".into(), None)
      .await
      .unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let r = s.get_record(id).await.unwrap().unwrap();
  assert_eq!(r.title.as_deref(), Some("Saved"));
}
