//! [`SqliteStore`], the SQLite implementation of [`BookmarkStore`].

use std::path::Path;

use chrono::{DateTime, Local, Utc};
use rusqlite::{OptionalExtension as _, Transaction, params, params_from_iter};

use tint_core::{
  pager::{DateBinnedPager, DateSorter},
  record::{DeleteOutcome, NewRecord, Record, RecordId},
  retention::{
    DeleteAction, RecordState, TruncateReport, on_delete_bookmark,
    on_delete_history, truncation_threshold,
  },
  store::BookmarkStore,
  suggest::{Candidate, Suggestion, SuggestionKind, like_pattern, rank},
  view::ReadView,
};

use crate::{
  Result,
  encode::{RECORD_COLUMNS, RawRecord, decode_ms, encode_ms},
  schema::SCHEMA,
  sql,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tint history/bookmarks store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Look up a row's state and apply the deletion rule for one facet.
  async fn delete_facet(
    &self,
    id: RecordId,
    rule: fn(RecordState) -> DeleteAction,
  ) -> Result<DeleteOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let state = tx
          .query_row(
            "SELECT COALESCE(bookmark, 0), visit_count FROM records WHERE id = ?1",
            params![id.0],
            |row| {
              Ok(RecordState {
                is_bookmark: row.get(0)?,
                visit_count: row.get(1)?,
              })
            },
          )
          .optional()?;

        let Some(state) = state else {
          return Ok(DeleteOutcome::NotFound);
        };

        let action = rule(state);
        apply_delete_action(&tx, id.0, action)?;
        tx.commit()?;
        Ok(action.into())
      })
      .await?;

    tracing::debug!(%id, ?outcome, "delete");
    Ok(outcome)
  }

  /// Write an image column on every row matching `url` or `original_url`.
  /// Failures are logged and count as zero rows.
  async fn update_image(
    &self,
    sql: &'static str,
    url: String,
    original_url: Option<String>,
    image: Vec<u8>,
  ) -> usize {
    let result = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, params![url, original_url, image])?))
      .await;

    result.unwrap_or_else(|e| {
      tracing::warn!("image update failed: {e}");
      0
    })
  }
}

fn apply_delete_action(
  tx: &Transaction<'_>,
  id: i64,
  action: DeleteAction,
) -> rusqlite::Result<()> {
  let sql = match action {
    DeleteAction::Remove => "DELETE FROM records WHERE id = ?1",
    DeleteAction::ClearBookmark => {
      "UPDATE records
       SET bookmark = 0, creation_date = NULL, thumbnail = NULL
       WHERE id = ?1"
    }
    DeleteAction::ResetVisits => {
      "UPDATE records SET visit_count = 0, visited_date = NULL WHERE id = ?1"
    }
    DeleteAction::Nothing => return Ok(()),
  };
  tx.execute(sql, params![id])?;
  Ok(())
}

/// Drop a row that has just lost its bookmark flag and was never visited.
fn remove_if_empty(tx: &Transaction<'_>, id: i64) -> rusqlite::Result<usize> {
  tx.execute(
    "DELETE FROM records
     WHERE id = ?1 AND COALESCE(bookmark, 0) = 0 AND visit_count = 0",
    params![id],
  )
}

fn select_records(
  conn: &rusqlite::Connection,
  rendered: sql::Rendered,
) -> rusqlite::Result<Vec<RawRecord>> {
  let mut stmt =
    conn.prepare(&format!("SELECT {RECORD_COLUMNS} FROM records{}", rendered.clause))?;
  stmt
    .query_map(params_from_iter(rendered.params), RawRecord::from_row)?
    .collect()
}

fn select_visit_dates(
  conn: &rusqlite::Connection,
  rendered: sql::Rendered,
) -> rusqlite::Result<Vec<Option<i64>>> {
  let mut stmt =
    conn.prepare(&format!("SELECT visited_date FROM records{}", rendered.clause))?;
  stmt
    .query_map(params_from_iter(rendered.params), |row| row.get(0))?
    .collect()
}

fn decode_dates(raws: Vec<Option<i64>>) -> Result<Vec<Option<DateTime<Utc>>>> {
  raws
    .into_iter()
    .map(|ms| ms.map(decode_ms).transpose())
    .collect()
}

// ─── BookmarkStore impl ──────────────────────────────────────────────────────

impl BookmarkStore for SqliteStore {
  type Error = crate::Error;

  // ── Visits and bookmarks ──────────────────────────────────────────────────

  async fn record_visit(
    &self,
    title:        Option<String>,
    url:          String,
    original_url: Option<String>,
  ) -> Result<RecordId> {
    let now_ms = encode_ms(Utc::now());

    let (id, inserted) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<i64> = tx
          .query_row(
            "SELECT id FROM records WHERE url = ?1 OR url = ?2 ORDER BY id LIMIT 1",
            params![url, original_url],
            |row| row.get(0),
          )
          .optional()?;

        let result = match existing {
          Some(id) => {
            tx.execute(
              "UPDATE records
               SET visit_count  = visit_count + 1,
                   visited_date = ?2,
                   title = CASE WHEN COALESCE(bookmark, 0) = 0
                                THEN COALESCE(?3, title)
                                ELSE title END
               WHERE id = ?1",
              params![id, now_ms, title],
            )?;
            (id, false)
          }
          None => {
            tx.execute(
              "INSERT INTO records (title, url, visit_count, visited_date, bookmark)
               VALUES (?1, ?2, 1, ?3, 0)",
              params![title, url, now_ms],
            )?;
            (tx.last_insert_rowid(), true)
          }
        };

        tx.commit()?;
        Ok(result)
      })
      .await?;

    tracing::debug!(id, inserted, "visit recorded");
    Ok(RecordId(id))
  }

  async fn set_bookmark(
    &self,
    id:          Option<RecordId>,
    title:       Option<String>,
    url:         Option<String>,
    is_bookmark: bool,
  ) -> Result<Option<RecordId>> {
    let now_ms = encode_ms(Utc::now());

    let target = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<i64> = match (id, url.as_deref()) {
          (Some(id), _) => tx
            .query_row("SELECT id FROM records WHERE id = ?1", params![id.0], |row| {
              row.get(0)
            })
            .optional()?,
          (None, Some(url)) => tx
            .query_row(
              "SELECT id FROM records WHERE url = ?1 ORDER BY id LIMIT 1",
              params![url],
              |row| row.get(0),
            )
            .optional()?,
          (None, None) => None,
        };

        let target = match (existing, is_bookmark) {
          (Some(id), true) => {
            tx.execute(
              "UPDATE records
               SET title = COALESCE(?2, title), url = COALESCE(?3, url),
                   bookmark = 1, creation_date = ?4
               WHERE id = ?1",
              params![id, title, url, now_ms],
            )?;
            Some(id)
          }
          (Some(id), false) => {
            tx.execute(
              "UPDATE records
               SET title = COALESCE(?2, title), url = COALESCE(?3, url),
                   bookmark = 0, creation_date = NULL, thumbnail = NULL
               WHERE id = ?1",
              params![id, title, url],
            )?;
            remove_if_empty(&tx, id)?;
            Some(id)
          }
          (None, true) => match url {
            Some(url) => {
              tx.execute(
                "INSERT INTO records (title, url, visit_count, creation_date, bookmark)
                 VALUES (?1, ?2, 0, ?3, 1)",
                params![title, url, now_ms],
              )?;
              Some(tx.last_insert_rowid())
            }
            None => None,
          },
          (None, false) => None,
        };

        tx.commit()?;
        Ok(target)
      })
      .await?;

    tracing::debug!(?target, is_bookmark, "bookmark set");
    Ok(target.map(RecordId))
  }

  async fn toggle_bookmark(&self, id: RecordId, is_bookmark: bool) -> Result<bool> {
    let now_ms = encode_ms(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = if is_bookmark {
          tx.execute(
            "UPDATE records SET bookmark = 1, creation_date = ?2 WHERE id = ?1",
            params![id.0, now_ms],
          )?
        } else {
          let n = tx.execute(
            "UPDATE records
             SET bookmark = 0, creation_date = NULL, thumbnail = NULL
             WHERE id = ?1",
            params![id.0],
          )?;
          remove_if_empty(&tx, id.0)?;
          n
        };
        tx.commit()?;
        Ok(changed > 0)
      })
      .await?;

    tracing::debug!(%id, is_bookmark, changed, "bookmark toggled");
    Ok(changed)
  }

  async fn delete_bookmark(&self, id: RecordId) -> Result<DeleteOutcome> {
    self.delete_facet(id, on_delete_bookmark).await
  }

  async fn delete_history(&self, id: RecordId) -> Result<DeleteOutcome> {
    self.delete_facet(id, on_delete_history).await
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  async fn clear(&self, history: bool, bookmarks: bool) -> Result<usize> {
    let sql = match (history, bookmarks) {
      (true, true) => "DELETE FROM records",
      (true, false) => "DELETE FROM records WHERE COALESCE(bookmark, 0) = 0",
      (false, true) => "DELETE FROM records WHERE bookmark = 1",
      (false, false) => return Ok(0),
    };

    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, [])?))
      .await?;

    tracing::debug!(history, bookmarks, removed, "cleared");
    Ok(removed)
  }

  async fn truncate_history(&self, max_age_days: u32) -> Result<TruncateReport> {
    let threshold = encode_ms(truncation_threshold(Local::now(), max_age_days));

    let result = self
      .conn
      .call(move |conn| {
        // Each step commits on its own.
        let deleted = conn
          .execute(
            "DELETE FROM records
             WHERE COALESCE(bookmark, 0) = 0 AND visited_date < ?1",
            params![threshold],
          )
          .unwrap_or_else(|e| {
            tracing::warn!("expiring history failed: {e}");
            0
          });

        let demoted = conn
          .execute(
            "UPDATE records SET visit_count = 0, visited_date = NULL
             WHERE bookmark = 1 AND visited_date < ?1",
            params![threshold],
          )
          .unwrap_or_else(|e| {
            tracing::warn!("resetting expired bookmark visits failed: {e}");
            0
          });

        Ok(TruncateReport { deleted, demoted })
      })
      .await;

    let report = result.unwrap_or_else(|e| {
      tracing::warn!("history truncation failed: {e}");
      TruncateReport::default()
    });

    tracing::debug!(max_age_days, ?report, "history truncated");
    Ok(report)
  }

  // ── Media ─────────────────────────────────────────────────────────────────

  async fn update_favicon(
    &self,
    url:          String,
    original_url: Option<String>,
    image:        Vec<u8>,
  ) -> Result<usize> {
    Ok(
      self
        .update_image(
          "UPDATE records SET favicon = ?3 WHERE url = ?1 OR url = ?2",
          url,
          original_url,
          image,
        )
        .await,
    )
  }

  async fn update_thumbnail(
    &self,
    url:          String,
    original_url: Option<String>,
    image:        Vec<u8>,
  ) -> Result<usize> {
    Ok(
      self
        .update_image(
          "UPDATE records SET thumbnail = ?3
           WHERE (url = ?1 OR url = ?2) AND bookmark = 1",
          url,
          original_url,
          image,
        )
        .await,
    )
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn url_has_bookmark(
    &self,
    url:          String,
    original_url: Option<String>,
  ) -> Result<bool> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            "SELECT EXISTS (
               SELECT 1 FROM records
               WHERE (url = ?1 OR url = ?2) AND bookmark = 1
             )",
            params![url, original_url],
            |row| row.get(0),
          )?)
        })
        .await?,
    )
  }

  async fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
            params![id.0],
            RawRecord::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn query(&self, view: &ReadView) -> Result<Vec<Record>> {
    let rendered = sql::render(view);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| Ok(select_records(conn, rendered)?))
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn visit_dates(&self, view: &ReadView) -> Result<Vec<Option<DateTime<Utc>>>> {
    let rendered = sql::render(view);

    let raws: Vec<Option<i64>> = self
      .conn
      .call(move |conn| Ok(select_visit_dates(conn, rendered)?))
      .await?;

    decode_dates(raws)
  }

  async fn history_window(
    &self,
    now: DateTime<Local>,
    group: usize,
  ) -> Result<(DateBinnedPager, Vec<Record>)> {
    let (pager, raws) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw_dates = select_visit_dates(&tx, sql::render(&ReadView::history()))?;
        let dates = decode_dates(raw_dates)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        let pager = DateBinnedPager::build(dates, &DateSorter::new(now));

        let raws = match pager.check_group(group) {
          Ok(()) => {
            let window = ReadView::history()
              .with_offset(pager.locate(group, 0))
              .with_limit(pager.child_count(group));
            select_records(&tx, sql::render(&window))?
          }
          Err(_) => Vec::new(),
        };

        tx.commit()?;
        Ok((pager, raws))
      })
      .await?;

    let records = raws
      .into_iter()
      .map(RawRecord::into_record)
      .collect::<Result<Vec<_>>>()?;
    Ok((pager, records))
  }

  async fn suggest(&self, pattern: String) -> Result<Vec<Suggestion>> {
    if pattern.is_empty() {
      return Ok(Vec::new());
    }

    let like = like_pattern(&pattern);

    let candidates: Vec<Candidate> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT title, url, COALESCE(bookmark, 0) FROM records
           WHERE title LIKE ?1 ESCAPE '\\' OR url LIKE ?1 ESCAPE '\\'
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(params![like], |row| {
            Ok(Candidate {
              title: row.get(0)?,
              url:   row.get(1)?,
              kind:  SuggestionKind::from_bookmark_flag(row.get(2)?),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rank(&pattern, candidates))
  }

  async fn insert_raw_record(&self, record: NewRecord) -> Result<RecordId> {
    let record = record.normalized(Utc::now())?;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records
             (title, url, visit_count, visited_date, creation_date, bookmark)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            record.title,
            record.url,
            record.visit_count,
            record.visited_date.map(encode_ms),
            record.creation_date.map(encode_ms),
            record.is_bookmark,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(id, "raw record inserted");
    Ok(RecordId(id))
  }
}
