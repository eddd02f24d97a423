//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as epoch milliseconds. The bookmark flag is an
//! integer where NULL reads as 0.

use chrono::{DateTime, Utc};
use tint_core::record::{Record, RecordId};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_ms(dt: DateTime<Utc>) -> i64 { dt.timestamp_millis() }

pub fn decode_ms(ms: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp_millis(ms).ok_or(Error::Timestamp(ms))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every query that decodes a [`RawRecord`].
pub const RECORD_COLUMNS: &str = "id, title, url, visit_count, creation_date, \
                                  visited_date, COALESCE(bookmark, 0), \
                                  favicon, thumbnail";

/// Raw values read directly from a `records` row.
pub struct RawRecord {
  pub id:            i64,
  pub title:         Option<String>,
  pub url:           String,
  pub visit_count:   i64,
  pub creation_date: Option<i64>,
  pub visited_date:  Option<i64>,
  pub bookmark:      i64,
  pub favicon:       Option<Vec<u8>>,
  pub thumbnail:     Option<Vec<u8>>,
}

impl RawRecord {
  /// Read a row selected with [`RECORD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawRecord {
      id:            row.get(0)?,
      title:         row.get(1)?,
      url:           row.get(2)?,
      visit_count:   row.get(3)?,
      creation_date: row.get(4)?,
      visited_date:  row.get(5)?,
      bookmark:      row.get(6)?,
      favicon:       row.get(7)?,
      thumbnail:     row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<Record> {
    let visit_count = u32::try_from(self.visit_count).map_err(|_| {
      Error::VisitCount { id: self.id, count: self.visit_count }
    })?;

    Ok(Record {
      id: RecordId(self.id),
      title: self.title,
      url: self.url,
      visit_count,
      creation_date: self.creation_date.map(decode_ms).transpose()?,
      visited_date: self.visited_date.map(decode_ms).transpose()?,
      is_bookmark: self.bookmark != 0,
      favicon: self.favicon,
      thumbnail: self.thumbnail,
    })
  }
}
