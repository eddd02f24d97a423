//! SQL schema for the Tint SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Bookmarks and history share one row per url identity. A row is a
-- bookmark when `bookmark = 1` and history when `visit_count > 0`.
CREATE TABLE IF NOT EXISTS records (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT,
    url           TEXT NOT NULL,
    visit_count   INTEGER NOT NULL DEFAULT 0,
    creation_date INTEGER,          -- epoch ms; set iff bookmarked
    visited_date  INTEGER,          -- epoch ms; set iff visit_count > 0
    bookmark      INTEGER,          -- 0/1; NULL reads as 0
    favicon       BLOB,
    thumbnail     BLOB
);

CREATE INDEX IF NOT EXISTS records_url_idx     ON records(url);
CREATE INDEX IF NOT EXISTS records_visited_idx ON records(visited_date);

PRAGMA user_version = 1;
";
