//! Error type for `tint-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tint_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored epoch-millisecond value outside the representable range.
  #[error("timestamp out of range: {0} ms")]
  Timestamp(i64),

  #[error("negative visit count {count} on record {id}")]
  VisitCount { id: i64, count: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
