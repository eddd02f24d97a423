//! Error types for `tint-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("history group {group} out of range ({groups} non-empty groups)")]
  GroupOutOfRange { group: usize, groups: usize },

  #[error("invalid history size {0:?}")]
  InvalidHistorySize(String),

  #[error("record for {0:?} is neither bookmarked nor visited")]
  EmptyRecord(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
