//! Bulk maintenance endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/clear` | Body: `{"history":bool, "bookmarks":bool}` |
//! | `POST` | `/truncate` | Body: `{"max_age_days":?}`; defaults to the configured size |

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tint_core::{retention::TruncateReport, store::BookmarkStore};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ClearBody {
  #[serde(default)]
  pub history:   bool,
  #[serde(default)]
  pub bookmarks: bool,
}

#[derive(Debug, Serialize)]
pub struct Cleared {
  pub removed: usize,
}

/// `POST /clear`
pub async fn clear<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<ClearBody>,
) -> Result<Json<Cleared>, ApiError> {
  let removed = state
    .store
    .clear(body.history, body.bookmarks)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    history = body.history,
    bookmarks = body.bookmarks,
    removed,
    "store cleared"
  );
  Ok(Json(Cleared { removed }))
}

#[derive(Debug, Deserialize)]
pub struct TruncateBody {
  #[serde(default)]
  pub max_age_days: Option<u32>,
}

/// `POST /truncate`
pub async fn truncate<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<TruncateBody>,
) -> Result<Json<TruncateReport>, ApiError> {
  let days = body.max_age_days.unwrap_or(state.settings.history_size);
  let report = state
    .store
    .truncate_history(days)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(report))
}
