//! Handlers for `/bookmarks` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/bookmarks` | Optional `?limit=N` (most visited first) |
//! | `PUT`    | `/bookmarks` | Body: `{"id":?, "title":?, "url":?, "bookmark":bool}` |
//! | `DELETE` | `/bookmarks/{id}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tint_core::{
  record::{DeleteOutcome, Record, RecordId},
  store::BookmarkStore,
  view::ReadView,
};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LimitParams {
  pub limit: Option<usize>,
}

/// Response body of the delete endpoints.
#[derive(Debug, Serialize)]
pub struct Deleted {
  pub outcome: DeleteOutcome,
}

/// Map [`DeleteOutcome::NotFound`] to a 404.
pub(crate) fn deleted(outcome: DeleteOutcome, id: i64) -> Result<Json<Deleted>, ApiError> {
  match outcome {
    DeleteOutcome::NotFound => Err(ApiError::NotFound(format!("record {id} not found"))),
    outcome => Ok(Json(Deleted { outcome })),
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /bookmarks[?limit=N]`
pub async fn list<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
  let view = match params.limit {
    Some(limit) => ReadView::bookmarks_limited(limit),
    None => ReadView::bookmarks(),
  };
  let records = state.store.query(&view).await.map_err(ApiError::store)?;
  Ok(Json(records))
}

// ─── Set ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetBody {
  pub id:       Option<i64>,
  pub title:    Option<String>,
  pub url:      Option<String>,
  pub bookmark: bool,
}

#[derive(Debug, Serialize)]
pub struct SetResult {
  /// The affected record; `null` when nothing matched and nothing was added.
  pub id: Option<RecordId>,
}

/// `PUT /bookmarks`
pub async fn set<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<SetBody>,
) -> Result<Json<SetResult>, ApiError> {
  if body.id.is_none() && body.url.is_none() {
    return Err(ApiError::BadRequest("either id or url is required".into()));
  }
  let id = state
    .store
    .set_bookmark(body.id.map(RecordId), body.title, body.url, body.bookmark)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(SetResult { id }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /bookmarks/{id}`
pub async fn delete_one<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
  let outcome = state
    .store
    .delete_bookmark(RecordId(id))
    .await
    .map_err(ApiError::store)?;
  deleted(outcome, id)
}
