//! Handlers for visits, history and the start page.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/start-page` | Optional `?limit=N` |
//! | `POST`   | `/visits` | Body: `{"title":?, "url":…, "original_url":?}` |
//! | `GET`    | `/history` | Optional `?limit=N` (most recent first) |
//! | `DELETE` | `/history/{id}` | 404 if not found |
//! | `GET`    | `/history/groups` | Date groups of the history view |
//! | `GET`    | `/history/groups/{group}` | 400 if out of range |
//!
//! Groups are computed per request against the current time. A single group
//! is read together with its pager, so its rows always match its bounds; a
//! client that lists the groups and then fetches one may still see them shift
//! between the two requests.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tint_core::{
  pager::DateBin,
  record::{Record, RecordId},
  store::BookmarkStore,
  view::ReadView,
};

use crate::{
  ApiState,
  bookmarks::{Deleted, LimitParams, deleted},
  error::ApiError,
};

// ─── Start page ───────────────────────────────────────────────────────────────

/// `GET /start-page[?limit=N]`
pub async fn start_page<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
  let limit = params.limit.unwrap_or(state.settings.start_page_limit);
  let records = state
    .store
    .query_start_page(limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

// ─── Visits ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VisitBody {
  pub title:        Option<String>,
  pub url:          String,
  pub original_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Visited {
  pub id: RecordId,
}

/// `POST /visits`
pub async fn record_visit<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<VisitBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.url.is_empty() {
    return Err(ApiError::BadRequest("url must not be empty".into()));
  }
  let id = state
    .store
    .record_visit(body.title, body.url, body.original_url)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(Visited { id })))
}

// ─── List / delete ────────────────────────────────────────────────────────────

/// `GET /history[?limit=N]`
pub async fn list<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
  let view = match params.limit {
    Some(limit) => ReadView::history_limited(limit),
    None => ReadView::history(),
  };
  let records = state.store.query(&view).await.map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `DELETE /history/{id}`
pub async fn delete_one<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
  let outcome = state
    .store
    .delete_history(RecordId(id))
    .await
    .map_err(ApiError::store)?;
  deleted(outcome, id)
}

// ─── Groups ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GroupSummary {
  pub group: usize,
  pub bin:   DateBin,
  pub label: &'static str,
  pub count: usize,
}

/// `GET /history/groups`
pub async fn groups<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<GroupSummary>>, ApiError> {
  let pager = state
    .store
    .history_pager(Local::now())
    .await
    .map_err(ApiError::store)?;

  let groups = pager
    .groups()
    .map(|(group, bin, count)| GroupSummary {
      group,
      bin,
      label: bin.label(),
      count,
    })
    .collect();
  Ok(Json(groups))
}

/// `GET /history/groups/{group}`
pub async fn group<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Path(group): Path<usize>,
) -> Result<Json<Vec<Record>>, ApiError> {
  let (pager, records) = state
    .store
    .history_window(Local::now(), group)
    .await
    .map_err(ApiError::store)?;

  pager
    .check_group(group)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  Ok(Json(records))
}
