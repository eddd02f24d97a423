//! Handlers for single records and their images.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records/{id}` | 404 if not found |
//! | `GET`  | `/records/{id}/favicon` | Raw bytes; 404 if none |
//! | `GET`  | `/records/{id}/thumbnail` | Raw bytes; 404 if none |
//! | `POST` | `/records/{id}/bookmark` | Body: `{"bookmark":true}` |
//! | `PUT`  | `/favicon?url=&original_url=` | Raw body |
//! | `PUT`  | `/thumbnail?url=&original_url=` | Raw body; bookmarks only |
//! | `GET`  | `/bookmarked?url=&original_url=` | `{"bookmarked":bool}` |

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::header,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tint_core::{
  record::{Record, RecordId},
  store::BookmarkStore,
};

use crate::{ApiState, error::ApiError};

async fn fetch<S: BookmarkStore>(store: &S, id: i64) -> Result<Record, ApiError> {
  store
    .get_record(RecordId(id))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))
}

fn image_response(
  image: Option<Vec<u8>>,
  what: &str,
  id: i64,
) -> Result<impl IntoResponse, ApiError> {
  let image =
    image.ok_or_else(|| ApiError::NotFound(format!("record {id} has no {what}")))?;
  Ok(([(header::CONTENT_TYPE, "application/octet-stream")], image))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/{id}`
pub async fn get_one<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Record>, ApiError> {
  Ok(Json(fetch(state.store.as_ref(), id).await?))
}

/// `GET /records/{id}/favicon`
pub async fn favicon<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
  let record = fetch(state.store.as_ref(), id).await?;
  image_response(record.favicon, "favicon", id)
}

/// `GET /records/{id}/thumbnail`
pub async fn thumbnail<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
  let record = fetch(state.store.as_ref(), id).await?;
  image_response(record.thumbnail, "thumbnail", id)
}

// ─── Toggle ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
  pub bookmark: bool,
}

/// `POST /records/{id}/bookmark`, body `{"bookmark":true}`
///
/// Responds with the updated record, or `null` when clearing the flag of an
/// unvisited record removed it.
pub async fn toggle_bookmark<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<ToggleBody>,
) -> Result<Json<Option<Record>>, ApiError> {
  let changed = state
    .store
    .toggle_bookmark(RecordId(id), body.bookmark)
    .await
    .map_err(ApiError::store)?;
  if !changed {
    return Err(ApiError::NotFound(format!("record {id} not found")));
  }
  let record = state
    .store
    .get_record(RecordId(id))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(record))
}

// ─── Images ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UrlParams {
  pub url:          String,
  pub original_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Updated {
  pub updated: usize,
}

/// `PUT /favicon?url=<url>[&original_url=<url>]`
pub async fn put_favicon<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<UrlParams>,
  body: Bytes,
) -> Result<Json<Updated>, ApiError> {
  let updated = state
    .store
    .update_favicon(params.url, params.original_url, body.to_vec())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Updated { updated }))
}

/// `PUT /thumbnail?url=<url>[&original_url=<url>]`
pub async fn put_thumbnail<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<UrlParams>,
  body: Bytes,
) -> Result<Json<Updated>, ApiError> {
  let updated = state
    .store
    .update_thumbnail(params.url, params.original_url, body.to_vec())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Updated { updated }))
}

// ─── Bookmark lookup ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Bookmarked {
  pub bookmarked: bool,
}

/// `GET /bookmarked?url=<url>[&original_url=<url>]`
pub async fn bookmarked<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<UrlParams>,
) -> Result<Json<Bookmarked>, ApiError> {
  let bookmarked = state
    .store
    .url_has_bookmark(params.url, params.original_url)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Bookmarked { bookmarked }))
}
