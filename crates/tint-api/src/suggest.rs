//! Handler for `GET /suggest?q=<pattern>`.
//!
//! A missing or empty `q` returns an empty list.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use tint_core::{store::BookmarkStore, suggest::Suggestion};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /suggest?q=<pattern>`
pub async fn handler<S: BookmarkStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<SuggestParams>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
  let suggestions = state
    .store
    .suggest(params.q)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(suggestions))
}
