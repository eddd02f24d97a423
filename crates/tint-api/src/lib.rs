//! JSON REST API for Tint.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tint_core::store::BookmarkStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tint_api::api_router(store.clone(), settings))
//! ```

pub mod bookmarks;
pub mod error;
pub mod history;
pub mod maintenance;
pub mod records;
pub mod suggest;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use tint_core::{retention::DEFAULT_HISTORY_SIZE_DAYS, store::BookmarkStore};

pub use error::ApiError;

/// Start page size when a request does not ask for one.
pub const DEFAULT_START_PAGE_LIMIT: usize = 9;

/// Server-side defaults for requests that leave them out.
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
  pub start_page_limit: usize,
  /// History horizon in days used by `POST /truncate`.
  pub history_size:     u32,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      start_page_limit: DEFAULT_START_PAGE_LIMIT,
      history_size:     DEFAULT_HISTORY_SIZE_DAYS,
    }
  }
}

/// Shared handler state.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub settings: ApiSettings,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), settings: self.settings }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, settings: ApiSettings) -> Router<()>
where
  S: BookmarkStore + 'static,
{
  Router::new()
    // Records
    .route("/records/{id}", get(records::get_one::<S>))
    .route("/records/{id}/favicon", get(records::favicon::<S>))
    .route("/records/{id}/thumbnail", get(records::thumbnail::<S>))
    .route("/records/{id}/bookmark", post(records::toggle_bookmark::<S>))
    .route("/favicon", put(records::put_favicon::<S>))
    .route("/thumbnail", put(records::put_thumbnail::<S>))
    .route("/bookmarked", get(records::bookmarked::<S>))
    // Bookmarks
    .route("/bookmarks", get(bookmarks::list::<S>).put(bookmarks::set::<S>))
    .route("/bookmarks/{id}", delete(bookmarks::delete_one::<S>))
    // History
    .route("/start-page", get(history::start_page::<S>))
    .route("/visits", post(history::record_visit::<S>))
    .route("/history", get(history::list::<S>))
    .route("/history/{id}", delete(history::delete_one::<S>))
    .route("/history/groups", get(history::groups::<S>))
    .route("/history/groups/{group}", get(history::group::<S>))
    // Suggestions
    .route("/suggest", get(suggest::handler::<S>))
    // Maintenance
    .route("/clear", post(maintenance::clear::<S>))
    .route("/truncate", post(maintenance::truncate::<S>))
    .with_state(ApiState { store, settings })
}
