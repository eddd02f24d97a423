//! Core types and trait definitions for the Tint history/bookmarks store.
//!
//! Bookmarks and history share a single denormalized record type. This crate
//! holds the data model, the read views, the retention and merge rules, the
//! suggestion ranker and the date-binned pager. It is deliberately free of
//! HTTP and database dependencies; backends implement
//! [`store::BookmarkStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod error;
pub mod pager;
pub mod record;
pub mod retention;
pub mod store;
pub mod suggest;
pub mod view;

pub use error::{Error, Result};
