//! `tint`: history/bookmarks store binary.
//!
//! Reads `tint.toml` (or the path specified with `--config`), opens the
//! SQLite store, and either serves the JSON API or runs a one-shot command.
//!
//! ```
//! tint serve
//! tint visit https://example.com/ --title Example
//! tint history
//! tint suggest git
//! ```

mod commands;
mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tint_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::TintConfig;

#[derive(Parser)]
#[command(author, version, about = "Tint history and bookmarks store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tint.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API over HTTP.
  Serve,

  /// Record a page visit.
  Visit {
    url:          String,
    #[arg(long)]
    title:        Option<String>,
    /// The url originally requested, before redirects.
    #[arg(long)]
    original_url: Option<String>,
  },

  /// Bookmark a url, or remove its bookmark.
  Bookmark {
    url:    String,
    #[arg(long)]
    title:  Option<String>,
    #[arg(long)]
    remove: bool,
  },

  /// Print history grouped by date, or the most recent entries.
  History {
    #[arg(long)]
    limit: Option<usize>,
  },

  /// Print bookmarks, most visited first.
  Bookmarks {
    #[arg(long)]
    limit: Option<usize>,
  },

  /// Print type-ahead suggestions for a pattern.
  Suggest { pattern: String },

  /// Expire old history.
  Truncate {
    /// Days of history to keep; defaults to `history_size`.
    #[arg(long)]
    days: Option<u32>,
  },

  /// Remove history, bookmarks, or both.
  Clear {
    #[arg(long)]
    history:   bool,
    #[arg(long)]
    bookmarks: bool,
  },

  /// Write every record as JSON to a file, or stdout.
  Export { path: Option<PathBuf> },

  /// Insert records from a JSON file written by `export`.
  Import { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = TintConfig::load(&cli.config)?;

  let store_path = cfg.store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Serve => serve(store, &cfg).await,
    Command::Visit { url, title, original_url } => {
      commands::visit(&store, title, url, original_url).await
    }
    Command::Bookmark { url, title, remove } => {
      commands::bookmark(&store, title, url, !remove).await
    }
    Command::History { limit } => commands::history(&store, limit).await,
    Command::Bookmarks { limit } => commands::bookmarks(&store, limit).await,
    Command::Suggest { pattern } => commands::suggest(&store, pattern).await,
    Command::Truncate { days } => {
      commands::truncate(&store, days.unwrap_or_else(|| cfg.history_days())).await
    }
    Command::Clear { history, bookmarks } => {
      commands::clear(&store, history, bookmarks).await
    }
    Command::Export { path } => commands::export(&store, path.as_deref()).await,
    Command::Import { path } => commands::import(&store, &path).await,
  }
}

async fn serve(store: SqliteStore, cfg: &TintConfig) -> anyhow::Result<()> {
  let app = tint_api::api_router(Arc::new(store), cfg.api_settings())
    .layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
