//! One-shot subcommands. Results go to stdout, diagnostics to the log.

use std::{
  fs,
  io::{self, Write as _},
  path::Path,
};

use anyhow::Context as _;
use chrono::Local;
use tint_core::{
  record::{NewRecord, Record},
  store::BookmarkStore,
  view::ReadView,
};
use tint_store_sqlite::SqliteStore;

fn print_records(records: &[Record]) {
  for r in records {
    let star = if r.is_bookmark { "*" } else { " " };
    println!("{star} {:>5}  {}  <{}>", r.visit_count, r.display_title(), r.url);
  }
}

pub async fn visit(
  store: &SqliteStore,
  title: Option<String>,
  url: String,
  original_url: Option<String>,
) -> anyhow::Result<()> {
  let id = store.record_visit(title, url, original_url).await?;
  println!("{id}");
  Ok(())
}

pub async fn bookmark(
  store: &SqliteStore,
  title: Option<String>,
  url: String,
  is_bookmark: bool,
) -> anyhow::Result<()> {
  match store.set_bookmark(None, title, Some(url.clone()), is_bookmark).await? {
    Some(id) => println!("{id}"),
    None => tracing::warn!("no record for {url}"),
  }
  Ok(())
}

/// Without a limit, history is printed under its date group labels.
pub async fn history(store: &SqliteStore, limit: Option<usize>) -> anyhow::Result<()> {
  if let Some(limit) = limit {
    print_records(&store.query(&ReadView::history_limited(limit)).await?);
    return Ok(());
  }

  let pager = store.history_pager(Local::now()).await?;
  for (group, bin, count) in pager.groups() {
    println!("{} ({count})", bin.label());
    print_records(&store.history_group(&pager, group).await?);
  }
  Ok(())
}

pub async fn bookmarks(store: &SqliteStore, limit: Option<usize>) -> anyhow::Result<()> {
  let view = match limit {
    Some(limit) => ReadView::bookmarks_limited(limit),
    None => ReadView::bookmarks(),
  };
  print_records(&store.query(&view).await?);
  Ok(())
}

pub async fn suggest(store: &SqliteStore, pattern: String) -> anyhow::Result<()> {
  for s in store.suggest(pattern).await? {
    let title = s.title.as_deref().unwrap_or("");
    println!("{} [{}] {title}  <{}>", s.id, s.kind.code(), s.url);
  }
  Ok(())
}

pub async fn truncate(store: &SqliteStore, days: u32) -> anyhow::Result<()> {
  let report = store.truncate_history(days).await?;
  tracing::info!(
    days,
    deleted = report.deleted,
    demoted = report.demoted,
    "history truncated"
  );
  Ok(())
}

pub async fn clear(
  store: &SqliteStore,
  history: bool,
  bookmarks: bool,
) -> anyhow::Result<()> {
  if !history && !bookmarks {
    tracing::warn!("nothing to clear; pass --history and/or --bookmarks");
    return Ok(());
  }
  let removed = store.clear(history, bookmarks).await?;
  tracing::info!(removed, "store cleared");
  Ok(())
}

pub async fn export(store: &SqliteStore, path: Option<&Path>) -> anyhow::Result<()> {
  let records: Vec<NewRecord> = store
    .all_records()
    .await?
    .into_iter()
    .map(NewRecord::from)
    .collect();

  let json = serde_json::to_string_pretty(&records)?;
  match path {
    Some(path) => fs::write(path, json)
      .with_context(|| format!("failed to write {}", path.display()))?,
    None => writeln!(io::stdout(), "{json}")?,
  }
  tracing::info!(count = records.len(), "exported");
  Ok(())
}

/// Records that cannot be stored are skipped with a warning.
pub async fn import(store: &SqliteStore, path: &Path) -> anyhow::Result<()> {
  let raw = fs::read_to_string(path)
    .with_context(|| format!("failed to read {}", path.display()))?;
  let records: Vec<NewRecord> =
    serde_json::from_str(&raw).context("failed to parse export file")?;

  let mut imported = 0;
  for record in records {
    let url = record.url.clone();
    match store.insert_raw_record(record).await {
      Ok(_) => imported += 1,
      Err(e) => tracing::warn!("skipping {url}: {e}"),
    }
  }
  tracing::info!(imported, "imported");
  Ok(())
}
