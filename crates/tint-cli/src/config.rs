//! Runtime configuration.
//!
//! An optional TOML file layered under `TINT_`-prefixed environment
//! variables; every key has a default.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tint_api::{ApiSettings, DEFAULT_START_PAGE_LIMIT};
use tint_core::retention::{DEFAULT_HISTORY_SIZE_DAYS, parse_history_size};

#[derive(Debug, Clone, Deserialize)]
pub struct TintConfig {
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Days of history to keep. Kept as text and parsed leniently.
  #[serde(default = "default_history_size")]
  pub history_size:     String,
  #[serde(default = "default_start_page_limit")]
  pub start_page_limit: usize,
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/tint/tint.db") }
fn default_history_size() -> String { DEFAULT_HISTORY_SIZE_DAYS.to_string() }
fn default_start_page_limit() -> usize { DEFAULT_START_PAGE_LIMIT }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 7878 }

impl TintConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TINT").try_parsing(true))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise TintConfig")
  }

  /// History horizon in days; unparseable values fall back to the default.
  pub fn history_days(&self) -> u32 { parse_history_size(&self.history_size) }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      start_page_limit: self.start_page_limit,
      history_size:     self.history_days(),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = TintConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.start_page_limit, DEFAULT_START_PAGE_LIMIT);
    assert_eq!(cfg.history_days(), DEFAULT_HISTORY_SIZE_DAYS);
  }

  #[test]
  fn file_values_override_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
      file,
      "store_path = \"/tmp/tint-test.db\"\nhistory_size = \"30\"\nport = 9000"
    )
    .unwrap();

    let cfg = TintConfig::load(file.path()).unwrap();
    assert_eq!(cfg.store_path(), PathBuf::from("/tmp/tint-test.db"));
    assert_eq!(cfg.history_days(), 30);
    assert_eq!(cfg.address(), "127.0.0.1:9000");
  }

  #[test]
  fn bad_history_size_falls_back() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "history_size = \"forever\"").unwrap();

    let cfg = TintConfig::load(file.path()).unwrap();
    assert_eq!(cfg.api_settings().history_size, DEFAULT_HISTORY_SIZE_DAYS);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/tint.db")),
      PathBuf::from(home).join("tint.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs/tint.db")), PathBuf::from("/abs/tint.db"));
  }
}
