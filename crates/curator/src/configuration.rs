//! Configuration for the local API connection.
//!
//! The defaults match a stock Zotero 7 install: the loopback endpoint on
//! port 23119, the user library (`users/0`), and a placeholder API key
//! (the local API ignores the key but expects the header to be present).
//!
//! A TOML file can override any field:
//!
//! ```toml
//! base_url     = "http://localhost:23119/api"
//! library_kind = "user"
//! library_id   = 0
//! timeout_secs = 60
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CuratorError, Result};

/// Which library within the reference manager to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
  /// The personal library (`users/<id>`). The local API always exposes it
  /// as user `0`.
  #[default]
  User,
  /// A group library (`groups/<id>`).
  Group,
}

/// Connection settings for the local API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Root of the API, without a trailing slash.
  pub base_url:     String,
  /// User or group library.
  pub library_kind: LibraryKind,
  /// Numeric library id. `0` for the local user library.
  pub library_id:   u64,
  /// API key sent in the `Zotero-API-Key` header. The local API accepts
  /// any value.
  pub api_key:      String,
  /// Per-request timeout in seconds. File transfers use the same limit.
  pub timeout_secs: u64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      base_url:     "http://localhost:23119/api".to_string(),
      library_kind: LibraryKind::User,
      library_id:   0,
      api_key:      "fake".to_string(),
      timeout_secs: 60,
    }
  }
}

impl Config {
  /// Loads configuration from a TOML file.
  ///
  /// Missing fields fall back to the defaults, so a partial file is fine.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
  }

  /// Loads [`Config::default_path`] if it exists, otherwise the defaults.
  pub fn load() -> Result<Self> {
    let path = Self::default_path()?;
    if path.exists() {
      Self::from_file(path)
    } else {
      Ok(Self::default())
    }
  }

  /// Platform-specific default configuration file path,
  /// e.g. `~/.config/curator/config.toml` on Linux.
  pub fn default_path() -> Result<PathBuf> {
    dirs::config_dir()
      .map(|dir| dir.join("curator").join("config.toml"))
      .ok_or_else(|| CuratorError::Config("Could not determine config directory".to_string()))
  }

  /// The library path segment, e.g. `users/0` or `groups/4827351`.
  pub fn library_prefix(&self) -> String {
    match self.library_kind {
      LibraryKind::User => format!("users/{}", self.library_id),
      LibraryKind::Group => format!("groups/{}", self.library_id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_point_at_the_local_api() {
    let config = Config::default();
    assert_eq!(config.base_url, "http://localhost:23119/api");
    assert_eq!(config.library_prefix(), "users/0");
  }

  #[test]
  fn partial_toml_falls_back_to_defaults() {
    let config: Config = toml::from_str("library_kind = \"group\"\nlibrary_id = 12").unwrap();
    assert_eq!(config.library_prefix(), "groups/12");
    assert_eq!(config.timeout_secs, 60);
  }
}
