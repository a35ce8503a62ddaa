use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(String),
  #[error("failed to read config file {path}: {source}")]
  Io {
    path: String,
    source: std::io::Error,
  },
  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: String,
    source: serde_yaml::Error,
  },
  #[error("could not determine data directory")]
  NoDataDir,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub storage: StorageConfig,
  pub cache: CacheConfig,
  pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base URL of the story backend, without a trailing slash.
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://story-api.dicoding.dev/v1".to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  /// Path to the local store database (default: XDG data dir)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Cache generation identifier. Bumping it purges every response stored
  /// under a previous generation the next time the cache is opened.
  pub generation: String,
  /// Path to the response cache database (default: XDG data dir)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      generation: "cerita-v1".to_string(),
      path: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
  /// Page size used for the opportunistic first-page refresh after a create.
  pub page_size: u32,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self { page_size: 10 }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./cerita.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cerita/config.yaml
  ///
  /// Every field has a default, so a missing config file yields the default
  /// configuration rather than an error.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ConfigError::NotFound(p.display().to_string()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("cerita.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cerita").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
      path: path.display().to_string(),
      source: e,
    })?;

    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
      path: path.display().to_string(),
      source: e,
    })
  }

  /// Resolve the bearer token: explicit value first, CERITA_TOKEN env second.
  /// The token is deliberately not part of the config file.
  pub fn token(explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| std::env::var("CERITA_TOKEN").ok())
  }

  /// Path of the local store database.
  pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
    match &self.storage.path {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("store.db")),
    }
  }

  /// Path of the response cache database.
  pub fn response_cache_path(&self) -> Result<PathBuf, ConfigError> {
    match &self.cache.path {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("http-cache.db")),
    }
  }

  fn data_dir() -> Result<PathBuf, ConfigError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or(ConfigError::NoDataDir)?;

    Ok(data_dir.join("cerita"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_file_keeps_defaults_for_the_rest() {
    let config: Config =
      serde_yaml::from_str("api:\n  base_url: http://localhost:9000/v1\n").expect("parse");
    assert_eq!(config.api.base_url, "http://localhost:9000/v1");
    assert_eq!(config.sync.page_size, 10);
    assert_eq!(config.cache.generation, "cerita-v1");
  }

  #[test]
  fn explicit_missing_path_is_an_error() {
    let err = Config::load(Some(Path::new("/nonexistent/cerita.yaml"))).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
  }
}
