use crate::catalog::{goodreads, spydus, DEFAULT_USER_AGENT};
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub goodreads: GoodreadsConfig,
  #[serde(default)]
  pub library: LibraryConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  /// User agent sent to both sites
  pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoodreadsConfig {
  /// Goodreads user id, e.g. "151602501-apricot"
  pub user: Option<String>,
  #[serde(default = "default_shelf")]
  pub shelf: String,
  #[serde(default = "default_start_page")]
  pub start_page: u32,
  /// Last page to read; all pages when unset
  pub page_limit: Option<u32>,
  #[serde(default = "default_goodreads_url")]
  pub url: String,
}

impl Default for GoodreadsConfig {
  fn default() -> Self {
    Self {
      user: None,
      shelf: default_shelf(),
      start_page: default_start_page(),
      page_limit: None,
      url: default_goodreads_url(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
  /// Spydus catalogue root, e.g. "https://wml.spydus.com"
  #[serde(default = "default_library_url")]
  pub url: String,
  /// Branch to highlight and report on (matches the holdings "Location" column)
  pub branch: Option<String>,
  /// Maximum catalogue lookups in flight
  #[serde(default = "default_concurrency")]
  pub concurrency: usize,
}

impl Default for LibraryConfig {
  fn default() -> Self {
    Self {
      url: default_library_url(),
      branch: None,
      concurrency: default_concurrency(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  #[serde(default = "default_ttl_minutes")]
  pub ttl_minutes: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      ttl_minutes: default_ttl_minutes(),
    }
  }
}

fn default_shelf() -> String {
  "to-read".to_string()
}

fn default_start_page() -> u32 {
  1
}

fn default_goodreads_url() -> String {
  goodreads::DEFAULT_BASE_URL.to_string()
}

fn default_library_url() -> String {
  spydus::DEFAULT_BASE_URL.to_string()
}

fn default_concurrency() -> usize {
  4
}

fn default_true() -> bool {
  true
}

fn default_ttl_minutes() -> i64 {
  12 * 60
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./shelfcheck.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/shelfcheck/config.yaml
  ///
  /// Falls back to defaults when no file exists; the Goodreads user can then
  /// come from the command line or `SHELFCHECK_GOODREADS_USER`.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(user) = std::env::var("SHELFCHECK_GOODREADS_USER") {
      config.goodreads.user = Some(user);
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("shelfcheck.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("shelfcheck").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if config.library.concurrency == 0 {
      return Err(eyre!("library.concurrency must be at least 1"));
    }
    config.cache_ttl()?;
    Ok(config)
  }

  /// The Goodreads user, or an error explaining how to set one
  pub fn goodreads_user(&self) -> Result<&str> {
    self.goodreads.user.as_deref().ok_or_else(|| {
      eyre!(
        "No Goodreads user configured. Set goodreads.user in shelfcheck.yaml, \
         pass --user, or set SHELFCHECK_GOODREADS_USER."
      )
    })
  }

  /// How long cached holdings stay fresh
  pub fn cache_ttl(&self) -> Result<chrono::Duration> {
    let minutes = self.cache.ttl_minutes;
    if minutes < 0 {
      return Err(eyre!("cache.ttl_minutes must not be negative, got {}", minutes));
    }
    chrono::Duration::try_minutes(minutes)
      .ok_or_else(|| eyre!("cache.ttl_minutes is too large: {}", minutes))
  }

  pub fn user_agent(&self) -> &str {
    self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_config() {
    let config = Config::parse(
      r#"
goodreads:
  user: "151602501-apricot"
  shelf: currently-reading
  page_limit: 3
library:
  url: https://wml.spydus.com
  branch: Nunawading
  concurrency: 2
cache:
  enabled: false
  ttl_minutes: 30
"#,
    )
    .unwrap();

    assert_eq!(config.goodreads_user().unwrap(), "151602501-apricot");
    assert_eq!(config.goodreads.shelf, "currently-reading");
    assert_eq!(config.goodreads.start_page, 1);
    assert_eq!(config.goodreads.page_limit, Some(3));
    assert_eq!(config.library.branch.as_deref(), Some("Nunawading"));
    assert_eq!(config.library.concurrency, 2);
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.ttl_minutes, 30);
  }

  #[test]
  fn test_defaults() {
    let config = Config::parse("goodreads:\n  user: someone\n").unwrap();
    assert_eq!(config.goodreads.shelf, "to-read");
    assert_eq!(config.goodreads.url, goodreads::DEFAULT_BASE_URL);
    assert_eq!(config.library.url, spydus::DEFAULT_BASE_URL);
    assert_eq!(config.library.concurrency, 4);
    assert!(config.cache.enabled);
    assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
  }

  #[test]
  fn test_missing_user_is_an_error() {
    let config = Config::default();
    assert!(config.goodreads_user().is_err());
  }

  #[test]
  fn test_zero_concurrency_rejected() {
    assert!(Config::parse("library:\n  concurrency: 0\n").is_err());
  }

  #[test]
  fn test_cache_ttl() {
    let config = Config::parse("cache:\n  ttl_minutes: 90\n").unwrap();
    assert_eq!(config.cache_ttl().unwrap(), chrono::Duration::minutes(90));
  }

  #[test]
  fn test_out_of_range_ttl_rejected() {
    assert!(Config::parse("cache:\n  ttl_minutes: 9223372036854775807\n").is_err());
    assert!(Config::parse("cache:\n  ttl_minutes: -5\n").is_err());

    let mut config = Config::default();
    config.cache.ttl_minutes = i64::MAX;
    assert!(config.cache_ttl().is_err());
  }
}
