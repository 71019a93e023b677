//! Persistent cache of catalogue lookups.
//!
//! A shelf of a few hundred books means a few hundred search and holdings
//! requests, so results are kept in SQLite keyed by catalogue + book and reused
//! while they are younger than the configured TTL.

use crate::catalog::types::{Book, Holding};
use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Mutex;

/// Holdings previously fetched for a book
#[derive(Debug, Clone)]
pub struct CachedHoldings {
  pub holdings: Vec<Holding>,
  pub cached_at: DateTime<Utc>,
}

impl CachedHoldings {
  /// Whether this entry is younger than `ttl` at `now`
  pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(self.cached_at) < ttl
  }
}

/// Trait for holdings cache backends.
pub trait HoldingsStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<CachedHoldings>>;

  fn put(&self, key: &str, holdings: &[Holding]) -> Result<()>;
}

/// Stable cache key for a book looked up in a given catalogue
pub fn cache_key(catalogue_url: &str, book: &Book) -> String {
  let input = format!(
    "holdings:{}:{}:{}",
    catalogue_url,
    book.title.trim().to_lowercase(),
    book.author.trim().to_lowercase()
  );

  let mut hasher = Sha256::new();
  hasher.update(input.as_bytes());
  hex::encode(hasher.finalize())
}

/// Store used when caching is disabled
pub struct NoopStore;

impl HoldingsStore for NoopStore {
  fn get(&self, _key: &str) -> Result<Option<CachedHoldings>> {
    Ok(None)
  }

  fn put(&self, _key: &str, _holdings: &[Holding]) -> Result<()> {
    Ok(())
  }
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS holdings_cache (
    cache_key TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// SQLite-backed holdings cache
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open or create the cache at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  pub fn in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory cache: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("shelfcheck").join("cache.db"))
  }
}

impl HoldingsStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<CachedHoldings>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, cached_at FROM holdings_cache WHERE cache_key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cached holdings: {}", e))?;

    match row {
      Some((data, cached_at)) => {
        let holdings: Vec<Holding> = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize cached holdings: {}", e))?;
        Ok(Some(CachedHoldings {
          holdings,
          cached_at: parse_datetime(&cached_at)?,
        }))
      }
      None => Ok(None),
    }
  }

  fn put(&self, key: &str, holdings: &[Holding]) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let data =
      serde_json::to_vec(holdings).map_err(|e| eyre!("Failed to serialize holdings: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO holdings_cache (cache_key, data, cached_at)
         VALUES (?, ?, datetime('now'))",
        params![key, data],
      )
      .map_err(|e| eyre!("Failed to store holdings: {}", e))?;

    Ok(())
  }
}

/// Parse SQLite's "YYYY-MM-DD HH:MM:SS" timestamps (UTC).
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::availability::StatusEntry;

  fn holding(location: &str, status: &str) -> Holding {
    Holding {
      location: location.to_string(),
      collection: "Adult Fiction".to_string(),
      call_number: "SF HERB".to_string(),
      status: StatusEntry::new(status),
    }
  }

  #[test]
  fn test_round_trip() {
    let store = SqliteStore::in_memory().unwrap();
    let holdings = vec![holding("Nunawading", "Available"), holding("Box Hill", "On loan")];

    assert!(store.get("dune").unwrap().is_none());

    store.put("dune", &holdings).unwrap();
    let cached = store.get("dune").unwrap().unwrap();
    assert_eq!(cached.holdings, holdings);
    assert!(cached.is_fresh(Duration::minutes(5), Utc::now()));
  }

  #[test]
  fn test_put_replaces_entry() {
    let store = SqliteStore::in_memory().unwrap();
    store.put("dune", &[holding("Nunawading", "On loan")]).unwrap();
    store.put("dune", &[holding("Nunawading", "Available")]).unwrap();

    let cached = store.get("dune").unwrap().unwrap();
    assert_eq!(cached.holdings.len(), 1);
    assert!(cached.holdings[0].status.is_available());
  }

  #[test]
  fn test_freshness() {
    let now = Utc::now();
    let cached = CachedHoldings {
      holdings: Vec::new(),
      cached_at: now - Duration::hours(2),
    };
    assert!(cached.is_fresh(Duration::hours(3), now));
    assert!(!cached.is_fresh(Duration::hours(1), now));
  }

  #[test]
  fn test_cache_key_normalizes_case() {
    let a = Book::new("Dune", "Herbert, Frank", "4.27");
    let b = Book::new("dune ", "HERBERT, FRANK", "4.30");
    assert_eq!(cache_key("https://wml.spydus.com", &a), cache_key("https://wml.spydus.com", &b));
    assert_ne!(cache_key("https://wml.spydus.com", &a), cache_key("https://other.spydus.com", &a));
    assert_eq!(cache_key("https://wml.spydus.com", &a).len(), 64);
  }

  #[test]
  fn test_noop_store_always_misses() {
    let store = NoopStore;
    store.put("dune", &[holding("Nunawading", "Available")]).unwrap();
    assert!(store.get("dune").unwrap().is_none());
  }
}
