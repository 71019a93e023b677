//! Shelf loading: scrape the Goodreads shelf, then annotate each book with
//! its library holdings. Also hosts the branch report and JSON export used by
//! the headless mode.

use crate::cache::{cache_key, HoldingsStore};
use crate::catalog::goodreads::GoodreadsClient;
use crate::catalog::spydus::SpydusClient;
use crate::catalog::types::{Book, Holding};
use crate::config::Config;
use chrono::{Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use futures::{stream, StreamExt};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Loads a user's shelf together with library availability
#[derive(Clone)]
pub struct ShelfService {
  goodreads: GoodreadsClient,
  library: SpydusClient,
  store: Arc<dyn HoldingsStore>,
  user: String,
  shelf: String,
  start_page: u32,
  page_limit: Option<u32>,
  concurrency: usize,
  ttl: Duration,
}

impl ShelfService {
  pub fn new(config: &Config, store: Arc<dyn HoldingsStore>) -> Result<Self> {
    let user = config.goodreads_user()?.to_string();

    let http = reqwest::Client::builder()
      .user_agent(config.user_agent())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      goodreads: GoodreadsClient::new(http.clone(), config.goodreads.url.clone()),
      library: SpydusClient::new(http, config.library.url.clone()),
      store,
      user,
      shelf: config.goodreads.shelf.clone(),
      start_page: config.goodreads.start_page,
      page_limit: config.goodreads.page_limit,
      concurrency: config.library.concurrency.max(1),
      ttl: config.cache_ttl()?,
    })
  }

  pub fn user(&self) -> &str {
    &self.user
  }

  pub fn shelf(&self) -> &str {
    &self.shelf
  }

  pub fn library_url(&self) -> &str {
    self.library.base_url()
  }

  /// Scrape the shelf and look up every book, keeping shelf order.
  pub async fn load_books(&self) -> Result<Vec<Book>> {
    let books = self
      .goodreads
      .scrape_shelf(&self.user, &self.shelf, self.start_page, self.page_limit)
      .await?;

    info!(
      "Looking up {} books from {}/{} in {}",
      books.len(),
      self.user,
      self.shelf,
      self.library.base_url()
    );

    let books = stream::iter(books)
      .map(|book| self.annotate(book))
      .buffered(self.concurrency)
      .collect::<Vec<_>>()
      .await;

    Ok(books)
  }

  async fn annotate(&self, mut book: Book) -> Book {
    book.holdings = self.holdings_for(&book).await;
    book
  }

  /// Holdings for a book, from cache when fresh. Lookup failures degrade to
  /// no holdings so one bad record doesn't sink the whole shelf.
  async fn holdings_for(&self, book: &Book) -> Vec<Holding> {
    let key = cache_key(self.library.base_url(), book);

    match self.store.get(&key) {
      Ok(Some(cached)) if cached.is_fresh(self.ttl, Utc::now()) => {
        debug!("Cache hit for {:?}", book.title);
        return cached.holdings;
      }
      Ok(_) => {}
      Err(e) => warn!("Cache read failed for {:?}: {}", book.title, e),
    }

    match self.library.lookup(book).await {
      Ok(holdings) => {
        if let Err(e) = self.store.put(&key, &holdings) {
          warn!("Cache write failed for {:?}: {}", book.title, e);
        }
        holdings
      }
      Err(e) => {
        warn!("Lookup failed for {:?}: {}", book.title, e);
        Vec::new()
      }
    }
  }
}

/// Books with at least one copy at `branch`
pub fn find_at<'a>(books: &'a [Book], branch: &str) -> Vec<&'a Book> {
  books
    .iter()
    .filter(|book| book.holdings_at(branch).next().is_some())
    .collect()
}

/// Plain-text report of `books` listing only their copies at `branch`
pub fn format_report(books: &[&Book], branch: &str) -> String {
  books
    .iter()
    .map(|book| {
      let mut lines = vec![
        format!("Title: {}", book.title),
        format!("Author: {}", book.author),
        format!("Rating: {}", book.rating),
      ];
      lines.extend(book.holdings_at(branch).map(|h| {
        format!(
          "Branch: {}, Call Number: {}, Status: {}",
          h.location,
          h.call_number,
          h.status.label().unwrap_or("Unknown")
        )
      }));
      lines.join("\n")
    })
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Write `books` as pretty JSON (4-space indent)
pub fn save_json<T: Serialize>(books: &[T], path: &Path) -> Result<()> {
  let file = std::fs::File::create(path)
    .map_err(|e| eyre!("Failed to create {}: {}", path.display(), e))?;
  let writer = std::io::BufWriter::new(file);

  let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
  let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
  books
    .serialize(&mut serializer)
    .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
  serializer
    .into_inner()
    .flush()
    .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;

  info!("Saved {} books to {}", books.len(), path.display());
  Ok(())
}
