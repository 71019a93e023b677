use super::html::{select_text, selector};
use super::types::Book;
use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.goodreads.com";

/// Outcome of parsing one page of a shelf
#[derive(Debug, Clone, PartialEq)]
pub enum ShelfPage {
  /// The shelf has no books at all
  Empty,
  /// Books on this page; an empty list means we ran past the last page
  Rows(Vec<Book>),
}

/// Scraper for public Goodreads shelves
#[derive(Clone)]
pub struct GoodreadsClient {
  http: reqwest::Client,
  base_url: String,
}

impl GoodreadsClient {
  pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
    Self {
      http,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  /// Scrape every page of a shelf, starting at `start_page`.
  ///
  /// Stops at the first non-200 response, an empty shelf, a page without
  /// rows, or once `page_limit` pages have been read.
  pub async fn scrape_shelf(
    &self,
    user: &str,
    shelf: &str,
    start_page: u32,
    page_limit: Option<u32>,
  ) -> Result<Vec<Book>> {
    let mut books = Vec::new();
    let mut page = start_page;

    loop {
      if page_limit.is_some_and(|limit| page > limit) {
        info!("Page limit of {} pages reached", page - 1);
        break;
      }

      let url = shelf_page_url(&self.base_url, user, shelf, page)?;
      let response = self
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| eyre!("Failed to fetch shelf page {}: {}", page, e))?;

      if response.status() != StatusCode::OK {
        info!("Shelf page {} returned {}, stopping", page, response.status());
        break;
      }

      let body = response
        .text()
        .await
        .map_err(|e| eyre!("Failed to read shelf page {}: {}", page, e))?;

      match parse_shelf_page(&body)? {
        ShelfPage::Empty => {
          info!("Shelf {} of {} is empty", shelf, user);
          break;
        }
        ShelfPage::Rows(rows) if rows.is_empty() => {
          info!("No more books found on page {}", page);
          break;
        }
        ShelfPage::Rows(rows) => {
          info!("Scraped page {}, found {} books", page, rows.len());
          books.extend(rows);
        }
      }

      page += 1;
    }

    Ok(books)
  }
}

fn shelf_page_url(base_url: &str, user: &str, shelf: &str, page: u32) -> Result<Url> {
  let base = format!("{}/review/list/{}", base_url, user);
  let page = page.to_string();
  Url::parse_with_params(&base, &[("shelf", shelf), ("page", page.as_str())])
    .map_err(|e| eyre!("Invalid shelf URL {}: {}", base, e))
}

/// Parse a single shelf page into books
pub fn parse_shelf_page(body: &str) -> Result<ShelfPage> {
  let document = Html::parse_document(body);

  let desktop = selector("html.desktop")?;
  if document.select(&desktop).next().is_some() {
    debug!("Shelf page uses desktop markup");
  } else {
    debug!("Shelf page uses mobile markup");
  }

  let empty = selector("p.empty")?;
  if document.select(&empty).next().is_some() {
    return Ok(ShelfPage::Empty);
  }

  let row_sel = selector("tr.bookalike.review")?;
  let title_sel = selector("td.field.title div.value")?;
  let author_sel = selector("td.field.author div.value")?;
  let rating_sel = selector("td.field.avg_rating div.value")?;

  let mut books = Vec::new();
  for row in document.select(&row_sel) {
    let title = select_text(row, &title_sel);
    let author = select_text(row, &author_sel);
    let rating = select_text(row, &rating_sel);

    match (title, author, rating) {
      (Some(title), Some(author), Some(rating)) => books.push(Book::new(title, author, rating)),
      (title, _, _) => warn!("Skipping incomplete shelf row {:?}", title),
    }
  }

  Ok(ShelfPage::Rows(books))
}
