use super::html::{select_text, selector, stripped_text};
use super::types::{Book, Holding};
use crate::availability::StatusEntry;
use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://wml.spydus.com";

const SEARCH_PATH: &str = "/cgi-bin/spydus.exe/ENQ/WPAC/BIBENQ";
const FULL_RECORD: &str = "FULL/WPAC/BIBENQ";
const HOLDINGS_RECORD: &str = "XHLD/WPAC/BIBENQ";
const CALL_NUMBER_FALLBACK: &str = "N/A";

/// Client for a Spydus library catalogue (OPAC)
#[derive(Clone)]
pub struct SpydusClient {
  http: reqwest::Client,
  base_url: String,
}

impl SpydusClient {
  pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
    Self {
      http,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Find `book` in the catalogue and return its holdings.
  /// Returns an empty list when no print edition matches.
  pub async fn lookup(&self, book: &Book) -> Result<Vec<Holding>> {
    let url = search_url(&self.base_url, book)?;
    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to search catalogue for {:?}: {}", book.title, e))?;

    if response.status() != StatusCode::OK {
      warn!(
        "Catalogue search for {:?} returned {}",
        book.title,
        response.status()
      );
    }

    let body = response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read search results for {:?}: {}", book.title, e))?;

    let Some(href) = find_record_link(&body, book)? else {
      debug!("No catalogue match for {:?} by {:?}", book.title, book.author);
      return Ok(Vec::new());
    };

    let url = holdings_url(&self.base_url, &href);
    let response = self
      .http
      .get(&url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch holdings for {:?}: {}", book.title, e))?;

    if response.status() != StatusCode::OK {
      warn!("Holdings page {} returned {}", url, response.status());
      return Ok(Vec::new());
    }

    let body = response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read holdings for {:?}: {}", book.title, e))?;

    parse_holdings(&body)
  }
}

fn search_url(base_url: &str, book: &Book) -> Result<Url> {
  let query = format!("{} {}", book.title, book.author);
  let base = format!("{}{}", base_url, SEARCH_PATH);
  Url::parse_with_params(
    &base,
    &[
      ("ENTRY", query.as_str()),
      ("ENTRY_NAME", "BS"),
      ("ENTRY_TYPE", "K"),
      ("SORTS", "SQL_REL_BIB"),
      ("GQ", query.as_str()),
      ("CF", "GEN"),
      ("NRECS", "20"),
      ("QRY", ""),
      ("QRYTEXT", "Full catalogue"),
      ("_SPQ", "2"),
    ],
  )
  .map_err(|e| eyre!("Invalid catalogue URL {}: {}", base, e))
}

/// Holdings live on the "XHLD" variant of a record's full-display URL.
fn holdings_url(base_url: &str, href: &str) -> String {
  let full = if href.starts_with("http://") || href.starts_with("https://") {
    href.to_string()
  } else {
    format!("{}{}", base_url, href)
  };
  full.replace(FULL_RECORD, HOLDINGS_RECORD)
}

/// Loose title comparison: either title contains the other, ignoring case
pub fn is_title_match(a: &str, b: &str) -> bool {
  contains_either_way(a, b)
}

/// Loose author comparison: either name contains the other, ignoring case
pub fn is_author_match(a: &str, b: &str) -> bool {
  contains_either_way(a, b)
}

fn contains_either_way(a: &str, b: &str) -> bool {
  let (a, b) = (a.to_lowercase(), b.to_lowercase());
  a.contains(&b) || b.contains(&a)
}

/// Link to the first print record in the search results matching `book`
pub fn find_record_link(body: &str, book: &Book) -> Result<Option<String>> {
  let document = Html::parse_document(body);
  let card_sel = selector("div.card-record-body")?;
  let title_sel = selector("h2.card-title")?;
  let author_sel = selector("div.card-text.recdetails span.d-block")?;
  let link_sel = selector("a[href]")?;

  for card in document.select(&card_sel) {
    let text: String = card.text().collect();
    if text.to_lowercase().contains("electronic resource") {
      continue;
    }

    let (Some(title), Some(author)) = (
      card.select(&title_sel).next().map(|t| t.text().collect::<String>()),
      card.select(&author_sel).next().map(|a| a.text().collect::<String>()),
    ) else {
      continue;
    };

    if !is_title_match(&book.title, title.trim()) || !is_author_match(&book.author, author.trim()) {
      continue;
    }

    if let Some(href) = card
      .select(&link_sel)
      .next()
      .and_then(|a| a.value().attr("href"))
    {
      return Ok(Some(href.to_string()));
    }
  }

  Ok(None)
}

/// Parse the holdings table of a record
pub fn parse_holdings(body: &str) -> Result<Vec<Holding>> {
  let document = Html::parse_document(body);
  let row_sel = selector("table.table.table-stacked tbody tr")?;
  let location_sel = selector(r#"td[data-caption="Location"]"#)?;
  let collection_sel = selector(r#"td[data-caption="Collection"]"#)?;
  let call_number_sel = selector(r#"td[data-caption="Call number"]"#)?;
  let status_sel = selector(r#"td[data-caption="Status/Desc"]"#)?;

  let holdings = document
    .select(&row_sel)
    .map(|row| Holding {
      location: select_text(row, &location_sel).unwrap_or_default(),
      collection: select_text(row, &collection_sel).unwrap_or_default(),
      call_number: row
        .select(&call_number_sel)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| CALL_NUMBER_FALLBACK.to_string()),
      status: select_text(row, &status_sel)
        .map(StatusEntry::new)
        .unwrap_or_else(StatusEntry::missing),
    })
    .collect();

  Ok(holdings)
}
