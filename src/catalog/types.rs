use crate::availability::{StatusEntries, StatusEntry};
use serde::{Deserialize, Serialize};

/// A book from a Goodreads shelf, optionally annotated with library holdings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
  pub title: String,
  pub author: String,
  /// Average rating as shown on Goodreads (e.g. "4.21")
  pub rating: String,
  #[serde(
    rename = "availability",
    default,
    skip_serializing_if = "Vec::is_empty"
  )]
  pub holdings: Vec<Holding>,
}

impl Book {
  pub fn new(title: impl Into<String>, author: impl Into<String>, rating: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      author: author.into(),
      rating: rating.into(),
      holdings: Vec::new(),
    }
  }

  /// Holdings at a specific branch (exact location match)
  pub fn holdings_at<'a>(&'a self, branch: &'a str) -> impl Iterator<Item = &'a Holding> {
    self.holdings.iter().filter(move |h| h.location == branch)
  }
}

impl StatusEntries for Book {
  fn status_entries(&self) -> impl Iterator<Item = &StatusEntry> {
    self.holdings.iter().map(|h| &h.status)
  }
}

/// One physical copy in the library catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
  pub location: String,
  pub collection: String,
  pub call_number: String,
  pub status: StatusEntry,
}
