//! Small helpers over `scraper` shared by the page parsers.

use color_eyre::{eyre::eyre, Result};
use scraper::{ElementRef, Selector};

pub fn selector(css: &str) -> Result<Selector> {
  Selector::parse(css).map_err(|e| eyre!("Invalid selector {:?}: {:?}", css, e))
}

/// Text of an element with each text node trimmed and empty nodes dropped
pub fn stripped_text(element: ElementRef<'_>) -> String {
  element
    .text()
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .collect()
}

/// Stripped text of the first descendant matching `selector`
pub fn select_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
  element.select(selector).next().map(stripped_text)
}
