//! "Only show available" filtering.
//!
//! Visibility is a pure function of the toggle state and each item's status
//! entries. [`compute_visibility`] does the work; [`apply_visibility`] is the
//! adapter the UI calls when the toggle changes, writing the result back onto
//! [`Displayed`] rows.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Substring that marks a status label as available. Case-sensitive.
const AVAILABLE_MARKER: &str = "Available";

/// Classification of a free-text status label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityStatus {
  Available,
  Unavailable,
  /// Label missing or blank
  Unknown,
}

impl AvailabilityStatus {
  /// Classify a scraped label.
  ///
  /// Any label containing "Available" counts, so "Not Available Right Now"
  /// is classified as available too.
  pub fn classify(label: Option<&str>) -> Self {
    match label.map(str::trim) {
      None | Some("") => AvailabilityStatus::Unknown,
      Some(l) if l.contains(AVAILABLE_MARKER) => AvailabilityStatus::Available,
      Some(_) => AvailabilityStatus::Unavailable,
    }
  }
}

/// A single status label attached to an item, classified on construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
  label: Option<String>,
  status: AvailabilityStatus,
}

impl StatusEntry {
  pub fn new(label: impl Into<String>) -> Self {
    let label = label.into();
    let status = AvailabilityStatus::classify(Some(&label));
    Self {
      label: Some(label),
      status,
    }
  }

  /// Entry for a row that carried no status at all
  pub fn missing() -> Self {
    Self {
      label: None,
      status: AvailabilityStatus::Unknown,
    }
  }

  pub fn label(&self) -> Option<&str> {
    self.label.as_deref()
  }

  pub fn status(&self) -> AvailabilityStatus {
    self.status
  }

  pub fn is_available(&self) -> bool {
    self.status == AvailabilityStatus::Available
  }
}

// Serialized as the bare label so exported JSON keeps the scraped text.
impl Serialize for StatusEntry {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.label.serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for StatusEntry {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label.map(StatusEntry::new).unwrap_or_else(StatusEntry::missing))
  }
}

/// Anything that carries status entries and can be filtered on them
pub trait StatusEntries {
  fn status_entries(&self) -> impl Iterator<Item = &StatusEntry>;
}

/// Whether an item has at least one available entry.
/// Items with no entries are never available.
pub fn is_available<T: StatusEntries>(item: &T) -> bool {
  item.status_entries().any(StatusEntry::is_available)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
  #[default]
  Visible,
  Hidden,
}

/// Compute the visibility of every item for the given toggle state.
pub fn compute_visibility<T: StatusEntries>(only_available: bool, items: &[T]) -> Vec<Visibility> {
  items
    .iter()
    .map(|item| {
      if only_available && !is_available(item) {
        Visibility::Hidden
      } else {
        Visibility::Visible
      }
    })
    .collect()
}

/// An item together with its current visibility.
/// New rows start visible until the next filter pass.
#[derive(Debug, Clone)]
pub struct Displayed<T> {
  item: T,
  visibility: Visibility,
}

impl<T> Displayed<T> {
  pub fn new(item: T) -> Self {
    Self {
      item,
      visibility: Visibility::Visible,
    }
  }

  pub fn item(&self) -> &T {
    &self.item
  }

  pub fn visibility(&self) -> Visibility {
    self.visibility
  }

  pub fn is_visible(&self) -> bool {
    self.visibility() == Visibility::Visible
  }
}

impl<T: StatusEntries> StatusEntries for Displayed<T> {
  fn status_entries(&self) -> impl Iterator<Item = &StatusEntry> {
    self.item.status_entries()
  }
}

/// Re-run the filter over `rows`, updating each row's visibility in place.
pub fn apply_visibility<T: StatusEntries>(only_available: bool, rows: &mut [Displayed<T>]) {
  let assignments = compute_visibility(only_available, &*rows);
  for (row, visibility) in rows.iter_mut().zip(assignments) {
    row.visibility = visibility;
  }
}

/// Iterate over the rows that are currently visible
pub fn visible<T>(rows: &[Displayed<T>]) -> impl Iterator<Item = &T> {
  rows.iter().filter(|r| r.is_visible()).map(Displayed::item)
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Item(Vec<StatusEntry>);

  impl Item {
    fn with(labels: &[&str]) -> Self {
      Item(labels.iter().map(|l| StatusEntry::new(*l)).collect())
    }
  }

  impl StatusEntries for Item {
    fn status_entries(&self) -> impl Iterator<Item = &StatusEntry> {
      self.0.iter()
    }
  }

  fn scenario() -> Vec<Item> {
    vec![
      Item::with(&["Available", "On Hold"]),
      Item::with(&["Checked Out"]),
      Item::with(&[]),
    ]
  }

  #[test]
  fn test_classify() {
    assert_eq!(
      AvailabilityStatus::classify(Some("Available")),
      AvailabilityStatus::Available
    );
    assert_eq!(
      AvailabilityStatus::classify(Some("On loan - Due 12 Mar 2025")),
      AvailabilityStatus::Unavailable
    );
    assert_eq!(AvailabilityStatus::classify(None), AvailabilityStatus::Unknown);
    assert_eq!(
      AvailabilityStatus::classify(Some("   ")),
      AvailabilityStatus::Unknown
    );
  }

  #[test]
  fn test_classify_is_case_sensitive() {
    assert_eq!(
      AvailabilityStatus::classify(Some("available")),
      AvailabilityStatus::Unavailable
    );
    assert_eq!(
      AvailabilityStatus::classify(Some("AVAILABLE")),
      AvailabilityStatus::Unavailable
    );
  }

  #[test]
  fn test_substring_counts_as_available() {
    let item = Item::with(&["Not Available Right Now"]);
    assert!(is_available(&item));
    assert_eq!(
      compute_visibility(true, &[item]),
      vec![Visibility::Visible]
    );
  }

  #[test]
  fn test_missing_label_is_not_available() {
    let item = Item(vec![StatusEntry::missing()]);
    assert!(!is_available(&item));
    assert_eq!(compute_visibility(true, &[item]), vec![Visibility::Hidden]);
  }

  #[test]
  fn test_scenario_checked() {
    assert_eq!(
      compute_visibility(true, &scenario()),
      vec![Visibility::Visible, Visibility::Hidden, Visibility::Hidden]
    );
  }

  #[test]
  fn test_scenario_unchecked_shows_everything() {
    assert_eq!(
      compute_visibility(false, &scenario()),
      vec![Visibility::Visible; 3]
    );
  }

  #[test]
  fn test_apply_is_idempotent() {
    let mut rows: Vec<_> = scenario().into_iter().map(Displayed::new).collect();

    apply_visibility(true, &mut rows);
    let once: Vec<_> = rows.iter().map(Displayed::visibility).collect();
    apply_visibility(true, &mut rows);
    let twice: Vec<_> = rows.iter().map(Displayed::visibility).collect();

    assert_eq!(once, twice);
    assert_eq!(visible(&rows).count(), 1);
  }

  #[test]
  fn test_apply_then_uncheck_restores_rows() {
    let mut rows: Vec<_> = scenario().into_iter().map(Displayed::new).collect();

    apply_visibility(true, &mut rows);
    assert!(!rows[1].is_visible());

    apply_visibility(false, &mut rows);
    assert!(rows.iter().all(Displayed::is_visible));
  }

  #[test]
  fn test_new_rows_start_visible() {
    let row = Displayed::new(Item::with(&["Checked Out"]));
    assert_eq!(row.visibility(), Visibility::Visible);
  }

  #[test]
  fn test_status_entry_serializes_as_label() {
    let json = serde_json::to_string(&StatusEntry::new("Available")).unwrap();
    assert_eq!(json, "\"Available\"");

    let missing: StatusEntry = serde_json::from_str("null").unwrap();
    assert_eq!(missing, StatusEntry::missing());
  }
}
