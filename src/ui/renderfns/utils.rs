use crate::availability::AvailabilityStatus;
use ratatui::prelude::Color;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for a holding's status
pub fn status_color(status: AvailabilityStatus) -> Color {
  match status {
    AvailabilityStatus::Available => Color::Green,
    AvailabilityStatus::Unavailable => Color::Yellow,
    AvailabilityStatus::Unknown => Color::DarkGray,
  }
}
