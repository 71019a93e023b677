use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

/// The "only show available" checkbox, flipped with `a`.
///
/// Emits the new checked state whenever it changes; the owning view re-runs
/// the availability filter in response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvailabilityToggle {
  checked: bool,
}

impl AvailabilityToggle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_checked(&self) -> bool {
    self.checked
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<bool> {
    match key.code {
      KeyCode::Char('a') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.checked = !self.checked;
        KeyResult::Event(self.checked)
      }
      _ => KeyResult::NotHandled,
    }
  }

  pub fn span(&self) -> Span<'static> {
    if self.is_checked() {
      Span::styled("[x] only available", Style::default().fg(Color::Green).bold())
    } else {
      Span::styled("[ ] only available", Style::default().fg(Color::DarkGray))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
  }

  #[test]
  fn test_toggle_flips_and_reports_state() {
    let mut toggle = AvailabilityToggle::new();
    assert!(!toggle.is_checked());

    assert_eq!(toggle.handle_key(key('a')), KeyResult::Event(true));
    assert!(toggle.is_checked());

    assert_eq!(toggle.handle_key(key('a')), KeyResult::Event(false));
    assert!(!toggle.is_checked());
  }

  #[test]
  fn test_span_follows_state() {
    let mut toggle = AvailabilityToggle::new();
    assert_eq!(toggle.span().content, "[ ] only available");

    toggle.handle_key(key('a'));
    assert_eq!(toggle.span().content, "[x] only available");
  }

  #[test]
  fn test_other_keys_not_handled() {
    let mut toggle = AvailabilityToggle::new();
    assert_eq!(toggle.handle_key(key('j')), KeyResult::NotHandled);
    assert_eq!(
      toggle.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)),
      KeyResult::NotHandled
    );
    assert!(!toggle.is_checked());
  }
}
