use crate::ui::view::Shortcut;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with app name, shelf, library, view status and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  shelf: &str,
  library_url: &str,
  status: Option<Span<'static>>,
  shortcuts: &[Shortcut],
) {
  let line = header_line(shelf, library_url, status, shortcuts);
  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn header_line(
  shelf: &str,
  library_url: &str,
  status: Option<Span<'static>>,
  shortcuts: &[Shortcut],
) -> Line<'static> {
  let mut spans = vec![
    Span::styled(" shelfcheck ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", shelf), Style::default().fg(Color::Yellow).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", extract_domain(library_url)),
      Style::default().fg(Color::White),
    ),
  ];

  if let Some(status) = status {
    spans.push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
    spans.push(status);
    spans.push(Span::raw(" "));
  }
  spans.push(Span::raw(" "));

  let mut shortcuts = shortcuts.to_vec();
  shortcuts.sort_by_key(|s| s.priority);

  for shortcut in shortcuts {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  Line::from(spans)
}

/// Extract domain from a catalogue URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
  }

  #[test]
  fn test_extract_domain() {
    assert_eq!(extract_domain("https://wml.spydus.com"), "wml.spydus.com");
    assert_eq!(
      extract_domain("https://wml.spydus.com/cgi-bin/spydus.exe"),
      "wml.spydus.com"
    );
    assert_eq!(extract_domain("http://localhost:8080"), "localhost:8080");
  }

  #[test]
  fn test_header_shows_status_before_shortcuts() {
    let shortcuts = [
      Shortcut::new("q", "quit").with_priority(90),
      Shortcut::new("a", "only available").with_priority(10),
    ];
    let line = header_line(
      "someone/to-read",
      "https://wml.spydus.com",
      Some(Span::raw("[x] only available")),
      &shortcuts,
    );
    let text = text(&line);

    assert!(text.contains(" someone/to-read "));
    assert!(text.contains(" wml.spydus.com "));
    let status = text.find("[x] only available").unwrap();
    let first = text.find("<a>").unwrap();
    let last = text.find("<q>").unwrap();
    assert!(status < first && first < last);
  }

  #[test]
  fn test_header_without_status() {
    let line = header_line("someone/to-read", "https://wml.spydus.com", None, &[]);
    assert!(!text(&line).contains("only available"));
  }
}
