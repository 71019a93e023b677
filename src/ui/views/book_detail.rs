use crate::catalog::types::{Book, Holding};
use crate::ui::renderfns::status_color;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

/// Library holdings for a single book
pub struct BookDetailView {
  book: Book,
  branch: Option<String>,
  table_state: TableState,
}

impl BookDetailView {
  pub fn new(book: Book, branch: Option<String>) -> Self {
    Self {
      book,
      branch,
      table_state: TableState::default(),
    }
  }

  fn is_home_branch(&self, holding: &Holding) -> bool {
    self.branch.as_deref() == Some(holding.location.as_str())
  }

  fn holding_row(&self, holding: &Holding) -> Row<'static> {
    let status = holding.status.label().unwrap_or("Unknown").to_string();
    let location_style = if self.is_home_branch(holding) {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default()
    };

    Row::new(vec![
      Cell::from(holding.location.clone()).style(location_style),
      Cell::from(holding.collection.clone()),
      Cell::from(holding.call_number.clone()),
      Cell::from(status).style(Style::default().fg(status_color(holding.status.status()))),
    ])
  }

  fn render_detail(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.book.title))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(2), // Author, rating
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Holdings
      ])
      .split(inner);

    let header = vec![
      Line::from(vec![
        Span::styled("Author: ", Style::default().fg(Color::DarkGray)),
        Span::raw(self.book.author.as_str()),
      ]),
      Line::from(vec![
        Span::styled("Rating: ", Style::default().fg(Color::DarkGray)),
        Span::styled(self.book.rating.as_str(), Style::default().fg(Color::Yellow)),
      ]),
    ];
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    if self.book.holdings.is_empty() {
      let paragraph = Paragraph::new("Not held by this library.")
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, chunks[2]);
      return;
    }

    let rows: Vec<Row> = self
      .book
      .holdings
      .iter()
      .map(|h| self.holding_row(h))
      .collect();

    let header_row = Row::new(vec!["Location", "Collection", "Call number", "Status"])
      .style(Style::default().fg(Color::DarkGray).bold());

    let table = Table::new(
      rows,
      [
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Percentage(20),
        Constraint::Percentage(30),
      ],
    )
    .header(header_row)
    .row_highlight_style(Style::default().bg(Color::DarkGray));

    frame.render_stateful_widget(table, chunks[2], &mut self.table_state);
  }
}

impl View for BookDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.table_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.table_state.select_previous(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.book.title.clone()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("j/k", "move").with_priority(10),
      Shortcut::new("q", "back").with_priority(90),
    ]
  }
}
