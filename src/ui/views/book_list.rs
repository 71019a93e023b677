use crate::availability::{apply_visibility, is_available, visible, Displayed};
use crate::catalog::types::Book;
use crate::query::{Query, QueryState};
use crate::shelf::ShelfService;
use crate::ui::components::{AvailabilityToggle, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::BookDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::debug;

/// The shelf, one line per book, filterable by availability
pub struct BookListView {
  label: String,
  branch: Option<String>,
  query: Query<Vec<Book>>,
  rows: Vec<Displayed<Book>>,
  toggle: AvailabilityToggle,
  list_state: ListState,
}

impl BookListView {
  pub fn new(service: ShelfService, branch: Option<String>) -> Self {
    let label = format!("{}/{}", service.user(), service.shelf());

    let query = Query::new(move || {
      let service = service.clone();
      async move { service.load_books().await.map_err(|e| e.to_string()) }
    });

    Self::with_query(label, branch, query)
  }

  /// Start `query` and show its books as they arrive
  fn with_query(label: String, branch: Option<String>, mut query: Query<Vec<Book>>) -> Self {
    query.fetch();

    Self {
      label,
      branch,
      query,
      rows: Vec::new(),
      toggle: AvailabilityToggle::new(),
      list_state: ListState::default(),
    }
  }

  fn visible_books(&self) -> Vec<&Book> {
    visible(&self.rows).collect()
  }

  fn on_toggle(&mut self, only_available: bool) {
    apply_visibility(only_available, &mut self.rows);
    debug!(
      "Only available = {}: {} of {} books visible",
      only_available,
      self.visible_books().len(),
      self.rows.len()
    );
    self.list_state.select(Some(0));
  }

  fn book_line(&self, book: &Book) -> Line<'static> {
    let available = book
      .holdings
      .iter()
      .filter(|h| h.status.is_available())
      .count();

    let (summary, color) = if book.holdings.is_empty() {
      ("not held".to_string(), Color::DarkGray)
    } else if is_available(book) {
      (
        format!("{}/{} available", available, book.holdings.len()),
        Color::Green,
      )
    } else {
      (format!("0/{} available", book.holdings.len()), Color::Yellow)
    };

    let at_branch = self
      .branch
      .as_deref()
      .is_some_and(|branch| book.holdings_at(branch).next().is_some());

    Line::from(vec![
      Span::styled(
        format!("{:<16}", summary),
        Style::default().fg(color),
      ),
      Span::styled(
        if at_branch { "● " } else { "  " },
        Style::default().fg(Color::Cyan),
      ),
      Span::raw(format!("{:<50}", truncate(&book.title, 50))),
      Span::raw(" "),
      Span::styled(
        truncate(&book.author, 30),
        Style::default().fg(Color::DarkGray),
      ),
    ])
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let visible_count = self.visible_books().len();
    ensure_valid_selection(&mut self.list_state, visible_count);

    let title = match self.query.state() {
      QueryState::Loading => format!(" {} (loading...) ", self.label),
      QueryState::Error(e) => format!(" {} (error: {}) ", self.label, e),
      _ => format!(" {} ({} of {}) ", self.label, visible_count, self.rows.len()),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if visible_count == 0 {
      let content = if self.query.is_loading() {
        "Reading shelf and checking the library catalogue..."
      } else if self.query.error().is_some() {
        "Failed to load the shelf. Press 'r' to retry."
      } else if self.rows.is_empty() {
        "No books found on this shelf."
      } else {
        "No available books. Press 'a' to show everything."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .visible_books()
      .into_iter()
      .map(|book| ListItem::new(self.book_line(book)))
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for BookListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let KeyResult::Event(only_available) = self.toggle.handle_key(key) {
      self.on_toggle(only_available);
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Enter => {
        let selected = self
          .list_state
          .selected()
          .and_then(|idx| self.visible_books().get(idx).map(|book| (*book).clone()));
        if let Some(book) = selected {
          return ViewAction::Push(Box::new(BookDetailView::new(book, self.branch.clone())));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.label.clone()
  }

  fn tick(&mut self) {
    if self.query.poll() {
      // Fresh rows start visible; the filter runs again on the next toggle.
      self.rows = self
        .query
        .data()
        .map(|books| books.iter().cloned().map(Displayed::new).collect())
        .unwrap_or_default();
    }
  }

  fn status(&self) -> Option<Span<'static>> {
    Some(self.toggle.span())
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("a", "only available").with_priority(10),
      Shortcut::new("enter", "holdings").with_priority(20),
      Shortcut::new("r", "reload").with_priority(30),
      Shortcut::new("q", "quit").with_priority(90),
    ]
  }
}
