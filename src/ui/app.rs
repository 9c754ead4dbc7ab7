use std::mem;

use crossterm::event::KeyCode;
use log::info;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use crate::db::BookStore;
use crate::models::Book;
use crate::service::{CatalogService, Outcome};

use super::forms::{BookForm, FormField};
use super::helpers::{centered_popup, wrapped_height};
use super::screens::BookTable;

/// Footer space reserved for the status line and key hints.
const FOOTER_HEIGHT: u16 = 3;
/// Header space for the title bar.
const HEADER_HEIGHT: u16 = 3;
/// Rows for the "Book Information" panel: five fields plus borders.
const FORM_HEIGHT: u16 = 7;
/// Rows table scrolling moves on PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Modal layer on top of the main screen.
enum Mode {
    Normal,
    ConfirmDelete { id: i64 },
    Notice(Notice),
}

/// A modal message box. Dismissed with Enter or Esc.
pub(crate) struct Notice {
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) kind: StatusKind,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer and notices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Which column a search action targets.
#[derive(Copy, Clone)]
enum SearchTarget {
    Title,
    Author,
}

/// Form-and-table front end over a [`CatalogService`]. Every action goes
/// through the service and its [`Outcome`] decides what the user sees.
pub struct App<S: BookStore> {
    service: CatalogService<S>,
    form: BookForm,
    table: BookTable,
    total: Option<i64>,
    mode: Mode,
    status: StatusMessage,
}

impl<S: BookStore> App<S> {
    pub fn new(service: CatalogService<S>) -> Self {
        Self {
            service,
            form: BookForm::default(),
            table: BookTable::default(),
            total: None,
            mode: Mode::Normal,
            status: StatusMessage {
                text: "Ready".to_string(),
                kind: StatusKind::Info,
            },
        }
    }

    /// Report the startup connectivity probe and load the table.
    pub fn start(&mut self, connected: bool) {
        if connected {
            self.load_books();
            self.set_status("Connected to database successfully!", StatusKind::Info);
        } else {
            self.set_status("Database connection failed!", StatusKind::Error);
            self.show_error(
                "Database Connection Error",
                "Cannot connect to database!\nPlease check the database path and permissions.",
            );
        }
    }

    /// Process a key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::ConfirmDelete { id } => self.handle_confirm_delete(code, id),
            Mode::Notice(notice) => match code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Mode::Normal,
                _ => Mode::Notice(notice),
            },
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Esc => *exit = true,
            KeyCode::Tab => self.form.next_field(),
            KeyCode::BackTab => self.form.previous_field(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(ch) => {
                self.form.push_char(ch);
            }
            KeyCode::Up => self.table.move_selection(-1),
            KeyCode::Down => self.table.move_selection(1),
            KeyCode::PageUp => self.table.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.table.move_selection(PAGE_STEP),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            KeyCode::Enter => {
                if let Some(book) = self.table.current_book().cloned() {
                    self.form.fill_from(&book);
                    self.set_status(format!("Selected book {}", book.id), StatusKind::Info);
                }
            }
            KeyCode::F(2) => self.add_book(),
            KeyCode::F(3) => self.update_book(),
            KeyCode::F(4) => return self.request_delete(),
            KeyCode::F(5) => self.load_books(),
            KeyCode::F(6) => self.search(SearchTarget::Title),
            KeyCode::F(7) => self.search(SearchTarget::Author),
            KeyCode::F(8) => {
                self.form.clear();
                self.set_status("Fields cleared", StatusKind::Info);
            }
            _ => {}
        }
        mem::replace(&mut self.mode, Mode::Normal)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, id: i64) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.delete_book(id);
                mem::replace(&mut self.mode, Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmDelete { id },
        }
    }

    fn add_book(&mut self) {
        self.save_book("Add Book", "added", "add", |service, book| {
            service.add(Some(book))
        });
    }

    fn update_book(&mut self) {
        self.save_book("Update Book", "updated", "update", |service, book| {
            service.update(Some(book))
        });
    }

    /// Shared flow of add and update: parse the form, call the service, then
    /// either refresh and confirm or report the failure.
    fn save_book(
        &mut self,
        action: &str,
        done: &str,
        verb: &str,
        call: impl FnOnce(&CatalogService<S>, &Book) -> Outcome<()>,
    ) {
        let book = match self.form.parse_book() {
            Ok(book) => book,
            Err(err) => {
                self.show_error(action, err.to_string());
                return;
            }
        };

        let outcome = call(&self.service, &book);
        self.finish_mutation(action, &outcome, done, verb);
    }

    fn request_delete(&mut self) -> Mode {
        match self.form.parse_id() {
            Ok(id) => Mode::ConfirmDelete { id },
            Err(err) => {
                self.show_error("Delete Book", err.to_string());
                mem::replace(&mut self.mode, Mode::Normal)
            }
        }
    }

    fn delete_book(&mut self, id: i64) {
        let outcome = self.service.delete(id);
        self.finish_mutation("Delete Book", &outcome, "deleted", "delete");
    }

    fn finish_mutation(&mut self, action: &str, outcome: &Outcome<()>, done: &str, verb: &str) {
        if outcome.is_success() {
            info!("event=ui_action module=ui status=ok action={verb}");
            self.show_notice("Success", outcome.message(), StatusKind::Info);
            self.form.clear();
            self.load_books();
            self.set_status(format!("Book {done} successfully"), StatusKind::Info);
        } else {
            self.show_error(action, outcome.message());
            self.set_status(format!("Failed to {verb} book"), StatusKind::Error);
        }
    }

    /// Reload every book into the table and refresh the header count.
    fn load_books(&mut self) {
        match self.service.get_all() {
            Outcome::Success { data, .. } => {
                self.set_status(format!("Loaded {} books", data.len()), StatusKind::Info);
                self.table.set_books(data);
            }
            Outcome::Failure { message } => {
                self.show_error("Load Books", message);
                self.set_status("Failed to load books", StatusKind::Error);
            }
        }
        self.total = self.service.count().into_data();
    }

    fn search(&mut self, target: SearchTarget) {
        let text = self.form.search_text().to_string();
        let (title, empty_prompt) = match target {
            SearchTarget::Title => ("Search by Title", "Please enter a title to search for!"),
            SearchTarget::Author => ("Search by Author", "Please enter an author to search for!"),
        };
        if text.is_empty() {
            self.show_error("Search", empty_prompt);
            return;
        }

        let outcome = match target {
            SearchTarget::Title => self.service.search_by_title(&text),
            SearchTarget::Author => self.service.search_by_author(&text),
        };
        match outcome {
            Outcome::Success { message, data } => {
                self.table.set_books(data);
                self.table.select_first();
                self.set_status(message, StatusKind::Info);
            }
            Outcome::Failure { message } => {
                self.show_error(title, message);
                self.set_status("Search failed", StatusKind::Error);
            }
        }
    }

    fn show_notice(&mut self, title: &str, message: impl Into<String>, kind: StatusKind) {
        self.mode = Mode::Notice(Notice {
            title: title.to_string(),
            message: message.into(),
            kind,
        });
    }

    fn show_error(&mut self, title: &str, message: impl Into<String>) {
        self.show_notice(title, message, StatusKind::Error);
    }

    fn set_status<T: Into<String>>(&mut self, text: T, kind: StatusKind) {
        self.status = StatusMessage {
            text: text.into(),
            kind,
        };
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FORM_HEIGHT),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(body[0]);

        self.draw_form(frame, left[0]);
        self.draw_search(frame, left[1]);
        self.draw_key_help(frame, left[2]);
        self.draw_table(frame, body[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::ConfirmDelete { id } => self.draw_confirm_delete(frame, area, *id),
            Mode::Notice(notice) => self.draw_notice(frame, area, notice),
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let total = match self.total {
            Some(total) => format!("Total books: {total}"),
            None => "Total books: ?".to_string(),
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "Library Catalog",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(total, Style::default().fg(Color::Gray)),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Book Information")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        let fields = [
            FormField::Id,
            FormField::Title,
            FormField::Author,
            FormField::Year,
            FormField::Pages,
        ];
        let lines: Vec<Line> = fields
            .iter()
            .map(|field| self.form.build_line(*field))
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);

        if let Some(row) = fields.iter().position(|field| *field == self.form.active) {
            self.place_cursor(frame, inner, row as u16, self.form.active);
        }
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Search").borders(Borders::ALL);
        let inner = block.inner(area);
        let line = self.form.build_line(FormField::Search);
        frame.render_widget(Paragraph::new(line).block(block), area);

        if self.form.active == FormField::Search {
            self.place_cursor(frame, inner, 0, FormField::Search);
        }
    }

    fn place_cursor(&self, frame: &mut Frame, inner: Rect, row: u16, field: FormField) {
        if !matches!(self.mode, Mode::Normal) || inner.height <= row {
            return;
        }
        let offset = (BookForm::prefix_width() + self.form.value_len(field)) as u16;
        let x = (inner.x + offset).min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y + row));
    }

    fn draw_key_help(&self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let entry = |key: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(format!("{key:<6}"), key_style),
                Span::raw(text),
            ])
        };
        let lines = vec![
            entry("F2", "Add Book"),
            entry("F3", "Update Book"),
            entry("F4", "Delete Book"),
            entry("F5", "Refresh"),
            entry("F6", "Search by Title"),
            entry("F7", "Search by Author"),
            entry("F8", "Clear Fields"),
            entry("Enter", "Edit selected row"),
        ];
        let paragraph =
            Paragraph::new(lines).block(Block::default().title("Actions").borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(["ID", "Title", "Author", "Year", "Pages"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.table.books.iter().map(|book| {
            Row::new(vec![
                Cell::from(book.id.to_string()),
                Cell::from(book.title.clone()),
                Cell::from(book.author.clone()),
                Cell::from(book.year.to_string()),
                Cell::from(book.pages.to_string()),
            ])
        });
        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(45),
            Constraint::Percentage(35),
            Constraint::Length(6),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(format!("Books List ({})", self.table.len()))
                    .borders(Borders::ALL),
            )
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .highlight_symbol("> ");

        let mut state = TableState::default();
        if !self.table.books.is_empty() {
            state.select(Some(self.table.selected));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let instructions = Line::from(vec![
            Span::styled("[Tab]", key_style),
            Span::raw(" Next field   "),
            Span::styled("[↑↓]", key_style),
            Span::raw(" Select row   "),
            Span::styled("[Esc]", key_style),
            Span::raw(" Quit"),
        ]);
        let status_line = Line::from(Span::styled(
            self.status.text.clone(),
            self.status.kind.style(),
        ));

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, id: i64) {
        let popup_area = centered_popup(50, 6, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        let lines = vec![
            Line::from(format!(
                "Are you sure you want to delete the book with ID: {id}?"
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_notice(&self, frame: &mut Frame, area: Rect, notice: &Notice) {
        let text_width = ((u32::from(area.width) * 60 / 100) as u16).saturating_sub(2);
        let height = wrapped_height(&notice.message, text_width) + 4;
        let popup_area = centered_popup(60, height, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(notice.title.clone())
            .borders(Borders::ALL)
            .border_style(notice.kind.style());
        let mut lines: Vec<Line> = notice.message.lines().map(Line::from).collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Enter to close.",
            Style::default().fg(Color::Gray),
        )));
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    #[cfg(test)]
    pub(crate) fn status_text(&self) -> &str {
        &self.status.text
    }

    #[cfg(test)]
    pub(crate) fn notice(&self) -> Option<&Notice> {
        match &self.mode {
            Mode::Notice(notice) => Some(notice),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn rows(&self) -> &[Book] {
        &self.table.books
    }
}
