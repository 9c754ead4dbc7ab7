use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use thiserror::Error;

use crate::models::Book;

/// Input problems caught before the catalog service is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum FormError {
    #[error("Please enter valid numbers for ID, Year, and Pages!")]
    InvalidNumbers,
    #[error("Please enter a book ID to delete!")]
    MissingId,
    #[error("Please enter a valid book ID!")]
    InvalidId,
}

/// Focusable inputs, in Tab order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum FormField {
    #[default]
    Id,
    Title,
    Author,
    Year,
    Pages,
    Search,
}

impl FormField {
    const ORDER: [FormField; 6] = [
        FormField::Id,
        FormField::Title,
        FormField::Author,
        FormField::Year,
        FormField::Pages,
        FormField::Search,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            FormField::Id => "ID",
            FormField::Title => "Title",
            FormField::Author => "Author",
            FormField::Year => "Year",
            FormField::Pages => "Pages",
            FormField::Search => "Search",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, FormField::Id | FormField::Year | FormField::Pages)
    }

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }
}

/// Raw text of the book form plus the search box. Values stay as typed until
/// an action parses them.
#[derive(Default, Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) pages: String,
    pub(crate) search: String,
    pub(crate) active: FormField,
}

impl BookForm {
    /// Copy a table row into the record fields. The search text is kept.
    pub(crate) fn fill_from(&mut self, book: &Book) {
        self.id = book.id.to_string();
        self.title = book.title.clone();
        self.author = book.author.clone();
        self.year = book.year.to_string();
        self.pages = book.pages.to_string();
    }

    /// Empty every input, including the search box.
    pub(crate) fn clear(&mut self) {
        *self = Self {
            active: self.active,
            ..Self::default()
        };
    }

    pub(crate) fn next_field(&mut self) {
        let next = (self.active.position() + 1) % FormField::ORDER.len();
        self.active = FormField::ORDER[next];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = FormField::ORDER.len();
        let previous = (self.active.position() + len - 1) % len;
        self.active = FormField::ORDER[previous];
    }

    /// Append a character to the active field. Numeric fields only take digits
    /// and a leading minus sign.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        let value = self.value_mut(field);
        if field.is_numeric() && !(ch.is_ascii_digit() || (ch == '-' && value.is_empty())) {
            return false;
        }
        value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Build a record from the form. Text fields are trimmed; any numeric
    /// field that does not parse yields [`FormError::InvalidNumbers`].
    pub(crate) fn parse_book(&self) -> Result<Book, FormError> {
        let number = |raw: &str| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| FormError::InvalidNumbers)
        };
        Ok(Book {
            id: number(&self.id)?,
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            year: number(&self.year)?,
            pages: number(&self.pages)?,
        })
    }

    /// Parse only the id field, as the delete action needs.
    pub(crate) fn parse_id(&self) -> Result<i64, FormError> {
        let raw = self.id.trim();
        if raw.is_empty() {
            return Err(FormError::MissingId);
        }
        raw.parse::<i64>().map_err(|_| FormError::InvalidId)
    }

    pub(crate) fn search_text(&self) -> &str {
        self.search.trim()
    }

    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Id => &self.id,
            FormField::Title => &self.title,
            FormField::Author => &self.author,
            FormField::Year => &self.year,
            FormField::Pages => &self.pages,
            FormField::Search => &self.search,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Id => &mut self.id,
            FormField::Title => &mut self.title,
            FormField::Author => &mut self.author,
            FormField::Year => &mut self.year,
            FormField::Pages => &mut self.pages,
            FormField::Search => &mut self.search,
        }
    }

    /// Width of the `Label: ` prefix, shared by every line so values align.
    pub(crate) fn prefix_width() -> usize {
        FormField::ORDER
            .iter()
            .map(|field| field.label().len())
            .max()
            .unwrap_or(0)
            + 2
    }

    /// Render one labelled input line, highlighting the focused field.
    pub(crate) fn build_line(&self, field: FormField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() && !is_active {
            "<empty>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let label = format!("{}: ", field.label());
        Line::from(vec![
            Span::raw(format!("{label:<width$}", width = Self::prefix_width())),
            Span::styled(display, style),
        ])
    }

    /// Character count of a field, used to place the cursor.
    pub(crate) fn value_len(&self, field: FormField) -> usize {
        self.value(field).chars().count()
    }
}
