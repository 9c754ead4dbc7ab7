//! Catalog use-case service.
//!
//! # Responsibility
//! - Enforce the business rules the store does not (field validation,
//!   duplicate/not-found preconditions).
//! - Turn every store outcome, including storage errors, into an [`Outcome`].
//!
//! # Invariants
//! - No public method panics or returns a raw error.
//! - Rejected input never reaches the store.
//! - Existence checks and the mutation that follows are separate round trips;
//!   a concurrent writer can still slip in between them, in which case the
//!   store's primary key constraint rejects the write and the caller gets a
//!   storage failure.

use chrono::Datelike;
use log::{debug, error, warn};

use crate::db::{BookStore, StoreError};
use crate::models::{Book, MAX_TEXT_LEN, MIN_YEAR};

/// Result envelope returned by every catalog operation. Callers branch on the
/// variant; a failure carries no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success { message: String, data: T },
    Failure { message: String },
}

impl<T> Outcome<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Outcome::Success {
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Human-readable message for either variant.
    pub fn message(&self) -> &str {
        match self {
            Outcome::Success { message, .. } | Outcome::Failure { message } => message,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success { data, .. } => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Success { data, .. } => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    /// Payload on success, `T::default()` on failure.
    pub fn data_or_default(self) -> T
    where
        T: Default,
    {
        self.into_data().unwrap_or_default()
    }
}

/// Validation, precondition checks and result shaping on top of a
/// [`BookStore`].
pub struct CatalogService<S: BookStore> {
    store: S,
    current_year: Option<i64>,
}

impl<S: BookStore> CatalogService<S> {
    /// Service that validates years against the local calendar.
    pub fn new(store: S) -> Self {
        Self {
            store,
            current_year: None,
        }
    }

    /// Service with a fixed upper bound for publication years.
    pub fn with_current_year(store: S, year: i64) -> Self {
        Self {
            store,
            current_year: Some(year),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn current_year(&self) -> i64 {
        self.current_year
            .unwrap_or_else(|| i64::from(chrono::Local::now().year()))
    }

    /// Check every field rule in order and report the first one that fails.
    pub fn validate(&self, book: Option<&Book>) -> Outcome<()> {
        let Some(book) = book else {
            return Outcome::failure("Book object cannot be null!");
        };
        let current_year = self.current_year();

        let problem = if book.id <= 0 {
            Some("Book ID must be a positive number!".to_string())
        } else if book.title.trim().is_empty() {
            Some("Book title cannot be empty!".to_string())
        } else if book.author.trim().is_empty() {
            Some("Book author cannot be empty!".to_string())
        } else if book.year < MIN_YEAR || book.year > current_year {
            Some(format!(
                "Book year must be between {MIN_YEAR} and {current_year}!"
            ))
        } else if book.pages <= 0 {
            Some("Book pages must be a positive number!".to_string())
        } else if book.title.chars().count() > MAX_TEXT_LEN {
            Some(format!(
                "Book title is too long (max {MAX_TEXT_LEN} characters)!"
            ))
        } else if book.author.chars().count() > MAX_TEXT_LEN {
            Some(format!(
                "Book author name is too long (max {MAX_TEXT_LEN} characters)!"
            ))
        } else {
            None
        };

        match problem {
            Some(message) => {
                warn!(
                    "event=validate module=service status=rejected id={} reason={message}",
                    book.id
                );
                Outcome::failure(message)
            }
            None => Outcome::success("Book data is valid!", ()),
        }
    }

    /// Validate and insert a new book, refusing ids already in the store.
    pub fn add(&self, book: Option<&Book>) -> Outcome<()> {
        let book = match (book, self.validate(book)) {
            (Some(book), Outcome::Success { .. }) => book,
            (_, rejected) => return rejected,
        };

        let result = self.store.exists(book.id).and_then(|exists| {
            if exists {
                return Ok(Outcome::failure(format!(
                    "A book with ID {} already exists!",
                    book.id
                )));
            }
            Ok(if self.store.insert(book)? {
                Outcome::success("Book added successfully!", ())
            } else {
                Outcome::failure("Failed to add book to database!")
            })
        });

        settle("add", result)
    }

    /// Validate and rewrite an existing book.
    pub fn update(&self, book: Option<&Book>) -> Outcome<()> {
        let book = match (book, self.validate(book)) {
            (Some(book), Outcome::Success { .. }) => book,
            (_, rejected) => return rejected,
        };

        let result = self.store.exists(book.id).and_then(|exists| {
            if !exists {
                return Ok(not_found(book.id));
            }
            Ok(if self.store.update(book)? {
                Outcome::success("Book updated successfully!", ())
            } else {
                Outcome::failure("Failed to update book!")
            })
        });

        settle("update", result)
    }

    pub fn delete(&self, id: i64) -> Outcome<()> {
        if id <= 0 {
            return Outcome::failure("Invalid book ID!");
        }

        let result = self.store.exists(id).and_then(|exists| {
            if !exists {
                return Ok(not_found(id));
            }
            Ok(if self.store.delete(id)? {
                Outcome::success("Book deleted successfully!", ())
            } else {
                Outcome::failure("Failed to delete book!")
            })
        });

        settle("delete", result)
    }

    pub fn get_all(&self) -> Outcome<Vec<Book>> {
        let result = self
            .store
            .get_all()
            .map(|books| Outcome::success("Books retrieved successfully!", books));
        settle("get_all", result)
    }

    pub fn get_by_id(&self, id: i64) -> Outcome<Book> {
        if id <= 0 {
            return Outcome::failure("Invalid book ID!");
        }

        let result = self.store.get_by_id(id).map(|found| match found {
            Some(book) => Outcome::success("Book found!", book),
            None => not_found(id),
        });
        settle("get_by_id", result)
    }

    pub fn search_by_title(&self, text: &str) -> Outcome<Vec<Book>> {
        let fragment = text.trim();
        if fragment.is_empty() {
            return Outcome::failure("Search title cannot be empty!");
        }

        let result = self.store.search_by_title(fragment).map(|books| {
            let message = if books.is_empty() {
                format!("No books found with title containing: {fragment}")
            } else {
                found_message(books.len())
            };
            Outcome::success(message, books)
        });
        settle("search_by_title", result)
    }

    pub fn search_by_author(&self, text: &str) -> Outcome<Vec<Book>> {
        let fragment = text.trim();
        if fragment.is_empty() {
            return Outcome::failure("Search author cannot be empty!");
        }

        let result = self.store.search_by_author(fragment).map(|books| {
            let message = if books.is_empty() {
                format!("No books found by author: {fragment}")
            } else {
                found_message(books.len())
            };
            Outcome::success(message, books)
        });
        settle("search_by_author", result)
    }

    /// Total number of books. On failure `data_or_default()` yields zero.
    pub fn count(&self) -> Outcome<i64> {
        let result = self
            .store
            .count()
            .map(|count| Outcome::success("Total books count retrieved!", count));
        settle("count", result)
    }
}

fn not_found<T>(id: i64) -> Outcome<T> {
    Outcome::failure(format!("Book with ID {id} not found!"))
}

fn found_message(count: usize) -> String {
    format!("Found {count} book(s)")
}

/// Collapse a store result into an outcome, logging it and wrapping storage
/// errors.
fn settle<T>(operation: &str, result: Result<Outcome<T>, StoreError>) -> Outcome<T> {
    match result {
        Ok(outcome) => {
            let status = if outcome.is_success() { "ok" } else { "rejected" };
            debug!(
                "event=catalog_op module=service status={status} op={operation} message={}",
                outcome.message()
            );
            outcome
        }
        Err(err) => {
            error!("event=catalog_op module=service status=error op={operation} error={err}");
            Outcome::failure(format!("Database error: {err}"))
        }
    }
}
