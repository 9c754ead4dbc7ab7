//! Domain model mirroring the `books` table. Validation lives in the catalog
//! service, not here.

use std::fmt;

/// Upper bound on the character length of `title` and `author`. Matches the
/// `CHECK` constraints in the schema.
pub const MAX_TEXT_LEN: usize = 255;

/// Earliest publication year the catalog accepts.
pub const MIN_YEAR: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One catalog entry. Values are unchecked until the service validates them.
pub struct Book {
    /// Externally supplied primary key. Never changes once the row exists.
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Publication year.
    pub year: i64,
    /// Page count.
    pub pages: i64,
}

impl Book {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        author: impl Into<String>,
        year: i64,
        pages: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            year,
            pages,
        }
    }
}

impl fmt::Display for Book {
    /// Render `Title - Author (Year)`, the format used in notices and logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.title, self.author, self.year)
    }
}
