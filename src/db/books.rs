use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::Book;

use super::{query_error, Database, StoreResult};

const SELECT_ALL: &str = "SELECT id, title, author, year, pages FROM books ORDER BY id";
const SELECT_BY_ID: &str = "SELECT id, title, author, year, pages FROM books WHERE id = ?1";
const SEARCH_BY_TITLE: &str = "SELECT id, title, author, year, pages
     FROM books
     WHERE title LIKE ?1 ESCAPE '\\'
     ORDER BY title, id";
const SEARCH_BY_AUTHOR: &str = "SELECT id, title, author, year, pages
     FROM books
     WHERE author LIKE ?1 ESCAPE '\\'
     ORDER BY author, title";

/// Data access contract for the catalog. The service is generic over this
/// trait so tests can wrap or replace the SQLite implementation.
pub trait BookStore {
    /// Insert a new row. Duplicate ids surface as a constraint error.
    fn insert(&self, book: &Book) -> StoreResult<bool>;
    /// Every book ordered by id.
    fn get_all(&self) -> StoreResult<Vec<Book>>;
    fn get_by_id(&self, id: i64) -> StoreResult<Option<Book>>;
    /// Rewrite every non-id column of the row matching `book.id`.
    fn update(&self, book: &Book) -> StoreResult<bool>;
    fn delete(&self, id: i64) -> StoreResult<bool>;
    fn count(&self) -> StoreResult<i64>;
    fn exists(&self, id: i64) -> StoreResult<bool>;
    /// Substring match on `title`, ordered by title.
    fn search_by_title(&self, fragment: &str) -> StoreResult<Vec<Book>>;
    /// Substring match on `author`, ordered by author then title.
    fn search_by_author(&self, fragment: &str) -> StoreResult<Vec<Book>>;
}

/// SQLite-backed store. Each method opens its own connection through
/// [`Database::connect`]; the connection is closed when it goes out of scope
/// at the end of the call, including on early `?` returns.
#[derive(Debug, Clone)]
pub struct SqliteBookStore {
    db: Database,
}

impl SqliteBookStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn query_books(
        conn: &Connection,
        sql: &str,
        pattern: Option<&str>,
        action: &'static str,
    ) -> StoreResult<Vec<Book>> {
        let mut stmt = conn.prepare(sql).map_err(query_error(action))?;
        let rows = match pattern {
            Some(pattern) => stmt.query_map([pattern], book_from_row),
            None => stmt.query_map([], book_from_row),
        }
        .map_err(query_error(action))?;

        let books = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error(action))?;

        Ok(books)
    }
}

impl BookStore for SqliteBookStore {
    fn insert(&self, book: &Book) -> StoreResult<bool> {
        let conn = self.db.connect()?;
        let inserted = conn
            .execute(
                "INSERT INTO books (id, title, author, year, pages) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![book.id, book.title, book.author, book.year, book.pages],
            )
            .map_err(query_error("insert book"))?;
        Ok(inserted == 1)
    }

    fn get_all(&self) -> StoreResult<Vec<Book>> {
        let conn = self.db.connect()?;
        Self::query_books(&conn, SELECT_ALL, None, "load books")
    }

    fn get_by_id(&self, id: i64) -> StoreResult<Option<Book>> {
        let conn = self.db.connect()?;
        conn.query_row(SELECT_BY_ID, [id], book_from_row)
            .optional()
            .map_err(query_error("load book"))
    }

    fn update(&self, book: &Book) -> StoreResult<bool> {
        let conn = self.db.connect()?;
        let updated = conn
            .execute(
                "UPDATE books SET title = ?1, author = ?2, year = ?3, pages = ?4 WHERE id = ?5",
                params![book.title, book.author, book.year, book.pages, book.id],
            )
            .map_err(query_error("update book"))?;
        Ok(updated > 0)
    }

    fn delete(&self, id: i64) -> StoreResult<bool> {
        let conn = self.db.connect()?;
        let deleted = conn
            .execute("DELETE FROM books WHERE id = ?1", [id])
            .map_err(query_error("delete book"))?;
        Ok(deleted > 0)
    }

    fn count(&self) -> StoreResult<i64> {
        let conn = self.db.connect()?;
        conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .map_err(query_error("count books"))
    }

    fn exists(&self, id: i64) -> StoreResult<bool> {
        let conn = self.db.connect()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )
        .map_err(query_error("check book id"))
    }

    fn search_by_title(&self, fragment: &str) -> StoreResult<Vec<Book>> {
        let conn = self.db.connect()?;
        let pattern = like_pattern(fragment);
        Self::query_books(&conn, SEARCH_BY_TITLE, Some(&pattern), "search by title")
    }

    fn search_by_author(&self, fragment: &str) -> StoreResult<Vec<Book>> {
        let conn = self.db.connect()?;
        let pattern = like_pattern(fragment);
        Self::query_books(&conn, SEARCH_BY_AUTHOR, Some(&pattern), "search by author")
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        year: row.get(3)?,
        pages: row.get(4)?,
    })
}

/// Wrap `fragment` in `%` wildcards for a `LIKE ... ESCAPE '\'` match. LIKE
/// metacharacters typed by the user are escaped so they match literally.
fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
