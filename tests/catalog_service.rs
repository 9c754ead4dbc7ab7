use std::cell::Cell;

use chrono::Datelike;
use library_catalog::{Book, BookStore, CatalogService, Database, Outcome, SqliteBookStore};
use tempfile::TempDir;

type StoreResult<T> = Result<T, library_catalog::StoreError>;

const YEAR: i64 = 2024;

fn open_store() -> (TempDir, SqliteBookStore) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("catalog.sqlite"));
    db.ensure_schema().unwrap();
    (dir, SqliteBookStore::new(db))
}

fn open_service() -> (TempDir, CatalogService<SqliteBookStore>) {
    let (dir, store) = open_store();
    (dir, CatalogService::with_current_year(store, YEAR))
}

fn dune() -> Book {
    Book::new(1, "Dune", "Herbert", 1965, 412)
}

/// Counts every call that reaches the wrapped store.
struct CountingStore<S> {
    inner: S,
    calls: Cell<usize>,
}

impl<S> CountingStore<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl<S: BookStore> BookStore for CountingStore<S> {
    fn insert(&self, book: &Book) -> StoreResult<bool> {
        self.tick();
        self.inner.insert(book)
    }
    fn get_all(&self) -> StoreResult<Vec<Book>> {
        self.tick();
        self.inner.get_all()
    }
    fn get_by_id(&self, id: i64) -> StoreResult<Option<Book>> {
        self.tick();
        self.inner.get_by_id(id)
    }
    fn update(&self, book: &Book) -> StoreResult<bool> {
        self.tick();
        self.inner.update(book)
    }
    fn delete(&self, id: i64) -> StoreResult<bool> {
        self.tick();
        self.inner.delete(id)
    }
    fn count(&self) -> StoreResult<i64> {
        self.tick();
        self.inner.count()
    }
    fn exists(&self, id: i64) -> StoreResult<bool> {
        self.tick();
        self.inner.exists(id)
    }
    fn search_by_title(&self, fragment: &str) -> StoreResult<Vec<Book>> {
        self.tick();
        self.inner.search_by_title(fragment)
    }
    fn search_by_author(&self, fragment: &str) -> StoreResult<Vec<Book>> {
        self.tick();
        self.inner.search_by_author(fragment)
    }
}

/// Simulates a second writer: the existence check reports a stale answer and
/// a competing row lands right after it.
struct RacingStore {
    inner: SqliteBookStore,
    competitor: Book,
}

impl BookStore for RacingStore {
    fn insert(&self, book: &Book) -> StoreResult<bool> {
        self.inner.insert(book)
    }
    fn get_all(&self) -> StoreResult<Vec<Book>> {
        self.inner.get_all()
    }
    fn get_by_id(&self, id: i64) -> StoreResult<Option<Book>> {
        self.inner.get_by_id(id)
    }
    fn update(&self, book: &Book) -> StoreResult<bool> {
        self.inner.update(book)
    }
    fn delete(&self, id: i64) -> StoreResult<bool> {
        self.inner.delete(id)
    }
    fn count(&self) -> StoreResult<i64> {
        self.inner.count()
    }
    fn exists(&self, id: i64) -> StoreResult<bool> {
        let seen = self.inner.exists(id)?;
        if !seen && id == self.competitor.id {
            self.inner.insert(&self.competitor)?;
        }
        Ok(seen)
    }
    fn search_by_title(&self, fragment: &str) -> StoreResult<Vec<Book>> {
        self.inner.search_by_title(fragment)
    }
    fn search_by_author(&self, fragment: &str) -> StoreResult<Vec<Book>> {
        self.inner.search_by_author(fragment)
    }
}

#[test]
fn dune_lifecycle() {
    let (_dir, service) = open_service();
    let book = dune();

    let added = service.add(Some(&book));
    assert_eq!(added, Outcome::success("Book added successfully!", ()));

    let again = service.add(Some(&book));
    assert_eq!(again.message(), "A book with ID 1 already exists!");

    let revised = Book { pages: 500, ..book.clone() };
    assert_eq!(
        service.update(Some(&revised)).message(),
        "Book updated successfully!"
    );
    assert_eq!(service.get_by_id(1).into_data().map(|b| b.pages), Some(500));

    assert_eq!(service.delete(1).message(), "Book deleted successfully!");

    let gone = service.get_by_id(1);
    assert!(!gone.is_success());
    assert_eq!(gone.message(), "Book with ID 1 not found!");
}

#[test]
fn added_book_reads_back_unchanged() {
    let (_dir, service) = open_service();
    let book = Book::new(7, "Emma", "Jane Austen", 1815, 474);

    assert!(service.add(Some(&book)).is_success());

    let found = service.get_by_id(7);
    assert_eq!(found.message(), "Book found!");
    assert_eq!(found.into_data(), Some(book));
}

#[test]
fn duplicate_add_keeps_the_stored_record() {
    let (_dir, service) = open_service();
    service.add(Some(&dune()));

    let clash = Book::new(1, "Emma", "Jane Austen", 1815, 474);
    let outcome = service.add(Some(&clash));

    assert!(!outcome.is_success());
    assert_eq!(outcome.message(), "A book with ID 1 already exists!");
    assert_eq!(service.get_by_id(1).into_data(), Some(dune()));
}

#[test]
fn update_and_delete_of_missing_ids_change_nothing() {
    let (_dir, service) = open_service();
    service.add(Some(&dune()));

    let ghost = Book::new(2, "Ghost", "Nobody", 2000, 10);
    assert_eq!(service.update(Some(&ghost)).message(), "Book with ID 2 not found!");
    assert_eq!(service.delete(2).message(), "Book with ID 2 not found!");

    assert_eq!(service.count().data_or_default(), 1);
    assert_eq!(service.get_all().into_data(), Some(vec![dune()]));
}

#[test]
fn deleted_book_no_longer_exists() {
    let (_dir, service) = open_service();
    service.add(Some(&dune()));

    assert!(service.delete(1).is_success());
    assert!(!service.store().exists(1).unwrap());
}

#[test]
fn get_all_lists_every_book_by_id() {
    let (_dir, service) = open_service();
    for id in [4, 1, 3, 2] {
        let book = Book::new(id, format!("Volume {id}"), "Anon", 1999, 100 + id);
        assert!(service.add(Some(&book)).is_success());
    }

    let all = service.get_all();
    assert_eq!(all.message(), "Books retrieved successfully!");
    let ids: Vec<i64> = all.data_or_default().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let count = service.count();
    assert_eq!(count.message(), "Total books count retrieved!");
    assert_eq!(count.data_or_default(), 4);
}

#[test]
fn validation_reports_the_first_failing_rule() {
    let (_dir, service) = open_service();

    assert_eq!(service.validate(None).message(), "Book object cannot be null!");
    assert_eq!(service.add(None).message(), "Book object cannot be null!");
    assert_eq!(service.update(None).message(), "Book object cannot be null!");

    let everything_wrong = Book::new(0, " ", "", 10, 0);
    assert_eq!(
        service.validate(Some(&everything_wrong)).message(),
        "Book ID must be a positive number!"
    );

    let cases = [
        (Book::new(1, "   ", "", 10, 0), "Book title cannot be empty!"),
        (Book::new(1, "Dune", " ", 10, 0), "Book author cannot be empty!"),
        (
            Book::new(1, "Dune", "Herbert", 999, 0),
            "Book year must be between 1000 and 2024!",
        ),
        (
            Book::new(1, "Dune", "Herbert", 1965, 0),
            "Book pages must be a positive number!",
        ),
        (
            Book::new(1, "t".repeat(256), "Herbert", 1965, 412),
            "Book title is too long (max 255 characters)!",
        ),
        (
            Book::new(1, "Dune", "a".repeat(256), 1965, 412),
            "Book author name is too long (max 255 characters)!",
        ),
    ];
    for (book, expected) in cases {
        assert_eq!(service.validate(Some(&book)).message(), expected);
    }

    assert_eq!(
        service.validate(Some(&dune())),
        Outcome::success("Book data is valid!", ())
    );
}

#[test]
fn field_boundaries() {
    let (_dir, service) = open_service();
    let with = |year: i64, pages: i64, title: String| Book::new(1, title, "Author", year, pages);

    assert!(service.validate(Some(&with(1000, 1, "t".into()))).is_success());
    assert!(service.validate(Some(&with(YEAR, 1, "t".into()))).is_success());
    assert!(!service.validate(Some(&with(YEAR + 1, 1, "t".into()))).is_success());
    assert!(!service.validate(Some(&with(2000, 0, "t".into()))).is_success());
    assert!(service.validate(Some(&with(2000, 1, "t".repeat(255)))).is_success());
    assert!(!service.validate(Some(&with(2000, 1, "t".repeat(256)))).is_success());
}

#[test]
fn length_limits_count_characters() {
    let (_dir, service) = open_service();
    let title = "é".repeat(255);
    let book = Book::new(1, title, "Author", 2000, 1);

    assert!(service.add(Some(&book)).is_success());
    assert_eq!(service.get_by_id(1).into_data(), Some(book));
}

#[test]
fn year_bound_follows_the_local_calendar() {
    let (_dir, store) = open_store();
    let service = CatalogService::new(store);
    let this_year = i64::from(chrono::Local::now().year());

    let current = Book::new(1, "Now", "Author", this_year, 1);
    let future = Book::new(2, "Later", "Author", this_year + 1, 1);

    assert!(service.add(Some(&current)).is_success());
    assert_eq!(
        service.add(Some(&future)).message(),
        format!("Book year must be between 1000 and {this_year}!")
    );
}

#[test]
fn non_positive_ids_are_rejected_before_the_store() {
    let (_dir, store) = open_store();
    let service = CatalogService::with_current_year(CountingStore::new(store), YEAR);

    for id in [0, -3] {
        assert_eq!(service.delete(id).message(), "Invalid book ID!");
        assert_eq!(service.get_by_id(id).message(), "Invalid book ID!");
    }
    assert!(!service.add(Some(&Book::new(0, "Dune", "Herbert", 1965, 412))).is_success());
    assert_eq!(service.store().calls.get(), 0);
}

#[test]
fn blank_searches_never_reach_the_store() {
    let (_dir, store) = open_store();
    let service = CatalogService::with_current_year(CountingStore::new(store), YEAR);

    assert_eq!(
        service.search_by_title("").message(),
        "Search title cannot be empty!"
    );
    assert_eq!(
        service.search_by_author("   ").message(),
        "Search author cannot be empty!"
    );
    assert_eq!(service.store().calls.get(), 0);
}

#[test]
fn search_messages_report_matches() {
    let (_dir, service) = open_service();
    service.add(Some(&dune()));
    service.add(Some(&Book::new(2, "Dune Messiah", "Herbert", 1969, 256)));
    service.add(Some(&Book::new(3, "Emma", "Jane Austen", 1815, 474)));

    let titles = service.search_by_title("  dune ");
    assert_eq!(titles.message(), "Found 2 book(s)");
    assert_eq!(titles.data().map(Vec::len), Some(2));

    let authors = service.search_by_author("austen");
    assert_eq!(authors.message(), "Found 1 book(s)");

    let no_title = service.search_by_title("Hobbit");
    assert!(no_title.is_success());
    assert_eq!(
        no_title.message(),
        "No books found with title containing: Hobbit"
    );
    assert_eq!(no_title.data_or_default(), Vec::<Book>::new());

    assert_eq!(
        service.search_by_author("Tolkien").message(),
        "No books found by author: Tolkien"
    );
}

#[test]
fn storage_failures_become_database_errors() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteBookStore::new(Database::new(
        dir.path().join("missing").join("catalog.sqlite"),
    ));
    let service = CatalogService::with_current_year(store, YEAR);

    let outcomes = [
        service.add(Some(&dune())).message().to_string(),
        service.update(Some(&dune())).message().to_string(),
        service.delete(1).message().to_string(),
        service.get_all().message().to_string(),
        service.get_by_id(1).message().to_string(),
        service.search_by_title("Dune").message().to_string(),
        service.search_by_author("Herbert").message().to_string(),
    ];
    for message in outcomes {
        assert!(message.starts_with("Database error: "), "got {message}");
    }

    let count = service.count();
    assert!(!count.is_success());
    assert_eq!(count.data_or_default(), 0);
}

#[test]
fn racing_insert_is_caught_by_the_primary_key() {
    let (_dir, inner) = open_store();
    let competitor = Book::new(1, "Emma", "Jane Austen", 1815, 474);
    let store = RacingStore {
        inner,
        competitor: competitor.clone(),
    };
    let service = CatalogService::with_current_year(store, YEAR);

    let outcome = service.add(Some(&dune()));

    assert!(!outcome.is_success());
    assert!(outcome.message().starts_with("Database error: "));
    assert_eq!(service.get_by_id(1).into_data(), Some(competitor));
    assert_eq!(service.count().data_or_default(), 1);
}
