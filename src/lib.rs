//! Core library surface for the Library Catalog TUI application.
//!
//! Layers, leaf first: `db` talks to SQLite, `service` validates and wraps
//! every result in an [`Outcome`], and `ui` renders the form on top of the
//! service. `config` and `logging` are shared startup plumbing.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod service;
pub mod ui;

pub use config::Config;
pub use db::{BookStore, Database, SqliteBookStore, StoreError};
pub use logging::init_logging;
pub use models::Book;
pub use service::{CatalogService, Outcome};
pub use ui::{run_app, App};
