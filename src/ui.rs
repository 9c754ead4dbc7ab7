//! Ratatui front end: a book form, a search box, the books table, and modal
//! notices, all driven through the catalog service.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
