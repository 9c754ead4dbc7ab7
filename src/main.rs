//! Binary entry point: resolve configuration, start file logging, make sure
//! the `books` table exists, then hand the catalog service to the TUI.
use anyhow::Context;
use library_catalog::{
    init_logging, run_app, App, CatalogService, Config, Database, SqliteBookStore,
};
use log::warn;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to resolve configuration")?;
    init_logging(&config.log_level, &config.log_dir).context("failed to start logging")?;

    let db = Database::new(&config.db_path);
    // A missing or unwritable database is reported inside the UI, so the
    // form still opens and every action surfaces the storage error.
    if let Err(err) = db.ensure_schema() {
        warn!("event=schema_ready module=main status=error error={err}");
    }
    let connected = db.test_connection();

    let mut app = App::new(CatalogService::new(SqliteBookStore::new(db)));
    app.start(connected);
    run_app(&mut app)
}
