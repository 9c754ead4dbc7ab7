//! Runtime configuration resolved from the environment with per-user defaults.

use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Log folder inside the application data directory.
const LOG_DIR_NAME: &str = "logs";

pub const DB_PATH_VAR: &str = "LIBRARY_CATALOG_DB";
pub const LOG_DIR_VAR: &str = "LIBRARY_CATALOG_LOG_DIR";
pub const LOG_LEVEL_VAR: &str = "LIBRARY_CATALOG_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate home directory; set LIBRARY_CATALOG_DB and LIBRARY_CATALOG_LOG_DIR")]
    NoHomeDir,
    #[error("{var} is set but empty")]
    EmptyVar { var: &'static str },
}

/// Where the catalog keeps its data and how verbose it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|var| std::env::var(var).ok(), home_dir)
    }

    /// Resolve configuration from an arbitrary variable lookup. Defaults live
    /// under `<home>/.library-catalog/`; the home directory is only consulted
    /// when a path variable is unset.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        home: impl Fn() -> Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let data_dir = || {
            home()
                .map(|home| home.join(DATA_DIR_NAME))
                .ok_or(ConfigError::NoHomeDir)
        };

        let db_path = match path_var(&lookup, DB_PATH_VAR)? {
            Some(path) => path,
            None => data_dir()?.join(DB_FILE_NAME),
        };
        let log_dir = match path_var(&lookup, LOG_DIR_VAR)? {
            Some(path) => path,
            None => data_dir()?.join(LOG_DIR_NAME),
        };
        let log_level = lookup(LOG_LEVEL_VAR)
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| crate::logging::default_log_level().to_string());

        Ok(Self {
            db_path,
            log_dir,
            log_level,
        })
    }
}

fn path_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<PathBuf>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyVar { var }),
        Some(value) => Ok(Some(PathBuf::from(value.trim()))),
    }
}

fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::{Config, ConfigError, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn defaults_live_under_home() {
        let config =
            Config::resolve(lookup(&[]), || Some(PathBuf::from("/home/reader"))).unwrap();
        assert_eq!(
            config.db_path,
            PathBuf::from("/home/reader/.library-catalog/library.sqlite")
        );
        assert_eq!(
            config.log_dir,
            PathBuf::from("/home/reader/.library-catalog/logs")
        );
        assert_eq!(config.log_level, crate::logging::default_log_level());
    }

    #[test]
    fn environment_overrides_defaults_without_home() {
        let config = Config::resolve(
            lookup(&[
                (DB_PATH_VAR, "/tmp/books.sqlite"),
                (LOG_DIR_VAR, " /tmp/logs "),
                (LOG_LEVEL_VAR, "warn"),
            ]),
            || None,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/books.sqlite"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn missing_home_is_an_error_when_a_default_is_needed() {
        let err = Config::resolve(lookup(&[(DB_PATH_VAR, "/tmp/books.sqlite")]), || None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoHomeDir));
    }

    #[test]
    fn empty_path_variable_is_rejected() {
        let err = Config::resolve(lookup(&[(DB_PATH_VAR, "  ")]), || {
            Some(PathBuf::from("/home/reader"))
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyVar { var } if var == DB_PATH_VAR));
    }
}
