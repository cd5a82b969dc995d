// Tollgate — Configuration
//
// Resolves where the consumer store lives. Precedence: the `--db` flag, then
// the TOLLGATE_DB environment variable, then the platform data directory.

use std::path::{Path, PathBuf};

/// Environment variable naming the consumer store file.
pub const DB_ENV: &str = "TOLLGATE_DB";

/// Log filter used when RUST_LOG is unset.
pub const DEFAULT_LOG_FILTER: &str = "tollgate=info";

const DB_FILE_NAME: &str = "consumers.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the configuration from an optional flag and the environment.
    pub fn load(db_flag: Option<PathBuf>) -> Self {
        let from_env = std::env::var_os(DB_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::resolve(db_flag, from_env)
    }

    fn resolve(db_flag: Option<PathBuf>, from_env: Option<PathBuf>) -> Self {
        Self {
            db_path: db_flag.or(from_env).unwrap_or_else(default_db_path),
        }
    }

    /// Directory holding the store file, if the path has one.
    pub fn data_dir(&self) -> Option<&Path> {
        self.db_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// Create the store's directory if it does not exist yet.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        if let Some(dir) = self.data_dir() {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Default directory for Tollgate data files.
pub fn default_data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("tollgate")
}

pub fn default_db_path() -> PathBuf {
    default_data_dir().join(DB_FILE_NAME)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
