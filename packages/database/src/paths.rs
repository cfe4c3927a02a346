#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the `DuckDB` data directory.
//!
//! All paths are relative to the project root's `data/` directory unless
//! overridden with the `WILDFIRE_AQ_DB` environment variable.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the store location.
pub const STORE_PATH_ENV: &str = "WILDFIRE_AQ_DB";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// current directory when the manifest has no grandparent.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the default path of the air-quality `DuckDB` file.
#[must_use]
pub fn default_store_path() -> PathBuf {
    data_dir().join("air_quality.duckdb")
}

/// Returns the store path from `WILDFIRE_AQ_DB`, or the default.
#[must_use]
pub fn store_path_from_env() -> PathBuf {
    std::env::var_os(STORE_PATH_ENV).map_or_else(default_store_path, PathBuf::from)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
