//! Canonical home directory resolution for parcel-watch
//!
//! Provides a single source of truth for home directory resolution across
//! both pw crates, and supports custom deployments and testing via the
//! `PW_HOME` environment variable.
//!
//! # Precedence
//!
//! 1. `PW_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! # Testing
//!
//! Integration tests MUST use `PW_HOME` to point the binary at a temp
//! directory:
//!
//! ```ignore
//! use assert_cmd::Command;
//! use tempfile::TempDir;
//!
//! let temp_dir = TempDir::new().unwrap();
//! let mut cmd = Command::cargo_bin("pw").unwrap();
//! cmd.env("PW_HOME", temp_dir.path());
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the home directory for parcel-watch operations
///
/// # Precedence
///
/// 1. `PW_HOME` environment variable (if set and non-empty)
/// 2. `dirs::home_dir()` platform default
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(pw_home) = std::env::var("PW_HOME")
        && !pw_home.trim().is_empty()
    {
        return Ok(PathBuf::from(pw_home));
    }

    dirs::home_dir().context("Could not determine home directory")
}

/// Default configuration directory under the resolved home
pub fn config_dir(home: &std::path::Path) -> PathBuf {
    home.join(".config/parcel-watch")
}
