//! Application directory paths for bat.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/bat/` | `~/.local/share/bat/` |
//! | Config | `~/Library/Application Support/bat/` | `~/.config/bat/` |
//!
//! # Environment Overrides
//!
//! - `BAT_DATA_DIR` overrides [`data_dir`]
//! - `BAT_CONFIG_DIR` overrides [`config_dir`]

use std::ffi::OsString;
use std::path::PathBuf;

/// Application data root directory. Holds the SQLite database.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("BAT_DATA_DIR"),
        dirs::data_dir(),
        "/tmp/bat-data",
    )
}

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var_os("BAT_CONFIG_DIR"),
        dirs::config_dir(),
        "/tmp/bat-config",
    )
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default database path (`data_dir()/bat.db`).
#[must_use]
pub fn database_file() -> PathBuf {
    data_dir().join("bat.db")
}

fn resolve(override_dir: Option<OsString>, platform: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(dir) = override_dir {
        return PathBuf::from(dir);
    }
    platform
        .map(|d| d.join("bat"))
        .unwrap_or_else(|| PathBuf::from(fallback))
}
