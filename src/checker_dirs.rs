//! Application directory paths for the company checker.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! # Directory Layout
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/company-checker/` | `~/.config/company-checker/` |
//! | Cache | `~/Library/Caches/company-checker/` | `~/.cache/company-checker/` |
//!
//! # Environment Overrides
//!
//! - `COMPANY_CHECKER_CONFIG_DIR` overrides [`config_dir`]
//! - `COMPANY_CHECKER_CACHE_DIR` overrides [`cache_dir`]

use std::path::PathBuf;

const APP_DIR: &str = "company-checker";

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/company-checker/` by default. Override
/// with the `COMPANY_CHECKER_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("COMPANY_CHECKER_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("/tmp/company-checker-config"))
}

/// Application cache directory.
///
/// Resolves to `dirs::cache_dir()/company-checker/` by default. Override
/// with the `COMPANY_CHECKER_CACHE_DIR` environment variable.
#[must_use]
pub fn cache_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("COMPANY_CHECKER_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::cache_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("/tmp/company-checker-cache"))
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Durable search cache directory (`cache_dir()/search/`).
#[must_use]
pub fn search_cache_dir() -> PathBuf {
    cache_dir().join("search")
}
