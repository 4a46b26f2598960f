//! Application configuration.
//!
//! Settings are read from a TOML file, then credentials are overlaid from
//! the process environment (optionally seeded from a `.env` file).

use std::path::{Path, PathBuf};

use company_search::{RestSourceConfig, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::error::{CheckerError, Result};

/// Environment variables holding the record source URL, in lookup order.
pub const URL_ENV_VARS: [&str; 3] = [
    "SUPABASE_URL",
    "VITE_SUPABASE_URL",
    "NEXT_PUBLIC_SUPABASE_URL",
];

/// Environment variables holding the record source API key, in lookup order.
pub const KEY_ENV_VARS: [&str; 3] = [
    "SUPABASE_ANON_KEY",
    "VITE_SUPABASE_ANON_KEY",
    "NEXT_PUBLIC_SUPABASE_ANON_KEY",
];

/// Top-level configuration for the company checker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Engine tuning: limits, thresholds, timeouts and cache TTLs.
    pub search: SearchConfig,
    /// Record source endpoint and credentials.
    pub source: RestSourceConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Durable cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory for the durable tier. Defaults to the platform cache dir.
    pub dir: Option<PathBuf>,
    /// Persist results across runs. When `false` only the process lifetime
    /// is cached.
    pub durable: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            durable: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "company_checker=info,company_search=info".to_owned(),
        }
    }
}

impl CheckerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CheckerError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CheckerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> PathBuf {
        crate::checker_dirs::config_file()
    }

    /// Load from `path`, or from the default path when it exists, or fall
    /// back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `path` is missing or any file read
    /// fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let default_path = Self::default_config_path();
        if default_path.is_file() {
            Self::from_file(&default_path)
        } else {
            tracing::debug!(path = %default_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Overlay credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Overlay credentials using `lookup` to read variables.
    ///
    /// For each credential the first non-blank variable in lookup order wins
    /// and replaces whatever the file configured.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = first_non_blank(&URL_ENV_VARS, &lookup) {
            self.source.base_url = Some(url);
        }
        if let Some(key) = first_non_blank(&KEY_ENV_VARS, &lookup) {
            self.source.api_key = Some(key);
        }
    }

    /// Directory for the durable cache tier.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .dir
            .clone()
            .unwrap_or_else(crate::checker_dirs::search_cache_dir)
    }

    /// Validate the engine settings.
    ///
    /// # Errors
    ///
    /// Returns [`CheckerError::Search`] when the search settings are invalid.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        Ok(())
    }
}

fn first_non_blank<F>(names: &[&str], lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
}
