//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls result limits, the relevance threshold,
//! timeouts and cache lifetimes. The defaults match the behaviour the
//! compliance desk relies on; change them only deliberately.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::orchestrator::scoring::RELEVANCE_THRESHOLD;

/// Configuration for a company search.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of records returned after ranking and duplicate resolution.
    pub max_results: usize,
    /// Row cap requested from each source, bounding worst-case fan-in.
    pub row_limit: usize,
    /// Records scoring below this value are dropped. Tunable heuristic.
    pub relevance_threshold: f64,
    /// Per-source request budget in milliseconds.
    pub source_timeout_ms: u64,
    /// End-to-end budget for one search in milliseconds.
    pub search_timeout_ms: u64,
    /// Raw queries are truncated to this many characters after sanitisation.
    pub max_query_chars: usize,
    /// Lifetime of fast-tier cache entries in seconds.
    pub memory_ttl_secs: u64,
    /// Lifetime of durable-tier cache entries in seconds.
    pub durable_ttl_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 25,
            row_limit: 100,
            relevance_threshold: RELEVANCE_THRESHOLD,
            source_timeout_ms: 10_000,
            search_timeout_ms: 10_000,
            max_query_chars: 100,
            memory_ttl_secs: 5 * 60,
            durable_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results`, `row_limit` and `max_query_chars` must be greater than 0
    /// - `row_limit` must not exceed 100
    /// - `relevance_threshold` must lie in `0..=100`
    /// - both timeouts and both TTLs must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.row_limit == 0 || self.row_limit > 100 {
            return Err(SearchError::Config(
                "row_limit must be between 1 and 100".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.relevance_threshold) {
            return Err(SearchError::Config(
                "relevance_threshold must be between 0 and 100".into(),
            ));
        }
        if self.source_timeout_ms == 0 || self.search_timeout_ms == 0 {
            return Err(SearchError::Config(
                "timeouts must be greater than 0".into(),
            ));
        }
        if self.max_query_chars == 0 {
            return Err(SearchError::Config(
                "max_query_chars must be greater than 0".into(),
            ));
        }
        if self.memory_ttl_secs == 0 || self.durable_ttl_secs == 0 {
            return Err(SearchError::Config(
                "cache TTLs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    pub fn memory_ttl(&self) -> Duration {
        Duration::from_secs(self.memory_ttl_secs)
    }

    pub fn durable_ttl(&self) -> Duration {
        Duration::from_secs(self.durable_ttl_secs)
    }
}
