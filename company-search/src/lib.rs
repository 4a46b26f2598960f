//! # company-search
//!
//! Matching and ranking engine that tells whether a company appears in any
//! of several compliance reference lists: delisted employers, target-market
//! (TML) approved employers, and the good-standing list.
//!
//! ## Design
//!
//! - Normalises free-text company names (`&` → `and`, legal suffixes and
//!   punctuation removed) so spelling variants compare equal
//! - Scores candidates 0–100 with cheap, explainable heuristics
//! - Queries every list concurrently through a pluggable [`RecordSource`]
//! - Exact delisted hits always sort first; fuzzy delisted hits never bury
//!   clearer matches elsewhere
//! - Two-tier cache: short-lived in-memory tier plus a durable tier for
//!   offline-style reuse
//! - Graceful degradation: a failing or slow list contributes no rows
//!   instead of failing the search
//!
//! ## Security
//!
//! - Raw queries are sanitised before they reach the record source
//! - Search queries are logged only at trace level
//! - API keys are redacted from `Debug` output and never appear in errors

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod registry;
pub mod source;
pub mod types;

pub use cache::{CacheStats, ResultCache, TieredCache};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use http::{RestRecordSource, RestSourceConfig};
pub use orchestrator::name_normalize::normalize;
pub use orchestrator::scoring::score;
pub use orchestrator::search::CompanySearch;
pub use registry::{SourceDescriptor, SourceRegistry};
pub use source::{RecordPage, RecordQuery, RecordSource};
pub use types::{has_cross_reference, FieldValue, MatchRecord, RawRecord, Tier};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::MemoryStore;

    fn cache() -> Arc<ResultCache> {
        Arc::new(ResultCache::from_config(
            Arc::new(MemoryStore::new()),
            &SearchConfig::default(),
        ))
    }

    fn unconfigured_source() -> RestRecordSource {
        RestRecordSource::new(RestSourceConfig::default()).expect("client")
    }

    #[test]
    fn new_validates_config() {
        let config = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        let result = CompanySearch::new(
            unconfigured_source(),
            SourceRegistry::builtin(),
            cache(),
            config,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_query_returns_empty_without_credentials() {
        let search = CompanySearch::new(
            unconfigured_source(),
            SourceRegistry::builtin(),
            cache(),
            SearchConfig::default(),
        )
        .expect("valid");
        let results = search.search("  <>  ", false).await.expect("no error");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_is_config_error() {
        let search = CompanySearch::new(
            unconfigured_source(),
            SourceRegistry::builtin(),
            cache(),
            SearchConfig::default(),
        )
        .expect("valid");
        let err = search.search("Emaar", false).await.unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn reexported_helpers() {
        assert_eq!(normalize("Sobha & Co. LLC"), "sobha and co");
        assert_eq!(score("sobha", "Sobha Construction LLC"), 85.0);
    }
}
