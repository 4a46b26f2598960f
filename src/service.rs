//! Wiring of the search engine from application configuration.

use std::sync::Arc;

use company_search::cache::{DurableStore, FileStore, MemoryStore};
use company_search::{CompanySearch, RestRecordSource, ResultCache, SourceRegistry};

use crate::config::CheckerConfig;
use crate::error::Result;

/// The concrete search service used by the application.
pub type CheckerSearch = CompanySearch<RestRecordSource>;

/// Build the search service described by `config`.
///
/// The durable tier is file-backed under [`CheckerConfig::cache_dir`]. If
/// that directory cannot be created the service still starts, caching only
/// for the lifetime of the process.
///
/// # Errors
///
/// Returns an error if the search settings are invalid or the HTTP client
/// cannot be built. Missing credentials are reported later, by the first
/// search that needs the network.
pub fn build_search(config: &CheckerConfig) -> Result<CheckerSearch> {
    config.validate()?;

    let durable = open_durable_store(config);
    let cache = Arc::new(ResultCache::from_config(durable, &config.search));
    let source = RestRecordSource::new(config.source.clone())?;

    tracing::debug!(
        credentials = config.source.has_credentials(),
        durable = config.cache.durable,
        "search service ready"
    );
    Ok(CompanySearch::new(
        source,
        SourceRegistry::builtin(),
        cache,
        config.search.clone(),
    )?)
}

fn open_durable_store(config: &CheckerConfig) -> Arc<dyn DurableStore> {
    if !config.cache.durable {
        return Arc::new(MemoryStore::new());
    }
    let dir = config.cache_dir();
    match FileStore::open(&dir) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %err,
                "durable cache unavailable, caching in memory only"
            );
            Arc::new(MemoryStore::new())
        }
    }
}
