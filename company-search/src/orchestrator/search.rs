//! Core search orchestrator: concurrent per-list fan-out, score, rank, cache.
//!
//! Queries every monitored list concurrently, scores each returned row
//! against the query, applies the delisted priority policy, sorts by
//! effective priority then score, resolves cross-list duplicates, truncates
//! and caches the result in both cache tiers.

use std::sync::Arc;

use crate::cache::{CacheStats, ResultCache};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::registry::{SourceDescriptor, SourceRegistry};
use crate::source::{RecordPage, RecordQuery, RecordSource};
use crate::types::{MatchRecord, RawRecord, ENVELOPE_KEYS};

use super::dedup::resolve_duplicates;
use super::name_normalize::sanitize_query;
use super::scoring::{effective_priority, score};

/// Prefix of result-cache keys.
const CACHE_KEY_PREFIX: &str = "search_";

/// The company search service.
///
/// Owns the record source, the registry and the search configuration, and
/// shares the [`ResultCache`] with whoever else needs to maintain it.
/// Construct once at start-up.
pub struct CompanySearch<S> {
    source: S,
    registry: SourceRegistry,
    cache: Arc<ResultCache>,
    config: SearchConfig,
}

impl<S: RecordSource> CompanySearch<S> {
    /// Create a search service.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(
        source: S,
        registry: SourceRegistry,
        cache: Arc<ResultCache>,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            source,
            registry,
            cache,
            config,
        })
    }

    /// Search every monitored list for `query`.
    ///
    /// Returns at most `max_results` classified matches, ordered by
    /// effective priority then score, with delisted entries ahead of any
    /// other entry for the same company. A query that sanitises to nothing
    /// returns an empty list without touching the cache or the network.
    ///
    /// Unless `force_refresh` is set, a cached result is returned verbatim.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Config`] if the record source lacks credentials.
    /// - [`SearchError::Timeout`] if the whole search exceeds its budget.
    ///
    /// Individual list failures are logged and contribute no rows.
    pub async fn search(
        &self,
        query: &str,
        force_refresh: bool,
    ) -> Result<Vec<MatchRecord>, SearchError> {
        let clean = sanitize_query(query, self.config.max_query_chars);
        if clean.is_empty() {
            return Ok(Vec::new());
        }

        let budget = self.config.search_timeout();
        match tokio::time::timeout(budget, self.orchestrate(&clean, force_refresh)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = self.config.search_timeout_ms, "search timed out");
                Err(SearchError::Timeout(format!(
                    "no answer within {}ms; check your connection and retry",
                    self.config.search_timeout_ms
                )))
            }
        }
    }

    /// Clear the whole cache, then search with a forced refresh.
    ///
    /// # Errors
    ///
    /// Same as [`CompanySearch::search`].
    pub async fn refresh(&self, query: &str) -> Result<Vec<MatchRecord>, SearchError> {
        self.cache.clear().await;
        tracing::info!("cache cleared by user refresh");
        self.search(query, true).await
    }

    /// Drop the cached result for `query` from both tiers.
    pub async fn invalidate(&self, query: &str) {
        let clean = sanitize_query(query, self.config.max_query_chars);
        if !clean.is_empty() {
            self.cache.invalidate(&cache_key(&clean)).await;
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// # Pipeline
    ///
    /// 1. Serve from cache unless `force_refresh`
    /// 2. Verify record source credentials
    /// 3. Fan out one query per list with [`futures::future::join_all`]
    /// 4. Log per-list errors at warn level; keep successful rows
    /// 5. Score, threshold and classify each row
    /// 6. Sort by effective priority, then score (descending)
    /// 7. Resolve cross-list duplicates
    /// 8. Truncate to `config.max_results` and cache
    async fn orchestrate(
        &self,
        clean: &str,
        force_refresh: bool,
    ) -> Result<Vec<MatchRecord>, SearchError> {
        let key = cache_key(clean);

        if !force_refresh {
            if let Some(cached) = self.cache.get(&key).await {
                tracing::debug!(count = cached.len(), "serving search from cache");
                return Ok(cached);
            }
        }

        self.source.check_configured()?;
        tracing::trace!(query = clean, "searching all lists");

        let futures: Vec<_> = self
            .registry
            .sources()
            .iter()
            .map(|descriptor| async move {
                let outcome = self.query_source(descriptor, clean).await;
                (descriptor, outcome)
            })
            .collect();

        let outcomes = futures::future::join_all(futures).await;

        let mut matches: Vec<MatchRecord> = Vec::new();
        for (descriptor, outcome) in outcomes {
            match outcome {
                Ok(page) => {
                    tracing::debug!(
                        source = %descriptor.id,
                        count = page.rows.len(),
                        total = ?page.total_count,
                        "list returned rows"
                    );
                    matches.extend(page.rows.into_iter().filter_map(|row| {
                        classify_row(descriptor, clean, row, self.config.relevance_threshold)
                    }));
                }
                Err(err) => {
                    tracing::warn!(source = %descriptor.id, error = %err, "list query failed");
                }
            }
        }

        sort_by_priority(&mut matches);
        let mut results = resolve_duplicates(matches);
        results.truncate(self.config.max_results);

        tracing::debug!(count = results.len(), "search complete");
        self.cache.set(&key, results.clone(), None).await;
        Ok(results)
    }

    /// Query one list under the per-source timeout.
    async fn query_source(
        &self,
        descriptor: &SourceDescriptor,
        clean: &str,
    ) -> Result<RecordPage, SearchError> {
        let query = RecordQuery {
            collection: descriptor.id.clone(),
            column: descriptor.column.clone(),
            pattern: clean.to_owned(),
            limit: self.config.row_limit,
        };
        tokio::time::timeout(self.config.source_timeout(), self.source.fetch(&query))
            .await
            .map_err(|_| {
                SearchError::Timeout(format!(
                    "{} exceeded {}ms",
                    descriptor.id, self.config.source_timeout_ms
                ))
            })?
    }
}

/// Cache key for a sanitised query.
pub fn cache_key(clean_query: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{}", clean_query.to_lowercase())
}

/// Turn one source row into a [`MatchRecord`], or drop it.
///
/// Rows without a name in the descriptor's column, or scoring below
/// `threshold`, are dropped. Delisted rows get their effective priority
/// from the promotion/demotion policy. Raw columns that share a name with
/// an envelope key are dropped.
pub fn classify_row(
    descriptor: &SourceDescriptor,
    query: &str,
    mut row: RawRecord,
    threshold: f64,
) -> Option<MatchRecord> {
    let display_name = row.text(&descriptor.column)?;
    let match_score = score(query, &display_name);
    if match_score < threshold {
        return None;
    }

    for key in ENVELOPE_KEYS {
        if row.remove(key).is_some() {
            tracing::trace!(column = *key, "dropping column shadowed by match envelope");
        }
    }

    Some(MatchRecord {
        display_name,
        tier: descriptor.tier,
        priority: effective_priority(descriptor.tier, descriptor.priority, match_score),
        source_id: descriptor.id.clone(),
        label: descriptor.label.clone(),
        match_score,
        fields: row,
    })
}

/// Stable sort by ascending effective priority, then descending score.
pub fn sort_by_priority(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.match_score.total_cmp(&a.match_score))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::scoring::{HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE};
    use crate::types::{FieldValue, Tier};

    fn row(column: &str, name: &str) -> RawRecord {
        [(column, Some(FieldValue::Text(name.into())))]
            .into_iter()
            .collect()
    }

    fn descriptor(id: &str, tier: Tier, priority: u32) -> SourceDescriptor {
        SourceDescriptor::new(id, "company_name", tier, priority, format!("{id} label"))
    }

    fn make_record(tier: Tier, priority: u32, score: f64, source: &str) -> MatchRecord {
        MatchRecord {
            display_name: format!("Name {source}"),
            tier,
            priority,
            source_id: source.into(),
            label: String::new(),
            match_score: score,
            fields: RawRecord::new(),
        }
    }

    #[test]
    fn cache_key_lowercases() {
        assert_eq!(cache_key("ABC Trading"), "search_abc trading");
    }

    #[test]
    fn classify_row_resolves_name_and_score() {
        let d = descriptor("eib_approved", Tier::TargetMarket, 3);
        let record = classify_row(&d, "ABC", row("company_name", "ABC Co"), 40.0)
            .expect("should match");
        assert_eq!(record.display_name, "ABC Co");
        assert_eq!(record.tier, Tier::TargetMarket);
        assert_eq!(record.priority, 3);
        assert_eq!(record.source_id, "eib_approved");
        assert_eq!(record.label, "eib_approved label");
        assert_eq!(record.match_score, 85.0);
        assert_eq!(record.fields.text("company_name").as_deref(), Some("ABC Co"));
    }

    #[test]
    fn classify_row_drops_missing_name() {
        let d = descriptor("good_listed", Tier::GoodStanding, 7);
        assert!(classify_row(&d, "ABC", row("employer_name", "ABC"), 40.0).is_none());
    }

    #[test]
    fn classify_row_drops_below_threshold() {
        let d = descriptor("eib_approved", Tier::TargetMarket, 3);
        // One of three tokens matches: 33.3 < 40.
        assert!(classify_row(&d, "alpha beta gamma", row("company_name", "Alpha Trading"), 40.0)
            .is_none());
        // Half of the tokens: 50 >= 40.
        assert!(classify_row(&d, "alpha beta", row("company_name", "Alpha Trading"), 40.0)
            .is_some());
    }

    #[test]
    fn classify_row_applies_delisted_policy() {
        let d = descriptor("delisted_company_2", Tier::Delisted, 2);
        let exact = classify_row(&d, "ABC", row("company_name", "ABC LLC"), 40.0).expect("exact");
        assert_eq!(exact.priority, HIGHEST_PRECEDENCE);
        let fuzzy =
            classify_row(&d, "ABC", row("company_name", "ABC Company"), 40.0).expect("fuzzy");
        assert_eq!(fuzzy.priority, LOWEST_PRECEDENCE);
    }

    #[test]
    fn classify_row_drops_envelope_named_columns() {
        let d = descriptor("eib_approved", Tier::TargetMarket, 3);
        let mut raw = row("company_name", "ABC Co");
        raw.insert("label", Some(FieldValue::Text("raw label".into())));
        raw.insert("priority", Some(FieldValue::Integer(42)));
        raw.insert("emirate", Some(FieldValue::Text("Dubai".into())));

        let record = classify_row(&d, "ABC", raw, 40.0).expect("should match");
        assert_eq!(record.label, "eib_approved label");
        assert_eq!(record.priority, 3);
        assert!(record.fields.get("label").is_none());
        assert!(record.fields.get("priority").is_none());
        assert_eq!(record.fields.text("emirate").as_deref(), Some("Dubai"));

        let json = serde_json::to_string(&record).expect("serialize");
        let decoded: MatchRecord = serde_json::from_str(&json).expect("unique keys decode");
        assert_eq!(decoded, record);
    }

    #[test]
    fn sort_orders_priority_then_score() {
        let mut records = vec![
            make_record(Tier::GoodStanding, 7, 100.0, "good"),
            make_record(Tier::TargetMarket, 3, 85.0, "eib_85"),
            make_record(Tier::TargetMarket, 3, 100.0, "eib_100"),
            make_record(Tier::Delisted, 1, 100.0, "delisted"),
        ];
        sort_by_priority(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(order, ["delisted", "eib_100", "eib_85", "good"]);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut records = vec![
            make_record(Tier::TargetMarket, 4, 85.0, "first"),
            make_record(Tier::TargetMarket, 4, 85.0, "second"),
        ];
        sort_by_priority(&mut records);
        assert_eq!(records[0].source_id, "first");
    }
}
