//! Trait definition for the row-oriented record source.
//!
//! The engine never talks to a storage engine directly. It asks a
//! [`RecordSource`] for rows of one collection whose name column contains
//! the query case-insensitively, bounded by a row cap.

use crate::error::SearchError;
use crate::types::RawRecord;

/// One filtered query against a single collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Collection (table) to read from.
    pub collection: String,
    /// Column the filter applies to.
    pub column: String,
    /// Case-insensitive substring the column must contain.
    pub pattern: String,
    /// Maximum number of rows to return.
    pub limit: usize,
}

/// Rows returned for a [`RecordQuery`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPage {
    pub rows: Vec<RawRecord>,
    /// Total number of matching rows when the source reports it.
    pub total_count: Option<u64>,
}

impl RecordPage {
    pub fn new(rows: Vec<RawRecord>) -> Self {
        Self {
            rows,
            total_count: None,
        }
    }
}

/// A pluggable backend able to fetch filtered rows.
///
/// Implementations must be `Send + Sync`: the orchestrator issues one
/// query per monitored list concurrently.
pub trait RecordSource: Send + Sync {
    /// Fetch rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the source answers with
    /// a non-success status, or the body cannot be decoded. The orchestrator
    /// treats every such error as an empty contribution from that list.
    fn fetch(
        &self,
        query: &RecordQuery,
    ) -> impl std::future::Future<Output = Result<RecordPage, SearchError>> + Send;

    /// Verify that the source is configured well enough to be queried.
    ///
    /// Called once per search before any fetch. An error here is fatal to
    /// the search and is reported verbatim.
    fn check_configured(&self) -> Result<(), SearchError> {
        Ok(())
    }
}
