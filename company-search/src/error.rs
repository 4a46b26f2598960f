//! Error types for the company-search crate.
//!
//! Only [`SearchError::Config`] and [`SearchError::Timeout`] ever reach the
//! caller of a search. HTTP and parse failures are produced per source and
//! recovered by the orchestrator as an empty contribution. No credentials
//! appear in error messages.

/// Errors that can occur while searching the compliance lists.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Missing credentials or an invalid search/registry configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A search or a single source query exceeded its time budget.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// An HTTP request to the record source failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The record source returned a body that is not a JSON array of rows.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience type alias for company-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = SearchError::Config("record source URL is not set".into());
        assert_eq!(err.to_string(), "config error: record source URL is not set");
    }

    #[test]
    fn display_timeout() {
        let err = SearchError::Timeout("exceeded 10000ms".into());
        assert_eq!(err.to_string(), "search timed out: exceeded 10000ms");
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("eib_approved returned HTTP 500".into());
        assert_eq!(err.to_string(), "HTTP error: eib_approved returned HTTP 500");
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("expected a JSON array".into());
        assert_eq!(err.to_string(), "parse error: expected a JSON array");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
