//! Error types for the company checker application.

use company_search::SearchError;

/// Top-level error type for the application shell.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// Configuration file or environment error.
    #[error("config error: {0}")]
    Config(String),

    /// Search engine error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CheckerError>;
