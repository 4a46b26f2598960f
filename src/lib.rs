//! Company checker: is this employer delisted, target-market approved or in
//! good standing?
//!
//! This crate is the application shell around the [`company_search`]
//! engine:
//! - **Configuration**: TOML file plus `.env`/environment credentials
//! - **Directories**: platform config and cache locations via `dirs`
//! - **Service wiring**: REST record source and file-backed result cache
//! - **Reporting**: plain-text rendering of ranked matches

pub mod checker_dirs;
pub mod config;
pub mod error;
pub mod report;
pub mod service;

pub use config::CheckerConfig;
pub use error::{CheckerError, Result};
pub use service::{build_search, CheckerSearch};
