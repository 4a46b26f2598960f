//! Search orchestrator: normalisation, scoring, fan-out, ranking.
//!
//! This module fans a query out to every monitored list concurrently,
//! scores each returned row against the query, applies the delisted
//! priority policy, resolves cross-list duplicates and returns a sorted,
//! truncated result set.

pub mod dedup;
pub mod name_normalize;
pub mod scoring;
pub mod search;
