//! Match scoring and the delisted priority policy.
//!
//! Scores are cheap, deterministic and explainable:
//! - 100: normalised names are equal
//! - 85: the normalised candidate contains the normalised query
//! - otherwise: percentage of query tokens (longer than one character)
//!   found inside some candidate token
//!
//! The 85 and 40 constants are tunable heuristics kept for behavioural
//! compatibility with the lists' existing users.

use crate::types::Tier;

use super::name_normalize::normalize;

/// Score for names that normalise to the same string.
pub const EXACT_MATCH_SCORE: f64 = 100.0;

/// Score when the candidate contains the whole query.
pub const SUBSTRING_MATCH_SCORE: f64 = 85.0;

/// Default minimum score for a record to be returned.
pub const RELEVANCE_THRESHOLD: f64 = 40.0;

/// Highest precedence value. Exact delisted matches are promoted here.
pub const HIGHEST_PRECEDENCE: u32 = 1;

/// Lowest precedence value. Fuzzy delisted matches are demoted here.
pub const LOWEST_PRECEDENCE: u32 = 99;

/// Score `candidate` against `query` in `0.0..=100.0`.
///
/// Both inputs are normalised first; an empty side scores 0.
///
/// # Examples
///
/// ```
/// use company_search::orchestrator::scoring::score;
///
/// assert_eq!(score("Sobha LLC", "sobha"), 100.0);
/// assert_eq!(score("sobha", "Sobha Construction LLC"), 85.0);
/// assert_eq!(score("", "anything"), 0.0);
/// ```
pub fn score(query: &str, candidate: &str) -> f64 {
    let query = normalize(query);
    let candidate = normalize(candidate);

    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    if query == candidate {
        return EXACT_MATCH_SCORE;
    }
    if candidate.contains(&query) {
        return SUBSTRING_MATCH_SCORE;
    }

    let query_tokens: Vec<&str> = query
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .collect();
    if query_tokens.is_empty() {
        return 0.0;
    }

    let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();
    let matched = query_tokens
        .iter()
        .filter(|q| candidate_tokens.iter().any(|c| c.contains(*q)))
        .count();

    100.0 * matched as f64 / query_tokens.len() as f64
}

/// Effective priority of a record after the delisted policy.
///
/// An exact delisted match is a compliance signal that must never be
/// outranked, so it is promoted to [`HIGHEST_PRECEDENCE`]. A fuzzy delisted
/// match must not bury clearer matches elsewhere, so it is demoted to
/// [`LOWEST_PRECEDENCE`]. Other tiers keep their configured priority.
pub fn effective_priority(tier: Tier, static_priority: u32, match_score: f64) -> u32 {
    match tier {
        Tier::Delisted if match_score >= EXACT_MATCH_SCORE => HIGHEST_PRECEDENCE,
        Tier::Delisted => LOWEST_PRECEDENCE,
        Tier::TargetMarket | Tier::GoodStanding => static_priority,
    }
}
