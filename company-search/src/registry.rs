//! Source registry: the monitored compliance lists and their classification.
//!
//! Each [`SourceDescriptor`] binds one record-source collection to a tier,
//! a display label, a static priority and the column holding the company
//! name. Adding or removing a monitored list means changing this registry,
//! not engine logic.

use std::collections::HashSet;

use crate::error::SearchError;
use crate::orchestrator::scoring::{HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE};
use crate::types::Tier;

/// Immutable description of one monitored list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Record-source collection name, also used as the record's `sourceId`.
    pub id: String,
    /// Column holding the company name.
    pub column: String,
    pub tier: Tier,
    /// Static priority. Lower sorts first.
    pub priority: u32,
    pub label: String,
}

impl SourceDescriptor {
    pub fn new(
        id: impl Into<String>,
        column: impl Into<String>,
        tier: Tier,
        priority: u32,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            column: column.into(),
            tier,
            priority,
            label: label.into(),
        }
    }
}

/// Ordered, read-only list of monitored sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    /// Build a registry from descriptors, validating their order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the list is empty, an id repeats,
    /// priorities are not ascending, tiers are not grouped in precedence
    /// order, or a priority falls outside the static range.
    pub fn new(sources: Vec<SourceDescriptor>) -> Result<Self, SearchError> {
        if sources.is_empty() {
            return Err(SearchError::Config(
                "source registry must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for source in &sources {
            if !seen.insert(source.id.as_str()) {
                return Err(SearchError::Config(format!(
                    "duplicate source id: {}",
                    source.id
                )));
            }
            if source.priority < HIGHEST_PRECEDENCE || source.priority >= LOWEST_PRECEDENCE {
                return Err(SearchError::Config(format!(
                    "source {} priority {} must be in {HIGHEST_PRECEDENCE}..{LOWEST_PRECEDENCE}",
                    source.id, source.priority
                )));
            }
            if source.column.trim().is_empty() {
                return Err(SearchError::Config(format!(
                    "source {} has no name column",
                    source.id
                )));
            }
        }

        for pair in sources.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.priority < prev.priority {
                return Err(SearchError::Config(format!(
                    "source {} priority must not be lower than {}",
                    next.id, prev.id
                )));
            }
            if next.tier < prev.tier {
                return Err(SearchError::Config(format!(
                    "source {} ({}) must not follow {} ({})",
                    next.id, next.tier, prev.id, prev.tier
                )));
            }
        }

        Ok(Self { sources })
    }

    /// The built-in compliance lists.
    pub fn builtin() -> Self {
        let sources = vec![
            SourceDescriptor::new(
                "delisted_company_1",
                "company_name",
                Tier::Delisted,
                1,
                "Deletion / Suspension: Delisted Employer from Jan08",
            ),
            SourceDescriptor::new(
                "delisted_company_2",
                "company_name",
                Tier::Delisted,
                2,
                "Deletion / Suspension: Delisted Employer July02 to Dec07",
            ),
            SourceDescriptor::new(
                "eib_approved",
                "company_name",
                Tier::TargetMarket,
                3,
                "TML: EIB – Approved Employer",
            ),
            SourceDescriptor::new(
                "enbd_approved",
                "company_name",
                Tier::TargetMarket,
                4,
                "TML: ENBD – Approved Employer",
            ),
            SourceDescriptor::new(
                "payroll_approved",
                "company_name",
                Tier::TargetMarket,
                5,
                "TML: Payroll Employer",
            ),
            SourceDescriptor::new(
                "credit_card_approved",
                "company_name",
                Tier::TargetMarket,
                6,
                "TML: Credit Card Approved Employer",
            ),
            SourceDescriptor::new(
                "good_listed",
                "employer_name",
                Tier::GoodStanding,
                7,
                "Good List Company (NTML): Verified Corporate Status",
            ),
        ];
        Self { sources }
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    pub fn get(&self, id: &str) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
