//! Core types: classification tiers, raw rows and match records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification bucket for a matched company.
///
/// Variant order is the tier precedence: delisted entries always outrank
/// target-market entries, which outrank good-standing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Deleted or suspended employer. A compliance red flag.
    Delisted,
    /// Approved under the target market lists (TML).
    TargetMarket,
    /// Verified corporate status outside the target market lists.
    GoodStanding,
}

impl Tier {
    /// Short human-readable name of the tier.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delisted => "Delisted",
            Self::TargetMarket => "TML",
            Self::GoodStanding => "Good List",
        }
    }

    /// Presentation theme identifier. Not used by the engine itself.
    pub fn theme(&self) -> &'static str {
        match self {
            Self::Delisted => "red",
            Self::TargetMarket => "green",
            Self::GoodStanding => "blue",
        }
    }

    pub fn all() -> &'static [Tier] {
        &[Self::Delisted, Self::TargetMarket, Self::GoodStanding]
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single column value from a source row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    /// Converts a JSON scalar. Arrays and objects have no field representation.
    pub fn from_json(value: serde_json::Value) -> Option<Option<Self>> {
        match value {
            serde_json::Value::Null => Some(None),
            serde_json::Value::String(s) => Some(Some(Self::Text(s))),
            serde_json::Value::Bool(b) => Some(Some(Self::Bool(b))),
            serde_json::Value::Number(n) => {
                let value = match n.as_i64() {
                    Some(i) => Self::Integer(i),
                    None => Self::Float(n.as_f64()?),
                };
                Some(Some(value))
            }
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A raw source row: column name to optional scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, Option<FieldValue>>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a decoded JSON object, dropping nested values.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut fields = BTreeMap::new();
        for (column, value) in object {
            match FieldValue::from_json(value) {
                Some(field) => {
                    fields.insert(column, field);
                }
                None => tracing::trace!(%column, "dropping non-scalar column"),
            }
        }
        Self(fields)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Option<FieldValue>) {
        self.0.insert(column.into(), value);
    }

    /// Returns the value of `column` if it is present and non-null.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.get(column).and_then(Option::as_ref)
    }

    /// Returns the non-empty text form of `column`, if any.
    pub fn text(&self, column: &str) -> Option<String> {
        let text = self.get(column)?.to_string();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Removes `column`, returning its value if it was present.
    pub fn remove(&mut self, column: &str) -> Option<Option<FieldValue>> {
        self.0.remove(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<FieldValue>)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, Option<FieldValue>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Serialized keys of the [`MatchRecord`] envelope. Raw columns with these
/// names are dropped so the envelope wins and the JSON has unique keys.
pub const ENVELOPE_KEYS: &[&str] = &[
    "displayName",
    "tier",
    "priority",
    "sourceId",
    "label",
    "matchScore",
];

/// A classified match: the engine's output unit.
///
/// Carries the raw row fields alongside the classification envelope so a
/// display layer can render a badge, a title and whichever detail columns
/// the source provided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Company name resolved from the source's configured column.
    pub display_name: String,
    pub tier: Tier,
    /// Effective priority after the delisted promotion/demotion policy.
    pub priority: u32,
    pub source_id: String,
    pub label: String,
    /// Heuristic confidence in `0..=100`.
    pub match_score: f64,
    /// Raw columns returned by the source, merged into the envelope.
    /// Never holds an [`ENVELOPE_KEYS`] column.
    #[serde(flatten)]
    pub fields: RawRecord,
}

/// Whether a result set may show one entity under several classifications.
///
/// True when there is more than one record and at least one of them is
/// [`Tier::TargetMarket`] or [`Tier::GoodStanding`].
pub fn has_cross_reference(records: &[MatchRecord]) -> bool {
    records.len() > 1 && records.iter().any(|r| r.tier != Tier::Delisted)
}
