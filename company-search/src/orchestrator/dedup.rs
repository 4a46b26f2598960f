//! Cross-source duplicate resolution by normalised company name.
//!
//! The same entity often appears in several lists. Records are grouped by
//! normalised display name and every record is kept: a duplicate is a
//! signal, not noise. When a group mixes delisted and non-delisted entries,
//! the delisted ones are moved to the front of the group so a delisted flag
//! is never shown behind a good-standing or target-market entry.

use std::collections::HashMap;

use crate::types::{MatchRecord, Tier};

use super::name_normalize::normalize;

/// Reorder `records` so mixed-tier collisions show delisted entries first.
///
/// Groups are emitted in order of their first appearance in `records`,
/// which the caller has already sorted. Within a group, relative order is
/// preserved apart from the delisted-first rule.
pub fn resolve_duplicates(records: Vec<MatchRecord>) -> Vec<MatchRecord> {
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<MatchRecord>> = Vec::new();

    for record in records {
        let key = normalize(&record.display_name);
        match group_index.get(&key) {
            Some(&idx) => groups[idx].push(record),
            None => {
                group_index.insert(key, groups.len());
                groups.push(vec![record]);
            }
        }
    }

    let mut resolved = Vec::new();
    for group in groups {
        if is_mixed_collision(&group) {
            let (delisted, others): (Vec<_>, Vec<_>) =
                group.into_iter().partition(|r| r.tier == Tier::Delisted);
            resolved.extend(delisted);
            resolved.extend(others);
        } else {
            resolved.extend(group);
        }
    }
    resolved
}

/// True when a group holds at least one delisted and one non-delisted record.
fn is_mixed_collision(group: &[MatchRecord]) -> bool {
    group.len() > 1
        && group.iter().any(|r| r.tier == Tier::Delisted)
        && group.iter().any(|r| r.tier != Tier::Delisted)
}
