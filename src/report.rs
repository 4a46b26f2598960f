//! Plain-text rendering of search results.
//!
//! Each match shows its tier badge, the company name, the list label and
//! the match score, followed by whichever detail columns the row carries.

use std::fmt::Write as _;

use company_search::{has_cross_reference, MatchRecord};

/// Detail columns shown under a match, with their captions, in display order.
const DETAIL_FIELDS: &[(&str, &str)] = &[
    ("employer_code", "Employer Code"),
    ("legal_status", "Legal Status"),
    ("group_name", "Group Name"),
    ("category", "Category"),
    ("industry", "Industry"),
    ("emirate", "Emirate"),
    ("establishment_date", "Est. Date"),
    ("po_box", "PO Box"),
    ("employer_id", "Employer ID"),
    ("status", "Status Details"),
    ("reason", "Reason / Notes"),
    ("comments", "Comments"),
];

const CROSS_REFERENCE_WARNING: &str =
    "Note: this name appears under more than one classification. Review every entry before deciding.";

/// Render `query`'s results as a human-readable report.
pub fn render(query: &str, results: &[MatchRecord]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        let _ = writeln!(out, "No matches for \"{query}\".");
        return out;
    }

    let noun = if results.len() == 1 { "match" } else { "matches" };
    let _ = writeln!(out, "{} {noun} for \"{query}\"", results.len());
    if has_cross_reference(results) {
        let _ = writeln!(out, "{CROSS_REFERENCE_WARNING}");
    }

    for (i, record) in results.iter().enumerate() {
        let _ = writeln!(out);
        render_record(&mut out, i + 1, record);
    }
    out
}

fn render_record(out: &mut String, position: usize, record: &MatchRecord) {
    let badge = record.tier.label().to_uppercase();
    let _ = writeln!(out, "{position}. [{badge}] {}", record.display_name);
    let _ = writeln!(out, "   Status: {}", record.label);
    let _ = writeln!(out, "   Match: {:.0}%", record.match_score);

    for (column, caption) in DETAIL_FIELDS {
        let Some(value) = record.fields.text(column) else {
            continue;
        };
        // A status that merely repeats the list label adds nothing.
        if *column == "status" && value == record.label {
            continue;
        }
        let _ = writeln!(out, "   {caption}: {value}");
    }
    let _ = writeln!(out, "   Source: {}", record.source_id);
}
