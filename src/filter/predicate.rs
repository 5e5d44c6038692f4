//! Per-field predicates.
//!
//! Every predicate is total: a missing field never panics and an absent
//! criterion never excludes. When a criterion IS set and the record lacks
//! the field, the record does not match.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::{Record, TextField};

/// Case-insensitive substring search across a record's text fields.
///
/// `fields` restricts which text fields are inspected; `None` or an empty
/// set means all of them. An empty or whitespace-only query matches
/// everything.
pub fn text_matches<R: Record>(record: &R, query: &str, fields: Option<&BTreeSet<TextField>>) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    record
        .text_fields()
        .into_iter()
        .filter(|(field, _)| fields.is_none_or(|set| set.is_empty() || set.contains(field)))
        .any(|(_, text)| text.to_lowercase().contains(&needle))
}

/// Membership test for a single-valued field.
pub fn in_set(value: Option<&str>, allowed: Option<&BTreeSet<String>>) -> bool {
    match allowed {
        None => true,
        Some(set) if set.is_empty() => true,
        Some(set) => value.is_some_and(|v| set.contains(v)),
    }
}

/// Membership test for a multi-valued field: any value in the set matches.
pub fn any_in_set(values: &[String], allowed: Option<&BTreeSet<String>>) -> bool {
    match allowed {
        None => true,
        Some(set) if set.is_empty() => true,
        Some(set) => values.iter().any(|v| set.contains(v)),
    }
}

/// Calendar-date range containment, both bounds inclusive.
///
/// An absent bound is open on that side. A reversed range matches nothing.
pub fn date_in_range(value: Option<NaiveDate>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    let Some(date) = value else {
        return false;
    };

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return false;
        }
    }

    start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
}

/// True when no tags are requested, or the record carries at least one of them.
///
/// Tags compare case-insensitively.
pub fn any_tag_matches(record_tags: &[String], filter_tags: &[String]) -> bool {
    if filter_tags.is_empty() {
        return true;
    }

    let wanted: BTreeSet<String> = filter_tags.iter().map(|t| t.to_lowercase()).collect();
    record_tags.iter().any(|tag| wanted.contains(&tag.to_lowercase()))
}

/// Strict equality against a requested flag value.
pub fn flag_equals(record_flag: Option<bool>, filter_flag: Option<bool>) -> bool {
    match filter_flag {
        None => true,
        Some(wanted) => record_flag == Some(wanted),
    }
}
