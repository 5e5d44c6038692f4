//! Input validation and synonym resolution.
//!
//! Provides O(1) validation sets and synonym maps so users can type the
//! words they think in ("done", "wip", "p0") for statuses, priorities and
//! categories. Three-tier resolution: exact match → synonym lookup → error
//! with suggestion.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};

use crate::error::{Error, Result};
use crate::model::{
    EntityKind, Enumeration, ExperimentCategory, ExperimentStatus, Priority, RoleStatus,
    TaskCategory, TaskStatus,
};

fn domain<E: Enumeration>() -> HashSet<&'static str> {
    E::ALL.iter().map(Enumeration::as_str).collect()
}

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static TASK_STATUSES: LazyLock<HashSet<&str>> = LazyLock::new(domain::<TaskStatus>);
pub static EXPERIMENT_STATUSES: LazyLock<HashSet<&str>> = LazyLock::new(domain::<ExperimentStatus>);
pub static ROLE_STATUSES: LazyLock<HashSet<&str>> = LazyLock::new(domain::<RoleStatus>);
pub static PRIORITIES: LazyLock<HashSet<&str>> = LazyLock::new(domain::<Priority>);
pub static TASK_CATEGORIES: LazyLock<HashSet<&str>> = LazyLock::new(domain::<TaskCategory>);
pub static EXPERIMENT_CATEGORIES: LazyLock<HashSet<&str>> = LazyLock::new(domain::<ExperimentCategory>);

// ── Synonym maps ─────────────────────────────────────────────

pub static TASK_STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("done", "completed"),
        ("complete", "completed"),
        ("finished", "completed"),
        ("closed", "completed"),
        ("resolved", "completed"),
        ("wip", "in_progress"),
        ("in-progress", "in_progress"),
        ("inprogress", "in_progress"),
        ("working", "in_progress"),
        ("doing", "in_progress"),
        ("started", "in_progress"),
        ("active", "in_progress"),
        ("new", "todo"),
        ("open", "todo"),
        ("pending", "todo"),
        ("backlog", "todo"),
        ("to-do", "todo"),
        ("reviewing", "review"),
        ("qa", "review"),
        ("in_review", "review"),
        ("canceled", "cancelled"),
        ("dropped", "cancelled"),
        ("wontfix", "cancelled"),
    ]
    .into_iter()
    .collect()
});

pub static EXPERIMENT_STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("planning", "planned"),
        ("draft", "planned"),
        ("proposed", "planned"),
        ("active", "running"),
        ("in_progress", "running"),
        ("in-progress", "running"),
        ("wip", "running"),
        ("ongoing", "running"),
        ("started", "running"),
        ("analysis", "analyzing"),
        ("analysing", "analyzing"),
        ("evaluating", "analyzing"),
        ("done", "completed"),
        ("finished", "completed"),
        ("concluded", "completed"),
        ("cancelled", "abandoned"),
        ("canceled", "abandoned"),
        ("dropped", "abandoned"),
        ("failed", "abandoned"),
    ]
    .into_iter()
    .collect()
});

pub static ROLE_STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("enabled", "active"),
        ("on", "active"),
        ("disabled", "inactive"),
        ("off", "inactive"),
        ("archived", "inactive"),
    ]
    .into_iter()
    .collect()
});

/// Priority synonyms. P-notation runs P0 (most urgent) to P3.
pub static PRIORITY_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("critical", "urgent"),
        ("crit", "urgent"),
        ("highest", "urgent"),
        ("blocker", "urgent"),
        ("p0", "urgent"),
        ("important", "high"),
        ("p1", "high"),
        ("normal", "medium"),
        ("default", "medium"),
        ("med", "medium"),
        ("p2", "medium"),
        ("minor", "low"),
        ("lowest", "low"),
        ("trivial", "low"),
        ("p3", "low"),
    ]
    .into_iter()
    .collect()
});

pub static TASK_CATEGORY_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("dev", "development"),
        ("engineering", "development"),
        ("code", "development"),
        ("ux", "design"),
        ("ui", "design"),
        ("sales", "marketing"),
        ("ops", "operations"),
        ("r&d", "research"),
        ("rnd", "research"),
        ("customer", "support"),
        ("admin", "administrative"),
        ("billing", "administrative"),
    ]
    .into_iter()
    .collect()
});

pub static EXPERIMENT_CATEGORY_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("sw", "software"),
        ("code", "software"),
        ("material", "materials"),
        ("proto", "prototype"),
        ("manufacturing", "process"),
        ("feature", "product"),
    ]
    .into_iter()
    .collect()
});

/// Resolve `input` against a valid set and synonym map.
///
/// Returns the canonical value, or the closest suggestion on failure.
fn resolve(
    input: &str,
    valid: &HashSet<&'static str>,
    synonyms: &HashMap<&'static str, &'static str>,
) -> std::result::Result<&'static str, Option<String>> {
    let lower = input.trim().to_lowercase();

    // Tier 1: exact match
    if let Some(&canonical) = valid.get(lower.as_str()) {
        return Ok(canonical);
    }

    // Tier 2: synonym lookup
    if let Some(&canonical) = synonyms.get(lower.as_str()) {
        return Ok(canonical);
    }

    // Tier 3: find closest suggestion
    Err(find_closest_match(&lower, valid, synonyms))
}

/// Canonical status string for an entity kind.
pub fn canonical_status(kind: EntityKind, input: &str) -> Result<&'static str> {
    let (valid, synonyms) = match kind {
        EntityKind::Task => (&*TASK_STATUSES, &*TASK_STATUS_SYNONYMS),
        EntityKind::Experiment => (&*EXPERIMENT_STATUSES, &*EXPERIMENT_STATUS_SYNONYMS),
        EntityKind::Role => (&*ROLE_STATUSES, &*ROLE_STATUS_SYNONYMS),
    };
    resolve(input, valid, synonyms).map_err(|suggestion| Error::InvalidStatus {
        kind: kind.as_str(),
        value: input.to_string(),
        suggestion,
    })
}

/// Canonical priority string.
pub fn canonical_priority(input: &str) -> Result<&'static str> {
    resolve(input, &PRIORITIES, &PRIORITY_SYNONYMS).map_err(|suggestion| Error::InvalidPriority {
        value: input.to_string(),
        suggestion,
    })
}

/// Canonical category string for an entity kind. Roles have no categories.
pub fn canonical_category(kind: EntityKind, input: &str) -> Result<&'static str> {
    let (valid, synonyms) = match kind {
        EntityKind::Task => (&*TASK_CATEGORIES, &*TASK_CATEGORY_SYNONYMS),
        EntityKind::Experiment => (&*EXPERIMENT_CATEGORIES, &*EXPERIMENT_CATEGORY_SYNONYMS),
        EntityKind::Role => {
            return Err(Error::InvalidArgument("roles have no categories".to_string()));
        }
    };
    resolve(input, valid, synonyms).map_err(|suggestion| Error::InvalidCategory {
        kind: kind.as_str(),
        value: input.to_string(),
        suggestion,
    })
}

pub fn parse_task_status(input: &str) -> Result<TaskStatus> {
    let canonical = canonical_status(EntityKind::Task, input)?;
    TaskStatus::parse(canonical).ok_or_else(|| Error::Other(format!("unmapped task status {canonical}")))
}

pub fn parse_experiment_status(input: &str) -> Result<ExperimentStatus> {
    let canonical = canonical_status(EntityKind::Experiment, input)?;
    ExperimentStatus::parse(canonical)
        .ok_or_else(|| Error::Other(format!("unmapped experiment status {canonical}")))
}

pub fn parse_role_status(input: &str) -> Result<RoleStatus> {
    let canonical = canonical_status(EntityKind::Role, input)?;
    RoleStatus::parse(canonical).ok_or_else(|| Error::Other(format!("unmapped role status {canonical}")))
}

/// Parse a calendar date relative to `today`.
///
/// Accepts `YYYY-MM-DD`, `today`, `yesterday`, `tomorrow`, and day offsets
/// such as `-7d` or `+14d`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let lower = input.trim().to_lowercase();

    match lower.as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        "tomorrow" => return Ok(today + Duration::days(1)),
        _ => {}
    }

    if let Some(days) = lower
        .strip_suffix('d')
        .filter(|s| s.starts_with('+') || s.starts_with('-'))
        .and_then(|s| s.parse::<i64>().ok())
    {
        return Duration::try_days(days)
            .and_then(|delta| today.checked_add_signed(delta))
            .ok_or_else(|| Error::InvalidDate(input.to_string()));
    }

    NaiveDate::parse_from_str(&lower, "%Y-%m-%d").map_err(|_| Error::InvalidDate(input.to_string()))
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            // For synonyms, show what it maps to
            let shown = synonyms.get(v).copied().unwrap_or(v);
            best = Some((shown, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find existing IDs similar to the searched ID.
///
/// Returns up to `max` suggestions with edit distance ≤ 3,
/// sorted by distance then alphabetically.
pub fn find_similar_ids<'a, I>(searched: &str, existing: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut candidates: Vec<(usize, &str)> = existing
        .into_iter()
        .map(|id| (levenshtein_distance(searched, id), id))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_task_status() {
        assert_eq!(canonical_status(EntityKind::Task, "todo").unwrap(), "todo");
        assert_eq!(canonical_status(EntityKind::Task, "done").unwrap(), "completed");
        assert_eq!(canonical_status(EntityKind::Task, "in-progress").unwrap(), "in_progress");
        assert_eq!(canonical_status(EntityKind::Task, "REVIEW").unwrap(), "review");
        assert!(canonical_status(EntityKind::Task, "nonsense").is_err());
    }

    #[test]
    fn test_status_synonyms_differ_by_kind() {
        assert_eq!(canonical_status(EntityKind::Task, "active").unwrap(), "in_progress");
        assert_eq!(canonical_status(EntityKind::Experiment, "active").unwrap(), "running");
        assert_eq!(canonical_status(EntityKind::Role, "disabled").unwrap(), "inactive");
        assert_eq!(canonical_status(EntityKind::Experiment, "cancelled").unwrap(), "abandoned");
    }

    #[test]
    fn test_status_suggestion() {
        match canonical_status(EntityKind::Task, "reveiw") {
            Err(Error::InvalidStatus { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("review"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_canonical_priority() {
        assert_eq!(canonical_priority("high").unwrap(), "high");
        assert_eq!(canonical_priority("P0").unwrap(), "urgent");
        assert_eq!(canonical_priority("critical").unwrap(), "urgent");
        assert_eq!(canonical_priority("normal").unwrap(), "medium");
        assert!(matches!(canonical_priority("whenever"), Err(Error::InvalidPriority { .. })));
    }

    #[test]
    fn test_canonical_category() {
        assert_eq!(canonical_category(EntityKind::Task, "ops").unwrap(), "operations");
        assert_eq!(canonical_category(EntityKind::Experiment, "proto").unwrap(), "prototype");
        assert!(canonical_category(EntityKind::Role, "anything").is_err());
        assert!(matches!(
            canonical_category(EntityKind::Task, "astrology"),
            Err(Error::InvalidCategory { .. })
        ));
    }

    #[test]
    fn test_parse_typed_statuses() {
        assert_eq!(parse_task_status("wip").unwrap(), TaskStatus::InProgress);
        assert_eq!(parse_experiment_status("concluded").unwrap(), ExperimentStatus::Completed);
        assert_eq!(parse_role_status("active").unwrap(), RoleStatus::Active);
    }

    #[test]
    fn test_parse_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(parse_date("yesterday", today).unwrap(), NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        assert_eq!(parse_date("-7d", today).unwrap(), NaiveDate::from_ymd_opt(2024, 5, 29).unwrap());
        assert_eq!(parse_date("+30d", today).unwrap(), NaiveDate::from_ymd_opt(2024, 7, 5).unwrap());
        assert_eq!(parse_date("2024-01-31", today).unwrap(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert!(matches!(parse_date("someday", today), Err(Error::InvalidDate(_))));
        assert!(parse_date("7d", today).is_err());
    }

    #[test]
    fn test_parse_date_out_of_range_offset() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert!(matches!(parse_date("+999999999999999d", today), Err(Error::InvalidDate(_))));
        assert!(matches!(parse_date("-999999999d", today), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar_ids() {
        let ids = ["task_a1b2", "task_a1b3", "exp_xxxx"];
        let result = find_similar_ids("task_a1b1", ids, 3);
        assert_eq!(result, vec!["task_a1b2".to_string(), "task_a1b3".to_string()]);
    }
}
