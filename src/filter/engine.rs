//! Filter engine.
//!
//! One pass over the records, keeping those for which every active
//! criterion holds. Output order is input order; sorting for display is a
//! separate step ([`sort_records`]).

use std::cmp::Ordering;

use crate::model::{Enumeration, Record};

use super::predicate::{any_in_set, any_tag_matches, date_in_range, flag_equals, in_set, text_matches};
use super::spec::FilterSpec;

/// Whether a single record satisfies every active criterion of `spec`.
pub fn matches<R: Record>(record: &R, spec: &FilterSpec) -> bool {
    if let Some(ref query) = spec.query {
        if !text_matches(record, query, spec.search_fields.as_ref()) {
            return false;
        }
    }

    if !in_set(record.status().map(|s| s.as_str()), spec.statuses.as_ref()) {
        return false;
    }
    if !in_set(record.priority().map(|p| p.as_str()), spec.priorities.as_ref()) {
        return false;
    }
    if !in_set(record.category(), spec.categories.as_ref()) {
        return false;
    }
    if !any_in_set(record.assignees(), spec.assignees.as_ref()) {
        return false;
    }
    if !in_set(record.project_id(), spec.projects.as_ref()) {
        return false;
    }
    if let Some(ref tags) = spec.tags {
        if !any_tag_matches(record.tags(), tags) {
            return false;
        }
    }
    if let Some(range) = spec.date_range {
        if !date_in_range(record.date(range.field), range.start, range.end) {
            return false;
        }
    }

    flag_equals(record.flag(), spec.flag)
}

/// Records matching `spec`, in input order.
pub fn apply<'a, R: Record>(records: &'a [R], spec: &FilterSpec) -> Vec<&'a R> {
    if let Some(range) = spec.date_range {
        if range.is_reversed() {
            tracing::warn!(
                field = range.field.as_str(),
                "date range start is after its end; no {} will match",
                R::KIND.as_str()
            );
        }
    }

    let matched: Vec<&R> = records.iter().filter(|r| matches(*r, spec)).collect();

    tracing::debug!(
        kind = R::KIND.as_str(),
        input = records.len(),
        matched = matched.len(),
        active_filters = spec.active_count(),
        "applied filter"
    );

    matched
}

/// Owned variant of [`apply`].
pub fn apply_owned<R: Record + Clone>(records: &[R], spec: &FilterSpec) -> Vec<R> {
    apply(records, spec).into_iter().cloned().collect()
}

/// Display orderings offered by the list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Priority,
    Status,
    Due,
    #[default]
    Created,
    Updated,
    Title,
}

impl SortKey {
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "priority" => Some(Self::Priority),
            "status" => Some(Self::Status),
            "due" | "duedate" | "enddate" => Some(Self::Due),
            "created" | "createdat" => Some(Self::Created),
            "updated" | "updatedat" => Some(Self::Updated),
            "title" | "name" => Some(Self::Title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

fn domain_rank<E: Enumeration>(value: Option<E>) -> Option<usize> {
    value.and_then(|v| E::ALL.iter().position(|x| *x == v))
}

/// Compare optional keys with missing values last in either direction.
fn cmp_present_first<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => match order {
            SortOrder::Asc => x.cmp(&y),
            SortOrder::Desc => y.cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort of filtered records for display.
pub fn sort_records<R: Record>(records: &mut [&R], key: SortKey, order: SortOrder) {
    records.sort_by(|a, b| match key {
        SortKey::Priority => cmp_present_first(domain_rank(a.priority()), domain_rank(b.priority()), order),
        SortKey::Status => cmp_present_first(domain_rank(a.status()), domain_rank(b.status()), order),
        SortKey::Due => cmp_present_first(a.due_date(), b.due_date(), order),
        SortKey::Created => cmp_present_first(a.created_at(), b.created_at(), order),
        SortKey::Updated => cmp_present_first(a.updated_at(), b.updated_at(), order),
        SortKey::Title => {
            let title = |r: &R| {
                r.text_fields()
                    .first()
                    .map(|(_, t)| t.to_lowercase())
            };
            cmp_present_first(title(*a), title(*b), order)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::spec::{set_of, DateRange, FilterUpdate};
    use crate::model::{DateField, Experiment, Priority, Role, Task, TaskCategory, TaskStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn board() -> Vec<Task> {
        let done_at = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        vec![
            Task::new("Renew insurance")
                .with_id("1")
                .with_priority(Priority::High)
                .with_category(TaskCategory::Administrative)
                .with_due_date(day(2024, 1, 1))
                .with_tags(["compliance"]),
            Task::new("Landing page copy")
                .with_id("2")
                .with_priority(Priority::Low)
                .with_category(TaskCategory::Marketing)
                .with_assignee("u7", "Sam Lee")
                .with_status(TaskStatus::Completed, done_at),
            Task::new("Fix intake form")
                .with_id("3")
                .with_priority(Priority::Urgent)
                .with_category(TaskCategory::Development)
                .with_due_date(day(2024, 6, 20))
                .with_assignee("u7", "Sam Lee")
                .with_tags(["client", "bug"]),
        ]
    }

    fn ids<R: Record>(records: &[&R]) -> Vec<String> {
        records.iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let tasks = board();
        let out = apply(&tasks, &FilterSpec::new());
        assert_eq!(ids(&out), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_records() {
        let tasks: Vec<Task> = Vec::new();
        let spec = FilterSpec::new().with(FilterUpdate::Query("x".to_string()));
        assert!(apply(&tasks, &spec).is_empty());
    }

    #[test]
    fn test_criteria_are_anded() {
        let tasks = board();
        let spec = FilterSpec::new()
            .with(FilterUpdate::Assignees(set_of(["u7"])))
            .with(FilterUpdate::Priorities(set_of(["urgent", "high"])));
        assert_eq!(ids(&apply(&tasks, &spec)), vec!["3"]);
    }

    #[test]
    fn test_status_and_category_sets() {
        let tasks = board();
        let spec = FilterSpec::new().with(FilterUpdate::Statuses(set_of(["todo"])));
        assert_eq!(ids(&apply(&tasks, &spec)), vec!["1", "3"]);

        let spec = FilterSpec::new().with(FilterUpdate::Categories(set_of(["marketing", "design"])));
        assert_eq!(ids(&apply(&tasks, &spec)), vec!["2"]);
    }

    #[test]
    fn test_output_is_ordered_subsequence() {
        let tasks = board();
        let spec = FilterSpec::new().with(FilterUpdate::Tags(vec!["CLIENT".to_string(), "compliance".to_string()]));
        let out = apply(&tasks, &spec);
        assert_eq!(ids(&out), vec!["1", "3"]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let tasks = board();
        let spec = FilterSpec::new()
            .with(FilterUpdate::Query("i".to_string()))
            .with(FilterUpdate::Statuses(set_of(["todo", "completed"])));

        let once = apply_owned(&tasks, &spec);
        let twice = apply_owned(&once, &spec);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_tag_filter_returns_all() {
        let tasks = board();
        let spec = FilterSpec {
            tags: Some(Vec::new()),
            ..FilterSpec::default()
        };
        assert_eq!(apply(&tasks, &spec).len(), 3);
    }

    #[test]
    fn test_date_range_on_due() {
        let tasks = board();
        let spec = FilterSpec::new().with(FilterUpdate::DateRange(DateRange::new(
            DateField::Due,
            Some(day(2024, 6, 1)),
            None,
        )));
        // Task 2 has no due date and is excluded
        assert_eq!(ids(&apply(&tasks, &spec)), vec!["3"]);
    }

    #[test]
    fn test_reversed_date_range_matches_nothing() {
        let tasks = board();
        let spec = FilterSpec::new().with(FilterUpdate::DateRange(DateRange::new(
            DateField::Due,
            Some(day(2024, 12, 1)),
            Some(day(2024, 1, 1)),
        )));
        assert!(apply(&tasks, &spec).is_empty());
    }

    #[test]
    fn test_flag_filter_on_experiments() {
        let exps = vec![
            Experiment::new("A").with_id("a").qualified(true),
            Experiment::new("B").with_id("b"),
        ];
        let spec = FilterSpec::new().with(FilterUpdate::Flag(Some(true)));
        assert_eq!(ids(&apply(&exps, &spec)), vec!["a"]);
    }

    #[test]
    fn test_roles_excluded_by_fields_they_lack() {
        let roles = vec![Role::new("Admin").with_id("r1")];
        let spec = FilterSpec::new().with(FilterUpdate::Priorities(set_of(["high"])));
        assert!(apply(&roles, &spec).is_empty());

        let spec = FilterSpec::new().with(FilterUpdate::Query("adm".to_string()));
        assert_eq!(ids(&apply(&roles, &spec)), vec!["r1"]);
    }

    #[test]
    fn test_unknown_status_value_matches_nothing() {
        let tasks = board();
        let spec = FilterSpec::new().with(FilterUpdate::Statuses(set_of(["archived"])));
        assert!(apply(&tasks, &spec).is_empty());
    }

    #[test]
    fn test_sort_by_priority_desc() {
        let tasks = board();
        let mut view = apply(&tasks, &FilterSpec::new());
        sort_records(&mut view, SortKey::Priority, SortOrder::Desc);
        assert_eq!(ids(&view), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_sort_by_due_puts_undated_last() {
        let tasks = board();
        let mut view = apply(&tasks, &FilterSpec::new());
        sort_records(&mut view, SortKey::Due, SortOrder::Asc);
        assert_eq!(ids(&view), vec!["1", "3", "2"]);
        sort_records(&mut view, SortKey::Due, SortOrder::Desc);
        assert_eq!(ids(&view), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("dueDate"), Some(SortKey::Due));
        assert_eq!(SortKey::parse("created_at"), Some(SortKey::Created));
        assert_eq!(SortKey::parse("random"), None);
    }
}
