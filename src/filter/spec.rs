//! Filter specification.
//!
//! A sparse set of criteria: every field is optional and an absent field
//! places no constraint on records. The specification is plain data. The
//! view that owns it mutates one key at a time with [`FilterUpdate`] and
//! passes it by reference into the engine.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::time::lenient_date;
use crate::model::{DateField, TextField};

/// Inclusive calendar-date window over one date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default)]
    pub field: DateField,

    #[serde(default, with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    #[serde(default, with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub fn new(field: DateField, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { field, start, end }
    }

    /// A range whose start lies after its end matches nothing.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }
}

/// Active filter criteria for one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    #[serde(alias = "search", alias = "searchTerm", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_fields: Option<BTreeSet<TextField>>,

    #[serde(alias = "status", skip_serializing_if = "Option::is_none")]
    pub statuses: Option<BTreeSet<String>>,

    #[serde(alias = "priority", skip_serializing_if = "Option::is_none")]
    pub priorities: Option<BTreeSet<String>>,

    #[serde(alias = "category", skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeSet<String>>,

    #[serde(alias = "assignee", alias = "assignedTo", skip_serializing_if = "Option::is_none")]
    pub assignees: Option<BTreeSet<String>>,

    #[serde(alias = "project", skip_serializing_if = "Option::is_none")]
    pub projects: Option<BTreeSet<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,

    #[serde(alias = "qualified", skip_serializing_if = "Option::is_none")]
    pub flag: Option<bool>,
}

/// Names of the individual filter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Query,
    SearchFields,
    Statuses,
    Priorities,
    Categories,
    Assignees,
    Projects,
    Tags,
    DateRange,
    Flag,
}

impl FilterKey {
    pub const ALL: &'static [Self] = &[
        Self::Query,
        Self::SearchFields,
        Self::Statuses,
        Self::Priorities,
        Self::Categories,
        Self::Assignees,
        Self::Projects,
        Self::Tags,
        Self::DateRange,
        Self::Flag,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::SearchFields => "searchFields",
            Self::Statuses => "statuses",
            Self::Priorities => "priorities",
            Self::Categories => "categories",
            Self::Assignees => "assignees",
            Self::Projects => "projects",
            Self::Tags => "tags",
            Self::DateRange => "dateRange",
            Self::Flag => "flag",
        }
    }

    /// Parse a key name. Unknown names return `None` rather than an error.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_lowercase().replace(['_', '-'], "");
        match lower.as_str() {
            "query" | "search" | "searchterm" => Some(Self::Query),
            "searchfields" | "searchin" => Some(Self::SearchFields),
            "status" | "statuses" => Some(Self::Statuses),
            "priority" | "priorities" => Some(Self::Priorities),
            "category" | "categories" => Some(Self::Categories),
            "assignee" | "assignees" | "assignedto" => Some(Self::Assignees),
            "project" | "projects" => Some(Self::Projects),
            "tag" | "tags" => Some(Self::Tags),
            "daterange" | "dates" => Some(Self::DateRange),
            "flag" | "qualified" => Some(Self::Flag),
            _ => None,
        }
    }
}

/// A single-key change to a [`FilterSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    Query(String),
    SearchFields(BTreeSet<TextField>),
    Statuses(BTreeSet<String>),
    Priorities(BTreeSet<String>),
    Categories(BTreeSet<String>),
    Assignees(BTreeSet<String>),
    Projects(BTreeSet<String>),
    Tags(Vec<String>),
    DateRange(DateRange),
    Flag(Option<bool>),
    Clear(FilterKey),
}

fn non_empty_set<T: Ord>(set: BTreeSet<T>) -> Option<BTreeSet<T>> {
    if set.is_empty() { None } else { Some(set) }
}

impl FilterSpec {
    /// An empty specification: matches every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a specification from JSON, ignoring keys it does not know.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a known key has the wrong shape.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::InvalidArgument(format!("invalid filter specification: {e}")))
    }

    /// Whether the given key currently constrains anything.
    #[must_use]
    pub fn is_set(&self, key: FilterKey) -> bool {
        match key {
            FilterKey::Query => self.query.as_deref().is_some_and(|q| !q.trim().is_empty()),
            FilterKey::SearchFields => self.search_fields.as_ref().is_some_and(|s| !s.is_empty()),
            FilterKey::Statuses => self.statuses.as_ref().is_some_and(|s| !s.is_empty()),
            FilterKey::Priorities => self.priorities.as_ref().is_some_and(|s| !s.is_empty()),
            FilterKey::Categories => self.categories.as_ref().is_some_and(|s| !s.is_empty()),
            FilterKey::Assignees => self.assignees.as_ref().is_some_and(|s| !s.is_empty()),
            FilterKey::Projects => self.projects.as_ref().is_some_and(|s| !s.is_empty()),
            FilterKey::Tags => self.tags.as_ref().is_some_and(|t| !t.is_empty()),
            FilterKey::DateRange => self.date_range.is_some(),
            FilterKey::Flag => self.flag.is_some(),
        }
    }

    /// Number of keys that constrain results ("3 filters active").
    ///
    /// `searchFields` only scopes the query and is not counted on its own.
    #[must_use]
    pub fn active_count(&self) -> usize {
        FilterKey::ALL
            .iter()
            .filter(|k| **k != FilterKey::SearchFields && self.is_set(**k))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Apply one single-key change. Empty values clear the key.
    pub fn update(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::Query(q) => {
                self.query = if q.trim().is_empty() { None } else { Some(q) };
            }
            FilterUpdate::SearchFields(f) => self.search_fields = non_empty_set(f),
            FilterUpdate::Statuses(s) => self.statuses = non_empty_set(s),
            FilterUpdate::Priorities(s) => self.priorities = non_empty_set(s),
            FilterUpdate::Categories(s) => self.categories = non_empty_set(s),
            FilterUpdate::Assignees(s) => self.assignees = non_empty_set(s),
            FilterUpdate::Projects(s) => self.projects = non_empty_set(s),
            FilterUpdate::Tags(t) => {
                self.tags = if t.is_empty() { None } else { Some(t) };
            }
            FilterUpdate::DateRange(r) => {
                self.date_range = if r.start.is_none() && r.end.is_none() { None } else { Some(r) };
            }
            FilterUpdate::Flag(f) => self.flag = f,
            FilterUpdate::Clear(key) => self.clear(key),
        }
    }

    /// Builder form of [`FilterSpec::update`].
    #[must_use]
    pub fn with(mut self, update: FilterUpdate) -> Self {
        self.update(update);
        self
    }

    /// Remove one key.
    pub fn clear(&mut self, key: FilterKey) {
        match key {
            FilterKey::Query => self.query = None,
            FilterKey::SearchFields => self.search_fields = None,
            FilterKey::Statuses => self.statuses = None,
            FilterKey::Priorities => self.priorities = None,
            FilterKey::Categories => self.categories = None,
            FilterKey::Assignees => self.assignees = None,
            FilterKey::Projects => self.projects = None,
            FilterKey::Tags => self.tags = None,
            FilterKey::DateRange => self.date_range = None,
            FilterKey::Flag => self.flag = None,
        }
    }

    /// "Clear all".
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }
}

/// Collect string values into a filter set.
pub fn set_of<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_spec_is_empty() {
        let spec = FilterSpec::new();
        assert!(spec.is_empty());
        assert_eq!(spec.active_count(), 0);
    }

    #[test]
    fn test_single_key_updates() {
        let mut spec = FilterSpec::new();
        spec.update(FilterUpdate::Query("report".to_string()));
        spec.update(FilterUpdate::Statuses(set_of(["todo", "review"])));
        spec.update(FilterUpdate::Flag(Some(true)));
        assert_eq!(spec.active_count(), 3);

        spec.update(FilterUpdate::Clear(FilterKey::Statuses));
        assert_eq!(spec.active_count(), 2);
        assert!(spec.statuses.is_none());

        spec.clear_all();
        assert!(spec.is_empty());
        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn test_empty_values_clear_key() {
        let mut spec = FilterSpec::new()
            .with(FilterUpdate::Query("x".to_string()))
            .with(FilterUpdate::Tags(vec!["a".to_string()]));

        spec.update(FilterUpdate::Query("  ".to_string()));
        spec.update(FilterUpdate::Tags(Vec::new()));
        spec.update(FilterUpdate::Priorities(BTreeSet::new()));
        spec.update(FilterUpdate::DateRange(DateRange::default()));

        assert!(spec.is_empty());
        assert!(spec.query.is_none());
        assert!(spec.tags.is_none());
        assert!(spec.date_range.is_none());
    }

    #[test]
    fn test_search_fields_alone_not_active() {
        let spec = FilterSpec::new().with(FilterUpdate::SearchFields([TextField::Title].into_iter().collect()));
        assert!(spec.is_empty());
    }

    #[test]
    fn test_from_json_ignores_unknown_keys() {
        let spec = FilterSpec::from_json(serde_json::json!({
            "search": "grant",
            "status": ["running"],
            "qualified": true,
            "dateRange": { "field": "start", "start": "2024-01-01" },
            "viewMode": "kanban"
        }))
        .unwrap();

        assert_eq!(spec.query.as_deref(), Some("grant"));
        assert_eq!(spec.statuses, Some(set_of(["running"])));
        assert_eq!(spec.flag, Some(true));
        let range = spec.date_range.unwrap();
        assert_eq!(range.field, DateField::Start);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(range.end.is_none());
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let result = FilterSpec::from_json(serde_json::json!({ "flag": "maybe" }));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_filter_key_parse() {
        assert_eq!(FilterKey::parse("date_range"), Some(FilterKey::DateRange));
        assert_eq!(FilterKey::parse("assignedTo"), Some(FilterKey::Assignees));
        assert_eq!(FilterKey::parse("layout"), None);
    }

    #[test]
    fn test_reversed_range() {
        let r = DateRange::new(DateField::Due, NaiveDate::from_ymd_opt(2024, 2, 1), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(r.is_reversed());
        assert!(!DateRange::default().is_reversed());
    }
}
