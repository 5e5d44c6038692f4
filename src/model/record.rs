//! The accessor table shared by every filterable entity.
//!
//! The filter engine and the aggregator never look at `Task`, `Experiment`
//! or `Role` directly. Each entity implements [`Record`], exposing the fields
//! the predicates understand; anything an entity lacks falls back to the
//! trait's defaults (no value), which predicates treat as "does not match"
//! whenever a criterion is active.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A closed set of values (status, priority, category).
///
/// `ALL` lists every value of the domain in display order, so that
/// summaries can report zero counts for values nothing currently holds.
pub trait Enumeration: Copy + Eq + 'static {
    /// Every value of the domain, in display order.
    const ALL: &'static [Self];

    /// Canonical storage string.
    fn as_str(&self) -> &'static str;

    /// Whether no further progress transitions are expected from this value.
    fn is_terminal(&self) -> bool {
        false
    }

    /// Whether this value means the work finished successfully.
    fn is_completion(&self) -> bool {
        false
    }
}

/// Priority domain for entities that are never ranked (roles).
///
/// Uninhabited: summaries of such entities carry an empty priority map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unranked {}

impl Enumeration for Unranked {
    const ALL: &'static [Self] = &[];

    fn as_str(&self) -> &'static str {
        match *self {}
    }
}

/// Which kind of entity a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Task,
    Experiment,
    Role,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Experiment => "experiment",
            Self::Role => "role",
        }
    }
}

/// Free-text fields a search query can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    Description,
    Notes,
    Tags,
    Assignees,
}

impl TextField {
    pub const ALL: &'static [Self] = &[
        Self::Title,
        Self::Description,
        Self::Notes,
        Self::Tags,
        Self::Assignees,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Notes => "notes",
            Self::Tags => "tags",
            Self::Assignees => "assignees",
        }
    }

    /// Parse a field name; `name` is accepted for `title`, `hypothesis` for `description`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "title" | "name" => Some(Self::Title),
            "description" | "desc" | "hypothesis" => Some(Self::Description),
            "notes" | "note" => Some(Self::Notes),
            "tags" | "tag" | "labels" => Some(Self::Tags),
            "assignees" | "assignee" | "researchers" | "people" => Some(Self::Assignees),
            _ => None,
        }
    }
}

/// Date-bearing fields a date range can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    Start,
    #[default]
    Due,
    Completed,
    Created,
}

impl DateField {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Due => "due",
            Self::Completed => "completed",
            Self::Created => "created",
        }
    }

    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "start" | "started" | "start_date" => Some(Self::Start),
            "due" | "end" | "due_date" | "end_date" => Some(Self::Due),
            "completed" | "done" | "completed_at" => Some(Self::Completed),
            "created" | "created_at" => Some(Self::Created),
            _ => None,
        }
    }
}

/// Estimated and actual effort, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Effort {
    pub estimated: f64,
    pub actual: f64,
}

/// Field accessors for a filterable, summarizable entity.
pub trait Record {
    type Status: Enumeration;
    type Priority: Enumeration;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Text-bearing fields, tagged with which field they came from.
    fn text_fields(&self) -> Vec<(TextField, &str)>;

    fn status(&self) -> Option<Self::Status>;

    fn priority(&self) -> Option<Self::Priority> {
        None
    }

    fn category(&self) -> Option<&'static str> {
        None
    }

    fn assignees(&self) -> &[String] {
        &[]
    }

    fn project_id(&self) -> Option<&str> {
        None
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    /// Calendar date of the given date field, if the entity records it.
    fn date(&self, field: DateField) -> Option<NaiveDate>;

    fn due_date(&self) -> Option<NaiveDate> {
        self.date(DateField::Due)
    }

    fn completed_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Progress percentage, for entities that track it.
    fn progress(&self) -> Option<u8> {
        None
    }

    fn effort(&self) -> Effort {
        Effort::default()
    }

    /// The entity's boolean flag (billable, credit-qualified, system role).
    fn flag(&self) -> Option<bool> {
        None
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Filtered views are slices of references; they summarize like the records.
impl<R: Record> Record for &R {
    type Status = R::Status;
    type Priority = R::Priority;

    const KIND: EntityKind = R::KIND;

    fn id(&self) -> &str {
        (**self).id()
    }

    fn text_fields(&self) -> Vec<(TextField, &str)> {
        (**self).text_fields()
    }

    fn status(&self) -> Option<Self::Status> {
        (**self).status()
    }

    fn priority(&self) -> Option<Self::Priority> {
        (**self).priority()
    }

    fn category(&self) -> Option<&'static str> {
        (**self).category()
    }

    fn assignees(&self) -> &[String] {
        (**self).assignees()
    }

    fn project_id(&self) -> Option<&str> {
        (**self).project_id()
    }

    fn tags(&self) -> &[String] {
        (**self).tags()
    }

    fn date(&self, field: DateField) -> Option<NaiveDate> {
        (**self).date(field)
    }

    fn due_date(&self) -> Option<NaiveDate> {
        (**self).due_date()
    }

    fn completed_at(&self) -> Option<DateTime<Utc>> {
        (**self).completed_at()
    }

    fn progress(&self) -> Option<u8> {
        (**self).progress()
    }

    fn effort(&self) -> Effort {
        (**self).effort()
    }

    fn flag(&self) -> Option<bool> {
        (**self).flag()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        (**self).created_at()
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        (**self).updated_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_parse() {
        assert_eq!(TextField::parse("Title"), Some(TextField::Title));
        assert_eq!(TextField::parse("hypothesis"), Some(TextField::Description));
        assert_eq!(TextField::parse("labels"), Some(TextField::Tags));
        assert_eq!(TextField::parse("body"), None);
    }

    #[test]
    fn test_date_field_parse() {
        assert_eq!(DateField::parse("end_date"), Some(DateField::Due));
        assert_eq!(DateField::parse("created"), Some(DateField::Created));
        assert_eq!(DateField::parse("whenever"), None);
        assert_eq!(DateField::default(), DateField::Due);
    }

    #[test]
    fn test_unranked_has_no_values() {
        assert!(Unranked::ALL.is_empty());
    }
}
