//! Task model for the task board.
//!
//! Tasks move across the board through a fixed status set. Completing a
//! task pins its progress to 100 and stamps the completion time once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::priority::Priority;
use super::record::{DateField, Effort, EntityKind, Enumeration, Record, TextField};
use super::time::{clamp_progress, clamped_progress, default_progress, lenient, lenient_date, lenient_opt, now};

/// Board columns a task can sit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    #[serde(alias = "in-progress")]
    InProgress,
    Review,
    Completed,
    Cancelled,
}

impl TaskStatus {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "review" => Some(Self::Review),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl Enumeration for TaskStatus {
    const ALL: &'static [Self] = &[
        Self::Todo,
        Self::InProgress,
        Self::Review,
        Self::Completed,
        Self::Cancelled,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    fn is_completion(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Development,
    Design,
    Marketing,
    Operations,
    Research,
    Support,
    Administrative,
}

impl Enumeration for TaskCategory {
    const ALL: &'static [Self] = &[
        Self::Development,
        Self::Design,
        Self::Marketing,
        Self::Operations,
        Self::Research,
        Self::Support,
        Self::Administrative,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Design => "design",
            Self::Marketing => "marketing",
            Self::Operations => "operations",
            Self::Research => "research",
            Self::Support => "support",
            Self::Administrative => "administrative",
        }
    }
}

/// A task on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, immutable once created
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,

    /// User IDs the task is assigned to
    #[serde(default)]
    pub assignee_ids: Vec<String>,

    /// Display names matching `assignee_ids` (searchable)
    #[serde(default)]
    pub assignee_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(
        default,
        with = "lenient_opt",
        alias = "completedDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,

    /// Percent complete, always within `0..=100`
    #[serde(default = "default_progress", deserialize_with = "clamped_progress")]
    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,

    #[serde(default)]
    pub billable: bool,

    #[serde(default = "now", with = "lenient")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "now", with = "lenient")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task in the `todo` column.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        let id = format!("task_{}", &uuid::Uuid::new_v4().to_string()[..12]);

        Self {
            id,
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            category: None,
            assignee_ids: Vec::new(),
            assignee_names: Vec::new(),
            project_id: None,
            tags: Vec::new(),
            start_date: None,
            due_date: None,
            completed_at: None,
            progress: 0,
            estimated_hours: None,
            actual_hours: None,
            billable: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.assignee_ids.push(id.into());
        self.assignee_names.push(name.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: TaskStatus, at: DateTime<Utc>) -> Self {
        self.set_status(status, at);
        self
    }

    /// Move the task to another column.
    ///
    /// Entering `completed` forces progress to 100 and stamps `completed_at`
    /// unless it is already set.
    pub fn set_status(&mut self, status: TaskStatus, at: DateTime<Utc>) {
        self.status = status;
        if status.is_completion() {
            self.progress = 100;
            if self.completed_at.is_none() {
                self.completed_at = Some(at);
            }
        }
        self.updated_at = at;
    }

    /// Set progress, clamped into `0..=100`.
    pub fn set_progress(&mut self, progress: f64) {
        self.progress = clamp_progress(progress);
    }
}

impl Record for Task {
    type Status = TaskStatus;
    type Priority = Priority;

    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn text_fields(&self) -> Vec<(TextField, &str)> {
        let mut fields = vec![(TextField::Title, self.title.as_str())];
        if let Some(ref desc) = self.description {
            fields.push((TextField::Description, desc.as_str()));
        }
        fields.extend(self.tags.iter().map(|t| (TextField::Tags, t.as_str())));
        fields.extend(
            self.assignee_names
                .iter()
                .map(|n| (TextField::Assignees, n.as_str())),
        );
        fields
    }

    fn status(&self) -> Option<TaskStatus> {
        Some(self.status)
    }

    fn priority(&self) -> Option<Priority> {
        Some(self.priority)
    }

    fn category(&self) -> Option<&'static str> {
        self.category.as_ref().map(Enumeration::as_str)
    }

    fn assignees(&self) -> &[String] {
        &self.assignee_ids
    }

    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn date(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Start => self.start_date,
            DateField::Due => self.due_date,
            DateField::Completed => self.completed_at.map(|ts| ts.date_naive()),
            DateField::Created => Some(self.created_at.date_naive()),
        }
    }

    fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    fn progress(&self) -> Option<u8> {
        Some(self.progress)
    }

    fn effort(&self) -> Effort {
        Effort {
            estimated: self.estimated_hours.unwrap_or(0.0),
            actual: self.actual_hours.unwrap_or(0.0),
        }
    }

    fn flag(&self) -> Option<bool> {
        Some(self.billable)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_new_task() {
        let task = Task::new("Write onboarding guide");

        assert!(task.id.starts_with("task_"));
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.progress, 0);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_complete_sets_progress_and_stamp() {
        let mut task = Task::new("Ship");
        task.set_progress(40.0);
        task.set_status(TaskStatus::Completed, at(3));

        assert_eq!(task.progress, 100);
        assert_eq!(task.completed_at, Some(at(3)));
        assert_eq!(task.updated_at, at(3));
    }

    #[test]
    fn test_complete_keeps_existing_stamp() {
        let mut task = Task::new("Ship").with_status(TaskStatus::Completed, at(1));
        task.set_status(TaskStatus::Review, at(2));
        task.set_status(TaskStatus::Completed, at(4));

        assert_eq!(task.completed_at, Some(at(1)));
    }

    #[test]
    fn test_non_terminal_status_leaves_progress() {
        let mut task = Task::new("Draft");
        task.set_progress(30.0);
        task.set_status(TaskStatus::Review, at(2));

        assert_eq!(task.progress, 30);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_progress_clamped() {
        let mut task = Task::new("Clamp");
        task.set_progress(180.0);
        assert_eq!(task.progress, 100);
        task.set_progress(-3.0);
        assert_eq!(task.progress, 0);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("Completed"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("done"), None);
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::Cancelled.is_completion());
    }

    #[test]
    fn test_deserialize_lenient_fields() {
        let json = r#"{
            "id": "1",
            "title": "Quarterly report",
            "status": "in-progress",
            "priority": "critical",
            "dueDate": "2024-01-01",
            "completedDate": "2024-06-01",
            "progress": 140,
            "createdAt": "2023-12-01"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(task.completed_at.map(|t| t.date_naive()), NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(task.progress, 100);
    }
}
