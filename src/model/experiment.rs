//! R&D experiment log entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::priority::Priority;
use super::record::{DateField, Effort, EntityKind, Enumeration, Record, TextField};
use super::time::{clamp_progress, clamped_progress, default_progress, lenient, lenient_date, lenient_opt, now};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    #[default]
    Planned,
    #[serde(alias = "in_progress", alias = "in-progress")]
    Running,
    Analyzing,
    Completed,
    #[serde(alias = "cancelled")]
    Abandoned,
}

impl ExperimentStatus {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.iter().copied().find(|v| v.as_str() == lower)
    }
}

impl Enumeration for ExperimentStatus {
    const ALL: &'static [Self] = &[
        Self::Planned,
        Self::Running,
        Self::Analyzing,
        Self::Completed,
        Self::Abandoned,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Running => "running",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }

    fn is_completion(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Area of research an experiment belongs to (drives credit reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentCategory {
    Product,
    Process,
    Software,
    Materials,
    Prototype,
}

impl Enumeration for ExperimentCategory {
    const ALL: &'static [Self] = &[
        Self::Product,
        Self::Process,
        Self::Software,
        Self::Materials,
        Self::Prototype,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Process => "process",
            Self::Software => "software",
            Self::Materials => "materials",
            Self::Prototype => "prototype",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: String,

    pub title: String,

    /// What the experiment sets out to show
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub hypothesis: Option<String>,

    /// Running log of observations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub status: ExperimentStatus,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ExperimentCategory>,

    #[serde(default)]
    pub researcher_ids: Vec<String>,

    #[serde(default)]
    pub researcher_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Planned end date; overdue once passed without completion
    #[serde(default, with = "lenient_date", alias = "dueDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(
        default,
        with = "lenient_opt",
        alias = "completedDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default = "default_progress", deserialize_with = "clamped_progress")]
    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    #[serde(default, alias = "actualHours", skip_serializing_if = "Option::is_none")]
    pub time_spent_hours: Option<f64>,

    /// Whether the work qualifies for the R&D tax credit
    #[serde(default)]
    pub qualifies_for_credit: bool,

    #[serde(default = "now", with = "lenient")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "now", with = "lenient")]
    pub updated_at: DateTime<Utc>,
}

impl Experiment {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        let id = format!("exp_{}", &uuid::Uuid::new_v4().to_string()[..12]);

        Self {
            id,
            title: title.into(),
            hypothesis: None,
            notes: None,
            status: ExperimentStatus::Planned,
            priority: Priority::Medium,
            category: None,
            researcher_ids: Vec::new(),
            researcher_names: Vec::new(),
            project_id: None,
            tags: Vec::new(),
            start_date: None,
            end_date: None,
            completed_at: None,
            progress: 0,
            estimated_hours: None,
            time_spent_hours: None,
            qualifies_for_credit: false,
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
    pub fn with_hypothesis(mut self, hypothesis: &str) -> Self {
        self.hypothesis = Some(hypothesis.to_string());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: ExperimentCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn qualified(mut self, qualifies: bool) -> Self {
        self.qualifies_for_credit = qualifies;
        self
    }

    #[must_use]
    pub fn with_hours(mut self, estimated: f64, spent: f64) -> Self {
        self.estimated_hours = Some(estimated);
        self.time_spent_hours = Some(spent);
        self
    }

    /// Same completion rule as tasks: `completed` pins progress and stamps once.
    pub fn set_status(&mut self, status: ExperimentStatus, at: DateTime<Utc>) {
        self.status = status;
        if status.is_completion() {
            self.progress = 100;
            if self.completed_at.is_none() {
                self.completed_at = Some(at);
            }
        }
        self.updated_at = at;
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = clamp_progress(progress);
    }
}

impl Record for Experiment {
    type Status = ExperimentStatus;
    type Priority = Priority;

    const KIND: EntityKind = EntityKind::Experiment;

    fn id(&self) -> &str {
        &self.id
    }

    fn text_fields(&self) -> Vec<(TextField, &str)> {
        let mut fields = vec![(TextField::Title, self.title.as_str())];
        if let Some(ref h) = self.hypothesis {
            fields.push((TextField::Description, h.as_str()));
        }
        if let Some(ref n) = self.notes {
            fields.push((TextField::Notes, n.as_str()));
        }
        fields.extend(self.tags.iter().map(|t| (TextField::Tags, t.as_str())));
        fields.extend(
            self.researcher_names
                .iter()
                .map(|n| (TextField::Assignees, n.as_str())),
        );
        fields
    }

    fn status(&self) -> Option<ExperimentStatus> {
        Some(self.status)
    }

    fn priority(&self) -> Option<Priority> {
        Some(self.priority)
    }

    fn category(&self) -> Option<&'static str> {
        self.category.as_ref().map(Enumeration::as_str)
    }

    fn assignees(&self) -> &[String] {
        &self.researcher_ids
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
            DateField::Due => self.end_date,
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
            actual: self.time_spent_hours.unwrap_or(0.0),
        }
    }

    fn flag(&self) -> Option<bool> {
        Some(self.qualifies_for_credit)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}
