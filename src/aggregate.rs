//! Dashboard aggregates.
//!
//! [`summarize`] computes every headline number a view shows in one pass
//! over whatever collection the caller hands it (filtered or not). The
//! result is a fresh snapshot; nothing is cached or patched incrementally.

use chrono::{DateTime, Duration, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::model::{EntityKind, Enumeration, Record};

/// Trailing window for "completed recently", in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Tunables for [`summarize_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Length of the trailing completion window ending at `now`
    pub window: Duration,
}

impl SummaryOptions {
    /// Window of `days` days. Negative values mean an empty window; values
    /// past the representable range saturate.
    #[must_use]
    pub fn days(days: i64) -> Self {
        Self {
            window: Duration::try_days(days.max(0)).unwrap_or(Duration::MAX),
        }
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self::days(DEFAULT_WINDOW_DAYS)
    }
}

/// Per-value counts over a closed domain, in domain order.
///
/// Every domain value is present, including those with a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Counts(Vec<(&'static str, usize)>);

impl Counts {
    fn zeroed<E: Enumeration>() -> Self {
        Self(E::ALL.iter().map(|v| (v.as_str(), 0)).collect())
    }

    fn bump<E: Enumeration>(&mut self, value: E) {
        if let Some(slot) = E::ALL.iter().position(|v| *v == value) {
            self.0[slot].1 += 1;
        }
    }

    /// Count for one value; values outside the domain report zero.
    #[must_use]
    pub fn get(&self, value: &str) -> usize {
        self.0
            .iter()
            .find(|(k, _)| *k == value)
            .map_or(0, |(_, n)| *n)
    }

    #[must_use]
    pub fn sum(&self) -> usize {
        self.0.iter().map(|(_, n)| n).sum()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.0.iter().map(|(k, _)| *k).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Counts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in &self.0 {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Read-only snapshot of a record collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub kind: EntityKind,
    pub total: usize,
    pub by_status: Counts,
    pub by_priority: Counts,
    /// Due before today and not in a terminal status
    pub overdue: usize,
    /// Terminal and completed within the trailing window
    pub completed_in_window: usize,
    pub window_days: i64,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    /// Records whose flag is set (billable / credit-qualified / system)
    pub flagged: usize,
    /// Mean progress over records that track progress
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_progress: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

/// Summarize with the default seven-day completion window.
pub fn summarize<R: Record>(records: &[R], now: DateTime<Utc>) -> Summary {
    summarize_with(records, now, &SummaryOptions::default())
}

/// Summarize with explicit options.
pub fn summarize_with<R: Record>(records: &[R], now: DateTime<Utc>, options: &SummaryOptions) -> Summary {
    let today = now.date_naive();
    // A window reaching past the earliest representable instant is unbounded
    let window_start = now
        .checked_sub_signed(options.window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut by_status = Counts::zeroed::<R::Status>();
    let mut by_priority = Counts::zeroed::<R::Priority>();
    let mut overdue = 0;
    let mut completed_in_window = 0;
    let mut estimated_hours = 0.0;
    let mut actual_hours = 0.0;
    let mut flagged = 0;
    let mut progress_sum: u64 = 0;
    let mut progress_count: u32 = 0;

    for record in records {
        let status = record.status();
        let terminal = status.is_some_and(|s| s.is_terminal());

        if let Some(s) = status {
            by_status.bump(s);
        }
        if let Some(p) = record.priority() {
            by_priority.bump(p);
        }

        if !terminal && record.due_date().is_some_and(|due| due < today) {
            overdue += 1;
        }

        if terminal
            && record
                .completed_at()
                .is_some_and(|at| at >= window_start && at <= now)
        {
            completed_in_window += 1;
        }

        let effort = record.effort();
        estimated_hours += effort.estimated;
        actual_hours += effort.actual;

        if record.flag() == Some(true) {
            flagged += 1;
        }

        if let Some(p) = record.progress() {
            progress_sum += u64::from(p);
            progress_count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let average_progress = (progress_count > 0).then(|| progress_sum as f64 / f64::from(progress_count));

    Summary {
        kind: R::KIND,
        total: records.len(),
        by_status,
        by_priority,
        overdue,
        completed_in_window,
        window_days: options.window.num_days(),
        estimated_hours,
        actual_hours,
        flagged,
        average_progress,
        generated_at: now,
    }
}
