//! Build a [`FilterSpec`] from command-line flags.
//!
//! Flag values go through `validate` so synonyms and typos are resolved
//! (or rejected with a suggestion) before the engine sees them. Values in
//! a `--filter` JSON base are taken as given.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::cli::FilterArgs;
use crate::error::{Error, Result};
use crate::filter::{DateRange, FilterSpec, FilterUpdate};
use crate::model::{DateField, EntityKind, TextField};
use crate::validate::{canonical_category, canonical_priority, canonical_status, parse_date};

/// Resolve a pair of mutually exclusive yes/no flags.
pub fn flag_choice(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn canonical_set(
    values: &[String],
    resolve: impl Fn(&str) -> Result<&'static str>,
) -> Result<BTreeSet<String>> {
    values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| resolve(v).map(str::to_string))
        .collect()
}

fn raw_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the filter for `kind` from the shared flags.
///
/// # Errors
///
/// Returns a validation error for unknown statuses, priorities, categories,
/// search fields, date fields or unparseable dates, and
/// [`Error::InvalidArgument`] for a malformed `--filter` document.
pub fn build_spec(kind: EntityKind, args: &FilterArgs, today: NaiveDate) -> Result<FilterSpec> {
    let mut spec = match &args.filter {
        Some(text) => {
            let value: serde_json::Value = serde_json::from_str(text)
                .map_err(|e| Error::InvalidArgument(format!("--filter is not valid JSON: {e}")))?;
            FilterSpec::from_json(value)?
        }
        None => FilterSpec::new(),
    };

    if let Some(query) = &args.search {
        spec.update(FilterUpdate::Query(query.clone()));
    }

    if !args.search_in.is_empty() {
        let fields = args
            .search_in
            .iter()
            .map(|f| {
                TextField::parse(f).ok_or_else(|| {
                    let valid: Vec<&str> = TextField::ALL.iter().map(TextField::as_str).collect();
                    Error::InvalidArgument(format!(
                        "unknown search field '{f}' (valid: {})",
                        valid.join(", ")
                    ))
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;
        spec.update(FilterUpdate::SearchFields(fields));
    }

    if !args.status.is_empty() {
        let statuses = canonical_set(&args.status, |s| canonical_status(kind, s))?;
        spec.update(FilterUpdate::Statuses(statuses));
    }
    if !args.priority.is_empty() {
        spec.update(FilterUpdate::Priorities(canonical_set(&args.priority, canonical_priority)?));
    }
    if !args.category.is_empty() {
        let categories = canonical_set(&args.category, |c| canonical_category(kind, c))?;
        spec.update(FilterUpdate::Categories(categories));
    }
    if !args.assignee.is_empty() {
        spec.update(FilterUpdate::Assignees(raw_set(&args.assignee)));
    }
    if !args.project.is_empty() {
        spec.update(FilterUpdate::Projects(raw_set(&args.project)));
    }
    if !args.tags.is_empty() {
        let tags = args
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        spec.update(FilterUpdate::Tags(tags));
    }

    if args.from.is_some() || args.to.is_some() {
        let field = DateField::parse(&args.date_field).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unknown date field '{}' (valid: start, due, completed, created)",
                args.date_field
            ))
        })?;
        let start = args.from.as_deref().map(|d| parse_date(d, today)).transpose()?;
        let end = args.to.as_deref().map(|d| parse_date(d, today)).transpose()?;
        spec.update(FilterUpdate::DateRange(DateRange::new(field, start, end)));
    }

    Ok(spec)
}
