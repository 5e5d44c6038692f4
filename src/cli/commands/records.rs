//! List and summary output shared by the task and experiment commands.
//!
//! Both views run the same pipeline: build a filter from flags, apply it,
//! then either sort and print rows or aggregate the matches.

use chrono::{DateTime, NaiveDate, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::aggregate::{summarize_with, Summary, SummaryOptions};
use crate::cli::commands::filter::build_spec;
use crate::cli::{FilterArgs, ListArgs, SummaryArgs};
use crate::config::{load_config, resolve_window_days};
use crate::error::{Error, Result};
use crate::filter::{apply, sort_records, FilterSpec, FilterUpdate, SortKey, SortOrder};
use crate::model::{Enumeration, Record, TextField};
use crate::validate::parse_date;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput<'a, R: Serialize> {
    count: usize,
    total: usize,
    active_filters: usize,
    filter: &'a FilterSpec,
    items: Vec<&'a R>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryOutput<'a> {
    active_filters: usize,
    filter: &'a FilterSpec,
    #[serde(flatten)]
    summary: &'a Summary,
}

/// Display title of a record.
pub fn title_of<R: Record>(record: &R) -> &str {
    record
        .text_fields()
        .into_iter()
        .find(|(field, _)| *field == TextField::Title)
        .map_or("", |(_, text)| text)
}

/// Shared flags plus the entity's yes/no flag, which only overrides when given.
fn filter_spec<R: Record>(args: &FilterArgs, flag: Option<bool>, today: NaiveDate) -> Result<FilterSpec> {
    let mut spec = build_spec(R::KIND, args, today)?;
    if flag.is_some() {
        spec.update(FilterUpdate::Flag(flag));
    }
    Ok(spec)
}

fn parse_sort(args: &ListArgs) -> Result<(SortKey, SortOrder)> {
    let key = SortKey::parse(&args.sort).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "unknown sort key '{}' (valid: priority, status, due, created, updated, title)",
            args.sort
        ))
    })?;
    let order = match args.order.to_lowercase().as_str() {
        "asc" => SortOrder::Asc,
        "desc" => SortOrder::Desc,
        other => {
            return Err(Error::InvalidArgument(format!("unknown sort order '{other}' (valid: asc, desc)")));
        }
    };
    Ok((key, order))
}

/// Filter, sort and print a record collection.
///
/// # Errors
///
/// Returns a validation error for bad flags, or a JSON error on output.
pub fn list<R: Record + Serialize>(records: &[R], args: &ListArgs, flag: Option<bool>, json: bool) -> Result<()> {
    let today = Utc::now().date_naive();
    let spec = filter_spec::<R>(&args.filter, flag, today)?;
    let (key, order) = parse_sort(args)?;

    let mut matched = apply(records, &spec);
    sort_records(&mut matched, key, order);
    matched.truncate(args.limit);

    if crate::is_csv() {
        println!("id,title,status,priority,category,due");
        for record in &matched {
            println!(
                "{},{},{},{},{},{}",
                crate::csv_escape(record.id()),
                crate::csv_escape(title_of(*record)),
                record.status().map_or("", |s| s.as_str()),
                record.priority().map_or("", |p| p.as_str()),
                record.category().unwrap_or(""),
                record.due_date().map(|d| d.to_string()).unwrap_or_default()
            );
        }
    } else if json {
        let output = ListOutput {
            count: matched.len(),
            total: records.len(),
            active_filters: spec.active_count(),
            filter: &spec,
            items: matched,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if matched.is_empty() {
        println!("No {}s found.", R::KIND.as_str());
    } else {
        print_rows(&matched, records.len(), spec.active_count(), today);
    }

    Ok(())
}

fn print_rows<R: Record>(rows: &[&R], total: usize, active: usize, today: NaiveDate) {
    let heading = format!("{}s ({} of {total})", capitalize(R::KIND.as_str()), rows.len());
    if active > 0 {
        println!("{} {}", heading.bold(), format!("[{active} filters active]").dimmed());
    } else {
        println!("{}", heading.bold());
    }
    println!();

    for record in rows {
        let status = record.status();
        let status_str = status.map_or("-", |s| s.as_str());
        let status_cell = match status {
            Some(s) if s.is_completion() => format!("{status_str:<12}").green(),
            Some(s) if s.is_terminal() => format!("{status_str:<12}").dimmed(),
            _ => format!("{status_str:<12}").normal(),
        };
        let priority = record.priority().map_or("", |p| p.as_str());
        let due = match record.due_date() {
            Some(d) if d < today && !status.is_some_and(|s| s.is_terminal()) => {
                format!("due {d}").red().to_string()
            }
            Some(d) => format!("due {d}").dimmed().to_string(),
            None => String::new(),
        };

        println!(
            "{} {} {:<7} {} {}",
            format!("[{}]", record.id()).dimmed(),
            status_cell,
            priority,
            title_of(*record),
            due
        );
    }
}

/// Resolve `--now` (end of that day) or the current time.
fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    let current = Utc::now();
    match now {
        None => Ok(current),
        Some(input) => parse_date(input, current.date_naive())?
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| Error::InvalidDate(input.to_string())),
    }
}

fn resolve_window(explicit: Option<i64>) -> Result<i64> {
    match explicit {
        Some(days) if days < 0 => Err(Error::InvalidArgument(format!(
            "--window-days must not be negative (got {days})"
        ))),
        Some(days) => Ok(days),
        None => Ok(resolve_window_days(&load_config()?)),
    }
}

/// Filter a collection and print its aggregates.
///
/// # Errors
///
/// Returns a validation error for bad flags, a config error if the settings
/// file is unreadable, or a JSON error on output.
pub fn summary<R: Record>(records: &[R], args: &SummaryArgs, flag: Option<bool>, json: bool) -> Result<()> {
    let now = resolve_now(args.now.as_deref())?;
    let spec = filter_spec::<R>(&args.filter, flag, now.date_naive())?;
    let options = SummaryOptions::days(resolve_window(args.window_days)?);

    let matched: Vec<&R> = apply(records, &spec);
    let summary = summarize_with(&matched, now, &options);

    if crate::is_csv() {
        println!("metric,value");
        println!("total,{}", summary.total);
        println!("overdue,{}", summary.overdue);
        println!("completed_in_window,{}", summary.completed_in_window);
        for (status, count) in summary.by_status.iter() {
            println!("status:{status},{count}");
        }
        for (priority, count) in summary.by_priority.iter() {
            println!("priority:{priority},{count}");
        }
    } else if json {
        let output = SummaryOutput {
            active_filters: spec.active_count(),
            filter: &spec,
            summary: &summary,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_summary(&summary, spec.active_count());
    }

    Ok(())
}

fn print_summary(summary: &Summary, active: usize) {
    let kind = capitalize(summary.kind.as_str());
    if active > 0 {
        println!("{} {}", format!("{kind}s: {}", summary.total).bold(), format!("[{active} filters active]").dimmed());
    } else {
        println!("{}", format!("{kind}s: {}", summary.total).bold());
    }

    let overdue = format!("{}", summary.overdue);
    println!("  Overdue:    {}", if summary.overdue > 0 { overdue.red() } else { overdue.normal() });
    println!(
        "  Completed:  {} in the last {} days",
        summary.completed_in_window.to_string().green(),
        summary.window_days
    );
    if summary.estimated_hours > 0.0 || summary.actual_hours > 0.0 {
        println!("  Hours:      {:.1} actual / {:.1} estimated", summary.actual_hours, summary.estimated_hours);
    }
    if let Some(avg) = summary.average_progress {
        println!("  Progress:   {avg:.0}% average");
    }
    println!("  Flagged:    {}", summary.flagged);

    println!();
    println!("{}", "By status".dimmed());
    for (status, count) in summary.by_status.iter() {
        println!("  {status:<12} {count}");
    }

    if !summary.by_priority.is_empty() {
        println!("{}", "By priority".dimmed());
        for (priority, count) in summary.by_priority.iter() {
            println!("  {priority:<12} {count}");
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
