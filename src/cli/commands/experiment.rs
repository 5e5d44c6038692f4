//! Experiment command implementations.

use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::cli::commands::filter::flag_choice;
use crate::cli::commands::records;
use crate::cli::commands::load_dataset as load;
use crate::cli::ExperimentCommands;
use crate::error::Result;
use crate::model::{Enumeration, Experiment};
use crate::store::find_index;
use crate::validate::parse_experiment_status;

#[derive(Serialize)]
struct StatusChangeOutput<'a> {
    id: &'a str,
    previous: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<String>,
    dry_run: bool,
}

/// Execute experiment commands.
///
/// # Errors
///
/// Returns an error if the data cannot be loaded, a flag is invalid, or the
/// experiment does not exist.
pub fn execute(command: &ExperimentCommands, data_dir: Option<&Path>, json: bool) -> Result<()> {
    match command {
        ExperimentCommands::List {
            list,
            qualified,
            not_qualified,
        } => {
            let data = load(data_dir)?;
            records::list(&data.experiments, list, flag_choice(*qualified, *not_qualified), json)
        }
        ExperimentCommands::Summary {
            summary,
            qualified,
            not_qualified,
        } => {
            let data = load(data_dir)?;
            records::summary(&data.experiments, summary, flag_choice(*qualified, *not_qualified), json)
        }
        ExperimentCommands::Show { id } => show(id, data_dir, json),
        ExperimentCommands::SetStatus { id, status } => set_status(id, status, data_dir, json),
    }
}

fn show(id: &str, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let data = load(data_dir)?;
    let experiment = &data.experiments[find_index(&data.experiments, id)?];

    if json {
        println!("{}", serde_json::to_string(experiment)?);
        return Ok(());
    }

    print_experiment(experiment);
    Ok(())
}

fn print_experiment(exp: &Experiment) {
    println!("{} {}", format!("[{}]", exp.id).dimmed(), exp.title.bold());
    println!();
    println!("Status:     {}", exp.status.as_str());
    println!("Priority:   {}", exp.priority.as_str());
    if let Some(category) = exp.category {
        println!("Category:   {}", category.as_str());
    }
    println!("Progress:   {}%", exp.progress);
    if let Some(start) = exp.start_date {
        println!("Started:    {start}");
    }
    if let Some(end) = exp.end_date {
        println!("Ends:       {end}");
    }
    if !exp.researcher_names.is_empty() {
        println!("Researchers: {}", exp.researcher_names.join(", "));
    }
    if let Some(hours) = exp.time_spent_hours {
        println!("Hours:      {hours:.1}");
    }
    println!(
        "R&D credit: {}",
        if exp.qualifies_for_credit { "qualifies".green() } else { "no".normal() }
    );
    if let Some(ref hypothesis) = exp.hypothesis {
        println!();
        println!("{}", "Hypothesis".dimmed());
        println!("{hypothesis}");
    }
    if let Some(ref notes) = exp.notes {
        println!();
        println!("{}", "Notes".dimmed());
        println!("{notes}");
    }
}

fn set_status(id: &str, status: &str, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let new_status = parse_experiment_status(status)?;
    let mut data = load(data_dir)?;
    let index = find_index(&data.experiments, id)?;
    let previous = data.experiments[index].status;

    if crate::is_dry_run() {
        if json {
            let output = StatusChangeOutput {
                id,
                previous: previous.as_str(),
                status: new_status.as_str(),
                completed_at: None,
                dry_run: true,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else {
            println!("Would move experiment {id}: {} -> {}", previous.as_str(), new_status.as_str());
        }
        return Ok(());
    }

    data.experiments[index].set_status(new_status, Utc::now());
    data.save_experiments()?;

    let exp = &data.experiments[index];
    if crate::is_silent() {
        println!("{}", exp.id);
    } else if json {
        let output = StatusChangeOutput {
            id: &exp.id,
            previous: previous.as_str(),
            status: exp.status.as_str(),
            completed_at: exp.completed_at.map(|at| at.to_rfc3339()),
            dry_run: false,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Moved experiment {}: {} -> {}", exp.id, previous.as_str(), exp.status.as_str().green());
    }

    Ok(())
}
