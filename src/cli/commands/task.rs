//! Task command implementations.

use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::cli::commands::filter::flag_choice;
use crate::cli::commands::records;
use crate::cli::TaskCommands;
use crate::cli::commands::load_dataset as load;
use crate::error::Result;
use crate::model::{Enumeration, Task};
use crate::store::find_index;
use crate::validate::parse_task_status;

#[derive(Serialize)]
struct StatusChangeOutput<'a> {
    id: &'a str,
    previous: &'static str,
    status: &'static str,
    progress: u8,
    dry_run: bool,
}

/// Execute task commands.
///
/// # Errors
///
/// Returns an error if the data cannot be loaded, a flag is invalid, or the
/// task does not exist.
pub fn execute(command: &TaskCommands, data_dir: Option<&Path>, json: bool) -> Result<()> {
    match command {
        TaskCommands::List {
            list,
            billable,
            non_billable,
        } => {
            let data = load(data_dir)?;
            records::list(&data.tasks, list, flag_choice(*billable, *non_billable), json)
        }
        TaskCommands::Summary {
            summary,
            billable,
            non_billable,
        } => {
            let data = load(data_dir)?;
            records::summary(&data.tasks, summary, flag_choice(*billable, *non_billable), json)
        }
        TaskCommands::Show { id } => show(id, data_dir, json),
        TaskCommands::SetStatus { id, status } => set_status(id, status, data_dir, json),
    }
}

fn show(id: &str, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let data = load(data_dir)?;
    let task = &data.tasks[find_index(&data.tasks, id)?];

    if json {
        println!("{}", serde_json::to_string(task)?);
        return Ok(());
    }

    print_task(task);
    Ok(())
}

fn print_task(task: &Task) {
    println!("{} {}", format!("[{}]", task.id).dimmed(), task.title.bold());
    println!();
    println!("Status:    {}", task.status.as_str());
    println!("Priority:  {}", task.priority.as_str());
    if let Some(category) = task.category {
        println!("Category:  {}", category.as_str());
    }
    println!("Progress:  {}%", task.progress);
    if let Some(due) = task.due_date {
        println!("Due:       {due}");
    }
    if let Some(done) = task.completed_at {
        println!("Completed: {}", done.format("%Y-%m-%d %H:%M"));
    }
    if !task.assignee_names.is_empty() {
        println!("Assignees: {}", task.assignee_names.join(", "));
    }
    if !task.tags.is_empty() {
        println!("Tags:      {}", task.tags.join(", "));
    }
    if task.billable {
        println!("Billable:  yes");
    }
    if let Some(ref desc) = task.description {
        println!();
        println!("{desc}");
    }
}

fn set_status(id: &str, status: &str, data_dir: Option<&Path>, json: bool) -> Result<()> {
    let new_status = parse_task_status(status)?;
    let mut data = load(data_dir)?;
    let index = find_index(&data.tasks, id)?;
    let previous = data.tasks[index].status;

    if crate::is_dry_run() {
        if json {
            let output = StatusChangeOutput {
                id,
                previous: previous.as_str(),
                status: new_status.as_str(),
                progress: data.tasks[index].progress,
                dry_run: true,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else {
            println!("Would move task {id}: {} -> {}", previous.as_str(), new_status.as_str());
        }
        return Ok(());
    }

    data.tasks[index].set_status(new_status, Utc::now());
    data.save_tasks()?;
    tracing::debug!(id, from = previous.as_str(), to = new_status.as_str(), "task status changed");

    let task = &data.tasks[index];
    if crate::is_silent() {
        println!("{}", task.id);
    } else if json {
        let output = StatusChangeOutput {
            id: &task.id,
            previous: previous.as_str(),
            status: task.status.as_str(),
            progress: task.progress,
            dry_run: false,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Moved task {}: {} -> {}", task.id, previous.as_str(), task.status.as_str().green());
    }

    Ok(())
}
