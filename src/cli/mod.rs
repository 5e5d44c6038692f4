//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// Opsboard - filter and summarize tasks, experiments and roles
#[derive(Parser, Debug)]
#[command(name = "opsboard", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: nearest .opsboard/, else ~/.opsboard/data)
    #[arg(long, global = true, env = "OPSBOARD_DATA")]
    pub data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Output only the ID (for scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Preview changes without writing to disk
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a data directory with empty record files
    Init {
        /// Truncate existing record files
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,

    /// Task board
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// R&D experiment log
    Experiment {
        #[command(subcommand)]
        command: ExperimentCommands,
    },

    /// Roles and permissions
    Role {
        #[command(subcommand)]
        command: RoleCommands,
    },

    /// CentralReach API pass-through
    Cr {
        #[command(subcommand)]
        command: CrCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Shared filter arguments
// ============================================================================

/// Filter flags shared by every list and summary command.
///
/// Multi-valued flags accept repeats or comma-separated values.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Base filter as JSON (flags below override individual keys)
    #[arg(long, value_name = "JSON")]
    pub filter: Option<String>,

    /// Case-insensitive substring search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Restrict search to fields (title, description, notes, tags, assignees)
    #[arg(long, value_delimiter = ',')]
    pub search_in: Vec<String>,

    /// Status filter (synonyms like done, wip accepted)
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<String>,

    /// Priority filter (low, medium, high, urgent or P0-P3)
    #[arg(short, long, value_delimiter = ',')]
    pub priority: Vec<String>,

    /// Category filter
    #[arg(short, long, value_delimiter = ',')]
    pub category: Vec<String>,

    /// Assignee ID filter
    #[arg(long, value_delimiter = ',')]
    pub assignee: Vec<String>,

    /// Project ID filter
    #[arg(long, value_delimiter = ',')]
    pub project: Vec<String>,

    /// Match records carrying any of these tags
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Date field for --from/--to (start, due, completed, created)
    #[arg(long, default_value = "due")]
    pub date_field: String,

    /// Range start, inclusive (YYYY-MM-DD, today, -7d, ...)
    #[arg(long)]
    pub from: Option<String>,

    /// Range end, inclusive
    #[arg(long)]
    pub to: Option<String>,
}

/// Display options for list commands.
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Sort by (priority, status, due, created, updated, title)
    #[arg(long, default_value = "created")]
    pub sort: String,

    /// Sort order (asc, desc)
    #[arg(long, default_value = "desc")]
    pub order: String,

    /// Maximum rows to show
    #[arg(short, long, default_value = "50")]
    pub limit: usize,
}

/// Options for summary commands.
#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Completion window in days (default: config, else 7)
    #[arg(long)]
    pub window_days: Option<i64>,

    /// Evaluate as of this date instead of now
    #[arg(long)]
    pub now: Option<String>,
}

// ============================================================================
// Task Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks matching the filters
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only billable tasks
        #[arg(long, conflicts_with = "non_billable")]
        billable: bool,

        /// Only non-billable tasks
        #[arg(long)]
        non_billable: bool,
    },

    /// Headline counts for tasks matching the filters
    Summary {
        #[command(flatten)]
        summary: SummaryArgs,

        /// Only billable tasks
        #[arg(long, conflicts_with = "non_billable")]
        billable: bool,

        /// Only non-billable tasks
        #[arg(long)]
        non_billable: bool,
    },

    /// Show one task
    Show {
        /// Task ID
        id: String,
    },

    /// Move a task to another column
    SetStatus {
        /// Task ID
        id: String,

        /// New status (todo, in_progress, review, completed, cancelled)
        status: String,
    },
}

// ============================================================================
// Experiment Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ExperimentCommands {
    /// List experiments matching the filters
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only experiments that qualify for R&D credit
        #[arg(long, conflicts_with = "not_qualified")]
        qualified: bool,

        /// Only experiments that do not qualify
        #[arg(long)]
        not_qualified: bool,
    },

    /// Headline counts for experiments matching the filters
    Summary {
        #[command(flatten)]
        summary: SummaryArgs,

        /// Only experiments that qualify for R&D credit
        #[arg(long, conflicts_with = "not_qualified")]
        qualified: bool,

        /// Only experiments that do not qualify
        #[arg(long)]
        not_qualified: bool,
    },

    /// Show one experiment
    Show {
        /// Experiment ID
        id: String,
    },

    /// Change an experiment's status
    SetStatus {
        /// Experiment ID
        id: String,

        /// New status (planned, running, analyzing, completed, abandoned)
        status: String,
    },
}

// ============================================================================
// Role Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum RoleCommands {
    /// List roles
    List {
        /// Case-insensitive search over name and description
        #[arg(long, alias = "search")]
        query: Option<String>,

        /// Status filter (active, inactive)
        #[arg(long, value_delimiter = ',')]
        status: Vec<String>,

        /// Only built-in system roles
        #[arg(long, conflicts_with = "custom")]
        system: bool,

        /// Only custom roles
        #[arg(long)]
        custom: bool,
    },

    /// Show a role with its permissions grouped by resource
    Show {
        /// Role ID
        id: String,
    },

    /// Grant or revoke permissions on a role
    Grant {
        /// Role ID
        id: String,

        /// Permission IDs to grant
        #[arg(value_delimiter = ',')]
        permissions: Vec<String>,

        /// Grant every permission of a resource (toggles off if all are granted)
        #[arg(long)]
        resource: Option<String>,

        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },
}

// ============================================================================
// CentralReach Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum CrCommands {
    /// GET any resource path and print the JSON payload
    Get {
        /// Resource path relative to the API root (e.g. clients/42)
        path: String,

        /// Query parameters as key=value (repeatable)
        #[arg(long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },

    /// List clients
    Clients {
        /// Search term
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Fetch one client
    Client {
        /// Client ID
        id: String,
    },

    /// List appointments
    Appointments {
        /// Restrict to one client
        #[arg(long)]
        client: Option<String>,

        /// Window start (YYYY-MM-DD, today, -7d, ...)
        #[arg(long)]
        from: Option<String>,

        /// Window end
        #[arg(long)]
        to: Option<String>,
    },

    /// List billing entries
    Billing {
        /// Window start (YYYY-MM-DD, today, -7d, ...)
        #[arg(long)]
        from: Option<String>,

        /// Window end
        #[arg(long)]
        to: Option<String>,
    },
}
