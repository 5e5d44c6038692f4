//! Opsboard CLI entry point.

use clap::Parser;
use opsboard::cli::commands;
use opsboard::cli::{Cli, Commands, OutputFormat};
use opsboard::error::Error;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.silent {
        opsboard::SILENT.store(true, Ordering::Relaxed);
    }
    if cli.dry_run {
        opsboard::DRY_RUN.store(true, Ordering::Relaxed);
    }
    if cli.format == OutputFormat::Csv {
        opsboard::CSV_OUTPUT.store(true, Ordering::Relaxed);
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    // Effective JSON mode: --json OR --format json OR non-TTY stdout
    let json = cli.json
        || cli.format == OutputFormat::Json
        || (cli.format != OutputFormat::Csv && !std::io::IsTerminal::is_terminal(&std::io::stdout()));

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let data_dir = cli.data_dir.as_deref();

    match &cli.command {
        Commands::Init { force } => commands::init::execute(data_dir, *force, json),
        Commands::Version => commands::version::execute(json),
        Commands::Task { command } => commands::task::execute(command, data_dir, json),
        Commands::Experiment { command } => commands::experiment::execute(command, data_dir, json),
        Commands::Role { command } => commands::role::execute(command, data_dir, json),
        Commands::Cr { command } => commands::cr::execute(command, json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
