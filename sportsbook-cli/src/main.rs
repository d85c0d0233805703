//! sportsbook CLI
//!
//! Create, update, delete and search sports, events, markets and selections
//! in a SQLite betting catalog.

mod cli_types;
mod config;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use sportsbook_catalog::parse;
use sportsbook_db::SqliteStore;
use sportsbook_engine::{CancellationToken, CatalogEngine, Command, CommandError, Outcome};

use cli_types::{Action, Cli};
pub(crate) use error::CliError;
pub(crate) use logging::log_blank;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // A blocked delete still answers the question on stdout.
            if let CliError::Command(CommandError::HasDependents { .. }) = &e {
                println!("false");
            }
            log::error!("{}", e.if_supports_color(Stderr, |t| t.red()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let action = cli
        .action()
        .ok_or_else(|| CliError::other("One of --add, --update, --delete or --find is required"))?;
    let command = decode(&action)?;

    let (db_path, source) = config::resolve_db_path(cli.db.clone())?;
    log::debug!("Using database {} ({})", db_path.display(), source);
    let store = SqliteStore::open(&db_path).map_err(|e| {
        CliError::database(format!("Failed to open {}: {}", db_path.display(), e))
    })?;

    let cancel = CancellationToken::new();
    watch_interrupt(cancel.clone())?;

    let mut engine = CatalogEngine::with_cancellation(store, cancel);
    let outcome = engine.execute(command)?;
    print_outcome(&outcome, cli.json)
}

fn decode(action: &Action) -> Result<Command, CommandError> {
    let command = match action {
        Action::Add(json) => Command::Create(parse(json)?),
        Action::Update(json) => Command::Update(parse(json)?),
        Action::Delete(json) => Command::Delete(parse(json)?),
        Action::Find(json) => Command::Search(parse(json)?),
    };
    Ok(command)
}

fn print_outcome(outcome: &Outcome, json: bool) -> Result<(), CliError> {
    match outcome {
        Outcome::Created(id) => println!("{id}"),
        Outcome::Updated(ok) | Outcome::Deleted(ok) => println!("{ok}"),
        Outcome::Rows(results) => {
            if results.is_empty() {
                log::info!("No matches.");
                return Ok(());
            }
            if !json {
                log::info!("{}", output::header(results));
            }
            for line in output::result_lines(results, json)? {
                println!("{line}");
            }
            if !json {
                log_blank();
                log::info!("{} row(s)", results.len());
            }
        }
    }
    Ok(())
}

/// Trip `cancel` on Ctrl-C. The watcher runs a single-threaded runtime on
/// its own thread and lives until the process exits.
fn watch_interrupt(cancel: CancellationToken) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::Builder::new()
        .name("sportsbook-signal".to_string())
        .spawn(move || {
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        log::warn!("Interrupted, cancelling the current command");
                        cancel.cancel();
                    }
                    Err(e) => log::debug!("Unable to listen for Ctrl-C: {e}"),
                }
            });
        })?;
    Ok(())
}
