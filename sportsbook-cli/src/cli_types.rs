//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Parser)]
#[command(name = "sportsbook", version)]
#[command(about = "Manage a sports betting catalog", long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["add", "update", "delete", "find"]),
))]
pub(crate) struct Cli {
    /// Create a sport, event, market or selection from a JSON payload
    #[arg(short = 'a', long, value_name = "JSON")]
    pub add: Option<String>,

    /// Update a row: {"<kind>": {"id": N, "values": {...}}}
    #[arg(short = 'u', long, value_name = "JSON")]
    pub update: Option<String>,

    /// Delete a row: {"<kind>": {"id": N}}
    #[arg(short = 'd', long, value_name = "JSON")]
    pub delete: Option<String>,

    /// Search: {"all"|"sport"|"event"|"market"|"selection": "text"} or {"active": N}
    #[arg(short = 'f', long, value_name = "JSON")]
    pub find: Option<String>,

    /// Database file (overrides SPORTSBOOK_DB and the config file)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Print search rows as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Only show warnings and errors
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Which of the four actions was requested, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Add(String),
    Update(String),
    Delete(String),
    Find(String),
}

impl Cli {
    /// The requested action. clap guarantees exactly one is present.
    pub(crate) fn action(&self) -> Option<Action> {
        let Cli {
            add,
            update,
            delete,
            find,
            ..
        } = self;
        add.clone()
            .map(Action::Add)
            .or_else(|| update.clone().map(Action::Update))
            .or_else(|| delete.clone().map(Action::Delete))
            .or_else(|| find.clone().map(Action::Find))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_action_is_required() {
        assert!(Cli::try_parse_from(["sportsbook"]).is_err());
        assert!(
            Cli::try_parse_from(["sportsbook", "-a", "{}", "-f", "{}"]).is_err()
        );
    }

    #[test]
    fn short_and_long_flags() {
        let cli = Cli::try_parse_from(["sportsbook", "-f", r#"{"all":"box"}"#]).unwrap();
        assert_eq!(cli.action(), Some(Action::Find(r#"{"all":"box"}"#.to_string())));

        let cli = Cli::try_parse_from([
            "sportsbook",
            "--delete",
            r#"{"sport":{"id":1}}"#,
            "--db",
            "other.sqlite",
            "--json",
        ])
        .unwrap();
        assert!(matches!(cli.action(), Some(Action::Delete(_))));
        assert_eq!(cli.db, Some(PathBuf::from("other.sqlite")));
        assert!(cli.json);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(
            Cli::try_parse_from(["sportsbook", "-f", "{}", "--quiet", "-v"]).is_err()
        );
    }
}
