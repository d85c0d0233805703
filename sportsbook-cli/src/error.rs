use sportsbook_engine::CommandError;
use thiserror::Error;

/// Errors that can occur while running a CLI invocation.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Opening the database failed
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// The command itself was rejected
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Output could not be rendered
    #[error("Output error: {0}")]
    Output(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
