use sportsbook_catalog::*;

use crate::cancel::CancellationToken;
use crate::consistency;
use crate::error::CommandError;
use crate::search;

/// One decoded catalog command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create(CreateCommand),
    Update(UpdateCommand),
    Delete(DeleteCommand),
    Search(SearchFilter),
}

impl Command {
    fn label(&self) -> &'static str {
        match self {
            Command::Create(_) => "create",
            Command::Update(_) => "update",
            Command::Delete(_) => "delete",
            Command::Search(_) => "search",
        }
    }
}

/// Result of a successfully executed [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(Id),
    Updated(bool),
    Deleted(bool),
    Rows(SearchResults),
}

/// Runs catalog commands against a [`Store`], one transaction per command.
pub struct CatalogEngine<S> {
    store: S,
    cancel: CancellationToken,
}

impl<S: Store> CatalogEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_cancellation(store, CancellationToken::new())
    }

    pub fn with_cancellation(store: S, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }

    /// A handle that cancels this engine's pending and future commands.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome, CommandError> {
        log::debug!("Executing {}", command.label());
        match command {
            Command::Create(c) => self.create(&c).map(Outcome::Created),
            Command::Update(c) => self.update(&c).map(Outcome::Updated),
            Command::Delete(c) => self.delete(&c).map(Outcome::Deleted),
            Command::Search(f) => self.search(&f).map(Outcome::Rows),
        }
    }

    pub fn create(&mut self, command: &CreateCommand) -> Result<Id, CommandError> {
        let kind = command.kind();
        let id = self.in_transaction(Access::Write, |repo| consistency::create(repo, command))?;
        log::info!("Created {kind} {id}");
        Ok(id)
    }

    pub fn update(&mut self, command: &UpdateCommand) -> Result<bool, CommandError> {
        command.validate()?;
        let updated = self.in_transaction(Access::Write, |repo| consistency::update(repo, command))?;
        log::info!("Updated {} {}", command.kind(), command.id());
        Ok(updated)
    }

    pub fn delete(&mut self, command: &DeleteCommand) -> Result<bool, CommandError> {
        let result = self.in_transaction(Access::Write, |repo| consistency::delete(repo, command));
        match &result {
            Ok(_) => log::info!("Deleted {} {}", command.kind(), command.id()),
            Err(CommandError::HasDependents { dependent, count, .. }) => log::warn!(
                "Not deleting {} {}: {count} {dependent} row(s) depend on it",
                command.kind(),
                command.id()
            ),
            Err(_) => {}
        }
        result
    }

    pub fn search(&mut self, filter: &SearchFilter) -> Result<SearchResults, CommandError> {
        let rows = self.in_transaction(Access::Read, |repo| search::search(repo, filter))?;
        log::debug!("Search returned {} row(s)", rows.len());
        Ok(rows)
    }

    /// Run `f` in a fresh transaction and commit it. Any error, including
    /// cancellation observed before commit, drops the transaction unapplied.
    fn in_transaction<T>(
        &mut self,
        access: Access,
        f: impl FnOnce(&dyn Repository) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        if self.cancel.is_cancelled() {
            return Err(CommandError::Cancelled);
        }

        let tx = match access {
            Access::Read => self.store.read()?,
            Access::Write => self.store.write()?,
        };

        let value = match f(&tx) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Rolling back: {e}");
                return Err(e);
            }
        };

        if self.cancel.is_cancelled() {
            log::warn!("Cancelled before commit, rolling back");
            return Err(CommandError::Cancelled);
        }

        tx.commit()?;
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy)]
enum Access {
    Read,
    Write,
}
