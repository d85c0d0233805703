//! Create, update and delete rules for the catalog hierarchy.
//!
//! Every function here runs inside a transaction opened by the caller and
//! talks to storage only through [`Repository`]. Parents are looked up before
//! any write, so a missing sport, event or market aborts a command before it
//! has touched the store.

use sportsbook_catalog::*;

use crate::error::CommandError;

/// Apply a create command, returning the new row's id.
pub fn create(repo: &dyn Repository, command: &CreateCommand) -> Result<Id, CommandError> {
    match command {
        CreateCommand::Sport(sport) => Ok(repo.insert_sport(sport)?),
        CreateCommand::Event(event) => {
            require_sport(repo, event.sport_id)?;
            Ok(repo.insert_event(event, true)?)
        }
        CreateCommand::Market(market) => Ok(repo.insert_market(market)?),
        CreateCommand::Selection(selection) => create_selection(repo, selection),
    }
}

fn create_selection(repo: &dyn Repository, new: &NewSelection) -> Result<Id, CommandError> {
    let market = require_market(repo, new.market_id)?;
    let event = require_event(repo, new.event_id)?;

    let marketevent_id = resolve_market_event(repo, market.id, event.id)?;
    let id = repo.insert_selection(&SelectionRecord {
        marketevent_id,
        name: new.name.clone(),
        price: new.price,
        outcome: new.outcome.clone(),
        active: true,
    })?;

    activate_market(repo, &market)?;
    activate_event(repo, &event)?;
    activate_sport(repo, event.sport_id)?;
    Ok(id)
}

/// Apply an update command. Returns `true` once the row has been written.
pub fn update(repo: &dyn Repository, command: &UpdateCommand) -> Result<bool, CommandError> {
    let kind = command.kind();
    let id = command.id();
    let updated = match command {
        UpdateCommand::Sport(u) => repo.update_sport(id, &u.values)?,
        UpdateCommand::Event(u) => {
            if u.values.sport_id.is_some() {
                return Err(CommandError::ImmutableField {
                    kind,
                    field: "sport_id",
                });
            }
            repo.update_event(id, &u.values)?
        }
        UpdateCommand::Market(u) => repo.update_market(id, &u.values)?,
        UpdateCommand::Selection(u) => update_selection(repo, id, &u.values)?,
    };

    if updated {
        Ok(true)
    } else {
        Err(CommandError::NotFound { kind, id })
    }
}

fn update_selection(
    repo: &dyn Repository,
    id: Id,
    changes: &SelectionChanges,
) -> Result<bool, CommandError> {
    let Some(selection) = repo.find_selection(id)? else {
        return Ok(false);
    };
    let current = repo
        .find_market_event(selection.marketevent_id)?
        .ok_or(CommandError::NotFound {
            kind: EntityKind::MarketEvent,
            id: selection.marketevent_id,
        })?;

    let market = require_market(repo, changes.market_id.unwrap_or(current.market_id))?;
    let event = require_event(repo, changes.event_id.unwrap_or(current.event_id))?;

    let marketevent_id = if (market.id, event.id) == (current.market_id, current.event_id) {
        current.id
    } else {
        // The selection still points at the old row until it is rebound
        // below; the deferred foreign key allows that within the transaction.
        let others = repo.count_selections_for_market_event(current.id, Some(id))?;
        if others == 0 {
            log::debug!("Removing orphaned market_event {}", current.id);
            repo.delete_market_event(current.id)?;
        }
        resolve_market_event(repo, market.id, event.id)?
    };

    activate_market(repo, &market)?;
    activate_event(repo, &event)?;

    let update = SelectionUpdate {
        marketevent_id: Some(marketevent_id),
        name: changes.name.clone(),
        price: changes.price,
        outcome: changes.outcome.clone(),
        active: changes.active,
    };
    Ok(repo.update_selection(id, &update)?)
}

/// Apply a delete command. Sports, events and markets that still have
/// dependents are left in place.
pub fn delete(repo: &dyn Repository, command: &DeleteCommand) -> Result<bool, CommandError> {
    let kind = command.kind();
    let id = command.id();

    let exists = match command {
        DeleteCommand::Sport(_) => repo.find_sport(id)?.is_some(),
        DeleteCommand::Event(_) => repo.find_event(id)?.is_some(),
        DeleteCommand::Market(_) => repo.find_market(id)?.is_some(),
        DeleteCommand::Selection(_) => repo.find_selection(id)?.is_some(),
    };
    if !exists {
        return Err(CommandError::NotFound { kind, id });
    }

    let (dependent, count) = match command {
        DeleteCommand::Sport(_) => (EntityKind::Event, repo.count_events_for_sport(id)?),
        DeleteCommand::Event(_) => (
            EntityKind::MarketEvent,
            repo.count_market_events_for_event(id)?,
        ),
        DeleteCommand::Market(_) => (
            EntityKind::MarketEvent,
            repo.count_market_events_for_market(id)?,
        ),
        DeleteCommand::Selection(_) => (EntityKind::Selection, 0),
    };
    if count > 0 {
        return Err(CommandError::HasDependents {
            kind,
            id,
            dependent,
            count,
        });
    }

    let deleted = match command {
        DeleteCommand::Sport(_) => repo.delete_sport(id)?,
        DeleteCommand::Event(_) => repo.delete_event(id)?,
        DeleteCommand::Market(_) => repo.delete_market(id)?,
        DeleteCommand::Selection(_) => repo.delete_selection(id)?,
    };
    Ok(deleted)
}

/// Reuse the active join row for `(market_id, event_id)`, or create one.
pub fn resolve_market_event(
    repo: &dyn Repository,
    market_id: Id,
    event_id: Id,
) -> Result<Id, CommandError> {
    if let Some(existing) = repo.find_active_market_event(market_id, event_id)? {
        return Ok(existing.id);
    }
    let id = repo.insert_market_event(&NewMarketEvent {
        market_id,
        event_id,
        active: true,
    })?;
    log::debug!("Created market_event {id} for market {market_id}, event {event_id}");
    Ok(id)
}

fn require_sport(repo: &dyn Repository, id: Id) -> Result<Sport, CommandError> {
    repo.find_sport(id)?.ok_or(CommandError::ParentNotFound {
        kind: EntityKind::Sport,
        id,
    })
}

fn require_event(repo: &dyn Repository, id: Id) -> Result<Event, CommandError> {
    repo.find_event(id)?.ok_or(CommandError::ParentNotFound {
        kind: EntityKind::Event,
        id,
    })
}

fn require_market(repo: &dyn Repository, id: Id) -> Result<Market, CommandError> {
    repo.find_market(id)?.ok_or(CommandError::ParentNotFound {
        kind: EntityKind::Market,
        id,
    })
}

fn activate_market(repo: &dyn Repository, market: &Market) -> Result<(), CommandError> {
    if !market.active {
        log::debug!("Activating market {}", market.id);
        repo.set_market_active(market.id, true)?;
    }
    Ok(())
}

fn activate_event(repo: &dyn Repository, event: &Event) -> Result<(), CommandError> {
    if !event.active {
        log::debug!("Activating event {}", event.id);
        repo.set_event_active(event.id, true)?;
    }
    Ok(())
}

fn activate_sport(repo: &dyn Repository, sport_id: Id) -> Result<(), CommandError> {
    let sport = require_sport(repo, sport_id)?;
    if !sport.active {
        log::debug!("Activating sport {}", sport.id);
        repo.set_sport_active(sport.id, true)?;
    }
    Ok(())
}
