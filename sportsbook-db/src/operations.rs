//! CRUD operations for all catalog entity types.

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, ErrorCode, Row};
use sportsbook_catalog::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl OperationError {
    /// Classify a failure on `entity` for callers of the repository interface.
    pub fn into_store_error(self, entity: EntityKind) -> StoreError {
        let OperationError::Sqlite(err) = self;
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                let detail = message.clone().unwrap_or_else(|| failure.to_string());
                let extended = failure.extended_code;
                if extended == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || extended == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                {
                    StoreError::DuplicateKey { entity, detail }
                } else if extended == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                    StoreError::ForeignKey { entity, detail }
                } else {
                    StoreError::Backend(err.to_string())
                }
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

pub(crate) const SPORT_COLUMNS: &str = "id, name, display_name, slug, sort_order, active";
pub(crate) const EVENT_COLUMNS: &str = "id, sport_id, name, event_type, status, slug, active";
pub(crate) const MARKET_COLUMNS: &str =
    "id, name, display_name, sort_order, schema, columns, active";
pub(crate) const MARKET_EVENT_COLUMNS: &str = "id, market_id, event_id, active";
pub(crate) const SELECTION_COLUMNS: &str = "id, marketevent_id, name, price, outcome, active";

// ── Sport Operations ────────────────────────────────────────────────────────

/// Insert a sport. Returns the generated ID.
pub fn insert_sport(conn: &Connection, sport: &NewSport) -> Result<Id, OperationError> {
    conn.execute(
        "INSERT INTO sports (name, display_name, slug, sort_order, active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            sport.name,
            sport.display_name,
            sport.slug,
            sport.order,
            sport.active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_sport(conn: &Connection, id: Id) -> Result<Option<Sport>, OperationError> {
    let result = conn.query_row(
        &format!("SELECT {SPORT_COLUMNS} FROM sports WHERE id = ?1"),
        params![id],
        |row| sport_from(row, 0),
    );
    optional(result)
}

/// Apply the present fields of `changes`. Returns false if no such sport.
pub fn update_sport(
    conn: &Connection,
    id: Id,
    changes: &SportChanges,
) -> Result<bool, OperationError> {
    let mut set: Vec<(&'static str, &dyn ToSql)> = Vec::new();
    if let Some(name) = &changes.name {
        set.push(("name", name));
    }
    if let Some(display_name) = &changes.display_name {
        set.push(("display_name", display_name));
    }
    if let Some(slug) = &changes.slug {
        set.push(("slug", slug));
    }
    if let Some(order) = &changes.order {
        set.push(("sort_order", order));
    }
    if let Some(active) = &changes.active {
        set.push(("active", active));
    }
    update_row(conn, "sports", id, &set)
}

pub fn delete_sport(conn: &Connection, id: Id) -> Result<bool, OperationError> {
    delete_row(conn, "sports", id)
}

pub fn set_sport_active(conn: &Connection, id: Id, active: bool) -> Result<bool, OperationError> {
    update_row(conn, "sports", id, &[("active", &active)])
}

/// Number of events referencing a sport.
pub fn count_events_for_sport(conn: &Connection, sport_id: Id) -> Result<i64, OperationError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM events WHERE sport_id = ?1",
        params![sport_id],
        |row| row.get(0),
    )?)
}

// ── Event Operations ────────────────────────────────────────────────────────

/// Insert an event. The caller decides the active flag.
pub fn insert_event(
    conn: &Connection,
    event: &NewEvent,
    active: bool,
) -> Result<Id, OperationError> {
    conn.execute(
        "INSERT INTO events (sport_id, name, event_type, status, slug, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.sport_id,
            event.name,
            event.kind,
            event.status,
            event.slug,
            active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_event(conn: &Connection, id: Id) -> Result<Option<Event>, OperationError> {
    let result = conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
        params![id],
        |row| event_from(row, 0),
    );
    optional(result)
}

/// Apply the present fields of `changes`. `sport_id` is never written.
pub fn update_event(
    conn: &Connection,
    id: Id,
    changes: &EventChanges,
) -> Result<bool, OperationError> {
    let mut set: Vec<(&'static str, &dyn ToSql)> = Vec::new();
    if let Some(name) = &changes.name {
        set.push(("name", name));
    }
    if let Some(kind) = &changes.kind {
        set.push(("event_type", kind));
    }
    if let Some(status) = &changes.status {
        set.push(("status", status));
    }
    if let Some(slug) = &changes.slug {
        set.push(("slug", slug));
    }
    if let Some(active) = &changes.active {
        set.push(("active", active));
    }
    update_row(conn, "events", id, &set)
}

pub fn delete_event(conn: &Connection, id: Id) -> Result<bool, OperationError> {
    delete_row(conn, "events", id)
}

pub fn set_event_active(conn: &Connection, id: Id, active: bool) -> Result<bool, OperationError> {
    update_row(conn, "events", id, &[("active", &active)])
}

/// Number of market/event join rows referencing an event.
pub fn count_market_events_for_event(
    conn: &Connection,
    event_id: Id,
) -> Result<i64, OperationError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM marketevents WHERE event_id = ?1",
        params![event_id],
        |row| row.get(0),
    )?)
}

// ── Market Operations ───────────────────────────────────────────────────────

/// Insert a market with the caller's active flag.
pub fn insert_market(conn: &Connection, market: &NewMarket) -> Result<Id, OperationError> {
    conn.execute(
        "INSERT INTO markets (name, display_name, sort_order, schema, columns, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            market.name,
            market.display_name,
            market.order,
            market.schema,
            market.columns,
            market.active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_market(conn: &Connection, id: Id) -> Result<Option<Market>, OperationError> {
    let result = conn.query_row(
        &format!("SELECT {MARKET_COLUMNS} FROM markets WHERE id = ?1"),
        params![id],
        |row| market_from(row, 0),
    );
    optional(result)
}

pub fn update_market(
    conn: &Connection,
    id: Id,
    changes: &MarketChanges,
) -> Result<bool, OperationError> {
    let mut set: Vec<(&'static str, &dyn ToSql)> = Vec::new();
    if let Some(name) = &changes.name {
        set.push(("name", name));
    }
    if let Some(display_name) = &changes.display_name {
        set.push(("display_name", display_name));
    }
    if let Some(order) = &changes.order {
        set.push(("sort_order", order));
    }
    if let Some(schema) = &changes.schema {
        set.push(("schema", schema));
    }
    if let Some(columns) = &changes.columns {
        set.push(("columns", columns));
    }
    if let Some(active) = &changes.active {
        set.push(("active", active));
    }
    update_row(conn, "markets", id, &set)
}

pub fn delete_market(conn: &Connection, id: Id) -> Result<bool, OperationError> {
    delete_row(conn, "markets", id)
}

pub fn set_market_active(
    conn: &Connection,
    id: Id,
    active: bool,
) -> Result<bool, OperationError> {
    update_row(conn, "markets", id, &[("active", &active)])
}

/// Number of market/event join rows referencing a market.
pub fn count_market_events_for_market(
    conn: &Connection,
    market_id: Id,
) -> Result<i64, OperationError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM marketevents WHERE market_id = ?1",
        params![market_id],
        |row| row.get(0),
    )?)
}

// ── MarketEvent Operations ──────────────────────────────────────────────────

pub fn insert_market_event(
    conn: &Connection,
    market_event: &NewMarketEvent,
) -> Result<Id, OperationError> {
    conn.execute(
        "INSERT INTO marketevents (market_id, event_id, active) VALUES (?1, ?2, ?3)",
        params![
            market_event.market_id,
            market_event.event_id,
            market_event.active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_market_event(
    conn: &Connection,
    id: Id,
) -> Result<Option<MarketEvent>, OperationError> {
    let result = conn.query_row(
        &format!("SELECT {MARKET_EVENT_COLUMNS} FROM marketevents WHERE id = ?1"),
        params![id],
        |row| market_event_from(row, 0),
    );
    optional(result)
}

/// Find the oldest active join row for a market/event pair.
pub fn find_active_market_event(
    conn: &Connection,
    market_id: Id,
    event_id: Id,
) -> Result<Option<MarketEvent>, OperationError> {
    let result = conn.query_row(
        &format!(
            "SELECT {MARKET_EVENT_COLUMNS} FROM marketevents
             WHERE market_id = ?1 AND event_id = ?2 AND active = 1
             ORDER BY id LIMIT 1"
        ),
        params![market_id, event_id],
        |row| market_event_from(row, 0),
    );
    optional(result)
}

pub fn delete_market_event(conn: &Connection, id: Id) -> Result<bool, OperationError> {
    delete_row(conn, "marketevents", id)
}

// ── Selection Operations ────────────────────────────────────────────────────

/// Insert a selection bound to an existing join row. Returns the generated ID.
pub fn insert_selection(
    conn: &Connection,
    selection: &SelectionRecord,
) -> Result<Id, OperationError> {
    conn.execute(
        "INSERT INTO selections (marketevent_id, name, price, outcome, active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            selection.marketevent_id,
            selection.name,
            selection.price.cents(),
            selection.outcome,
            selection.active,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_selection(conn: &Connection, id: Id) -> Result<Option<Selection>, OperationError> {
    let result = conn.query_row(
        &format!("SELECT {SELECTION_COLUMNS} FROM selections WHERE id = ?1"),
        params![id],
        |row| selection_from(row, 0),
    );
    optional(result)
}

pub fn update_selection(
    conn: &Connection,
    id: Id,
    update: &SelectionUpdate,
) -> Result<bool, OperationError> {
    let price_cents = update.price.map(|p| p.cents());

    let mut set: Vec<(&'static str, &dyn ToSql)> = Vec::new();
    if let Some(marketevent_id) = &update.marketevent_id {
        set.push(("marketevent_id", marketevent_id));
    }
    if let Some(name) = &update.name {
        set.push(("name", name));
    }
    if let Some(cents) = &price_cents {
        set.push(("price", cents));
    }
    if let Some(outcome) = &update.outcome {
        set.push(("outcome", outcome));
    }
    if let Some(active) = &update.active {
        set.push(("active", active));
    }
    update_row(conn, "selections", id, &set)
}

pub fn delete_selection(conn: &Connection, id: Id) -> Result<bool, OperationError> {
    delete_row(conn, "selections", id)
}

/// Number of selections on a join row, optionally ignoring one selection.
pub fn count_selections_for_market_event(
    conn: &Connection,
    marketevent_id: Id,
    excluding: Option<Id>,
) -> Result<i64, OperationError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM selections
         WHERE marketevent_id = ?1 AND (?2 IS NULL OR id != ?2)",
        params![marketevent_id, excluding],
        |row| row.get(0),
    )?)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Run `UPDATE <table> SET ... WHERE id = ?1` for the given assignments.
///
/// Column names come from this module only; every value is bound.
/// With nothing to assign, reports whether the row exists.
fn update_row(
    conn: &Connection,
    table: &'static str,
    id: Id,
    set: &[(&'static str, &dyn ToSql)],
) -> Result<bool, OperationError> {
    if set.is_empty() {
        let exists: bool = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
            params![id],
            |row| row.get(0),
        )?;
        return Ok(exists);
    }

    let assignments = set
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {table} SET {assignments} WHERE id = ?1");

    let mut values: Vec<&dyn ToSql> = Vec::with_capacity(set.len() + 1);
    values.push(&id);
    values.extend(set.iter().map(|(_, value)| *value));

    let changed = conn.execute(&sql, values.as_slice())?;
    Ok(changed > 0)
}

fn delete_row(conn: &Connection, table: &'static str, id: Id) -> Result<bool, OperationError> {
    let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
    Ok(changed > 0)
}

fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>, OperationError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Row Mapping ─────────────────────────────────────────────────────────────
//
// Each mapper reads its entity's columns starting at index `at`, in the
// order of the matching `*_COLUMNS` constant.

pub(crate) fn sport_from(row: &Row<'_>, at: usize) -> rusqlite::Result<Sport> {
    Ok(Sport {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        display_name: row.get(at + 2)?,
        slug: row.get(at + 3)?,
        order: row.get(at + 4)?,
        active: row.get(at + 5)?,
    })
}

pub(crate) fn event_from(row: &Row<'_>, at: usize) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(at)?,
        sport_id: row.get(at + 1)?,
        name: row.get(at + 2)?,
        kind: row.get(at + 3)?,
        status: row.get(at + 4)?,
        slug: row.get(at + 5)?,
        active: row.get(at + 6)?,
    })
}

pub(crate) fn market_from(row: &Row<'_>, at: usize) -> rusqlite::Result<Market> {
    Ok(Market {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        display_name: row.get(at + 2)?,
        order: row.get(at + 3)?,
        schema: row.get(at + 4)?,
        columns: row.get(at + 5)?,
        active: row.get(at + 6)?,
    })
}

pub(crate) fn market_event_from(row: &Row<'_>, at: usize) -> rusqlite::Result<MarketEvent> {
    Ok(MarketEvent {
        id: row.get(at)?,
        market_id: row.get(at + 1)?,
        event_id: row.get(at + 2)?,
        active: row.get(at + 3)?,
    })
}

pub(crate) fn selection_from(row: &Row<'_>, at: usize) -> rusqlite::Result<Selection> {
    Ok(Selection {
        id: row.get(at)?,
        marketevent_id: row.get(at + 1)?,
        name: row.get(at + 2)?,
        price: Price::from_cents(row.get(at + 3)?),
        outcome: row.get(at + 4)?,
        active: row.get(at + 5)?,
    })
}
