//! SQLite schema creation and version tracking.

use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database schema version {found} is newer than supported version {expected}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 1;

/// Create all tables and indexes if they don't exist.
///
/// Idempotent: safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? < CURRENT_VERSION {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Open or create a catalog database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    register_functions(&conn)?;

    let version = get_schema_version(&conn)?;
    if version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }
    if version < CURRENT_VERSION {
        log::debug!("Creating catalog schema v{CURRENT_VERSION} in {}", path.display());
        create_schema(&conn)?;
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    register_functions(&conn)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Register `fold_case(text)`, a Unicode lowercase used by keyword search.
///
/// SQLite's own `LIKE` and `lower()` only fold ASCII letters.
pub fn register_functions(conn: &Connection) -> Result<(), SchemaError> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Sports: root of the hierarchy
CREATE TABLE IF NOT EXISTS sports (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL UNIQUE,
    slug TEXT NOT NULL UNIQUE,
    sort_order INTEGER,
    active BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_sports_name ON sports(name);
CREATE INDEX IF NOT EXISTS idx_sports_display_name ON sports(display_name);
CREATE INDEX IF NOT EXISTS idx_sports_slug ON sports(slug);
CREATE INDEX IF NOT EXISTS idx_sports_active ON sports(active);

-- Events: one sport each
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY,
    sport_id INTEGER NOT NULL REFERENCES sports(id),
    name TEXT NOT NULL UNIQUE,
    event_type INTEGER NOT NULL,
    status INTEGER,
    slug TEXT NOT NULL UNIQUE,
    active BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_events_sport ON events(sport_id);
CREATE INDEX IF NOT EXISTS idx_events_name ON events(name);
CREATE INDEX IF NOT EXISTS idx_events_slug ON events(slug);
CREATE INDEX IF NOT EXISTS idx_events_active ON events(active);

-- Markets: definitions, linked to events through marketevents
CREATE TABLE IF NOT EXISTS markets (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL UNIQUE,
    sort_order INTEGER,
    schema INTEGER NOT NULL,
    columns INTEGER,
    active BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_markets_name ON markets(name);
CREATE INDEX IF NOT EXISTS idx_markets_display_name ON markets(display_name);

-- Market/event join rows
CREATE TABLE IF NOT EXISTS marketevents (
    id INTEGER PRIMARY KEY,
    market_id INTEGER NOT NULL REFERENCES markets(id),
    event_id INTEGER NOT NULL REFERENCES events(id),
    active BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_marketevents_pair ON marketevents(market_id, event_id);
CREATE INDEX IF NOT EXISTS idx_marketevents_event ON marketevents(event_id);
CREATE INDEX IF NOT EXISTS idx_marketevents_active ON marketevents(active);

-- Selections: priced outcomes. Price is stored in hundredths.
-- The join-row reference is checked at commit so a selection can be moved
-- off a join row that is deleted earlier in the same transaction.
CREATE TABLE IF NOT EXISTS selections (
    id INTEGER PRIMARY KEY,
    marketevent_id INTEGER NOT NULL
        REFERENCES marketevents(id) DEFERRABLE INITIALLY DEFERRED,
    name TEXT NOT NULL UNIQUE,
    price INTEGER NOT NULL,
    outcome TEXT,
    active BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_selections_marketevent ON selections(marketevent_id);
CREATE INDEX IF NOT EXISTS idx_selections_name ON selections(name);
CREATE INDEX IF NOT EXISTS idx_selections_active ON selections(active);
"#;
