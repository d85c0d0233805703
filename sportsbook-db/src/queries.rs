//! Read queries for the catalog database.
//!
//! Provides keyword search across and within entity types, and the
//! active-descendant aggregation. Keywords are always bound as parameters.

use rusqlite::{params, Connection, Row};
use sportsbook_catalog::*;

use crate::operations::{
    event_from, market_event_from, market_from, selection_from, sport_from, OperationError,
    EVENT_COLUMNS, MARKET_COLUMNS, SELECTION_COLUMNS, SPORT_COLUMNS,
};

/// Build a LIKE pattern that matches `keyword` literally anywhere in a value.
///
/// The keyword is lowercased to pair with `fold_case(column)`. Use with
/// `ESCAPE '\'`.
pub fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ── Cross-Entity Search ─────────────────────────────────────────────────────

/// Search sport, event, market and selection names, ignoring case for any
/// script (not only ASCII).
///
/// Walks the hierarchy with outer joins so entities without children still
/// match, and returns one row per join path.
pub fn search_catalog(conn: &Connection, keyword: &str) -> Result<Vec<CatalogRow>, OperationError> {
    let pattern = like_pattern(keyword);
    let mut stmt = conn.prepare(
        r"SELECT s.id, s.name, s.display_name, s.slug, s.sort_order, s.active,
                e.id, e.sport_id, e.name, e.event_type, e.status, e.slug, e.active,
                me.id, me.market_id, me.event_id, me.active,
                m.id, m.name, m.display_name, m.sort_order, m.schema, m.columns, m.active,
                se.id, se.marketevent_id, se.name, se.price, se.outcome, se.active
         FROM sports s
         LEFT JOIN events e ON e.sport_id = s.id
         LEFT JOIN marketevents me ON me.event_id = e.id
         LEFT JOIN markets m ON m.id = me.market_id
         LEFT JOIN selections se ON se.marketevent_id = me.id
         WHERE fold_case(s.name) LIKE ?1 ESCAPE '\'
            OR fold_case(e.name) LIKE ?1 ESCAPE '\'
            OR fold_case(m.name) LIKE ?1 ESCAPE '\'
            OR fold_case(se.name) LIKE ?1 ESCAPE '\'
         GROUP BY s.id, e.id, me.id, se.id
         ORDER BY s.id, e.id, m.id, se.id",
    )?;
    let rows = stmt.query_map(params![pattern], row_to_catalog)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Single-Entity Search ────────────────────────────────────────────────────

/// Search sports by name, display name, or slug.
pub fn search_sports(conn: &Connection, keyword: &str) -> Result<Vec<Sport>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        r"SELECT {SPORT_COLUMNS} FROM sports
         WHERE fold_case(name) LIKE ?1 ESCAPE '\'
            OR fold_case(display_name) LIKE ?1 ESCAPE '\'
            OR fold_case(slug) LIKE ?1 ESCAPE '\'
         ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![like_pattern(keyword)], |row| sport_from(row, 0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Search events by name or slug.
pub fn search_events(conn: &Connection, keyword: &str) -> Result<Vec<Event>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        r"SELECT {EVENT_COLUMNS} FROM events
         WHERE fold_case(name) LIKE ?1 ESCAPE '\'
            OR fold_case(slug) LIKE ?1 ESCAPE '\'
         ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![like_pattern(keyword)], |row| event_from(row, 0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Search markets by name or display name.
pub fn search_markets(conn: &Connection, keyword: &str) -> Result<Vec<Market>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        r"SELECT {MARKET_COLUMNS} FROM markets
         WHERE fold_case(name) LIKE ?1 ESCAPE '\'
            OR fold_case(display_name) LIKE ?1 ESCAPE '\'
         ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![like_pattern(keyword)], |row| market_from(row, 0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Search selections by name or outcome.
pub fn search_selections(
    conn: &Connection,
    keyword: &str,
) -> Result<Vec<Selection>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        r"SELECT {SELECTION_COLUMNS} FROM selections
         WHERE fold_case(name) LIKE ?1 ESCAPE '\'
            OR fold_case(outcome) LIKE ?1 ESCAPE '\'
         ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![like_pattern(keyword)], |row| selection_from(row, 0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Activity Aggregation ────────────────────────────────────────────────────

/// Entities whose count of active children exceeds `threshold`.
///
/// Counts active events per sport, active selections per event, and active
/// selections per market.
pub fn activity_above(
    conn: &Connection,
    threshold: i64,
) -> Result<Vec<ActivityRow>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT kind, id, name, active_count FROM (
             SELECT 'sport' AS kind, 0 AS kind_order, s.id AS id, s.name AS name,
                    COUNT(e.id) AS active_count
             FROM sports s
             JOIN events e ON e.sport_id = s.id AND e.active = 1
             GROUP BY s.id
             HAVING COUNT(e.id) > ?1
             UNION ALL
             SELECT 'event', 1, e.id, e.name, COUNT(se.id)
             FROM events e
             JOIN marketevents me ON me.event_id = e.id
             JOIN selections se ON se.marketevent_id = me.id AND se.active = 1
             GROUP BY e.id
             HAVING COUNT(se.id) > ?1
             UNION ALL
             SELECT 'market', 2, m.id, m.name, COUNT(se.id)
             FROM markets m
             JOIN marketevents me ON me.market_id = m.id
             JOIN selections se ON se.marketevent_id = me.id AND se.active = 1
             GROUP BY m.id
             HAVING COUNT(se.id) > ?1
         )
         ORDER BY kind_order, id",
    )?;
    let rows = stmt.query_map(params![threshold], |row| {
        let kind: String = row.get(0)?;
        let kind = ActivityKind::from_tag(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown activity kind '{kind}'").into(),
            )
        })?;
        Ok(ActivityRow {
            kind,
            id: row.get(1)?,
            name: row.get(2)?,
            active_count: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn row_to_catalog(row: &Row<'_>) -> rusqlite::Result<CatalogRow> {
    let present = |at: usize| -> rusqlite::Result<bool> {
        Ok(row.get::<_, Option<Id>>(at)?.is_some())
    };

    Ok(CatalogRow {
        sport: sport_from(row, 0)?,
        event: if present(6)? { Some(event_from(row, 6)?) } else { None },
        market_event: if present(13)? {
            Some(market_event_from(row, 13)?)
        } else {
            None
        },
        market: if present(17)? { Some(market_from(row, 17)?) } else { None },
        selection: if present(24)? {
            Some(selection_from(row, 24)?)
        } else {
            None
        },
    })
}
