//! SQLite persistence layer for the betting catalog.
//!
//! Provides schema creation, CRUD operations, search queries, and the
//! [`SqliteStore`] implementation of the catalog repository traits, backed
//! by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

pub use operations::{
    count_events_for_sport, count_market_events_for_event, count_market_events_for_market,
    count_selections_for_market_event, delete_event, delete_market, delete_market_event,
    delete_selection, delete_sport, find_active_market_event, find_event, find_market,
    find_market_event, find_selection, find_sport, insert_event, insert_market,
    insert_market_event, insert_selection, insert_sport, set_event_active, set_market_active,
    set_sport_active, update_event, update_market, update_selection, update_sport,
    OperationError,
};
pub use queries::{
    activity_above, like_pattern, search_catalog, search_events, search_markets,
    search_selections, search_sports,
};
pub use schema::{open_database, open_memory, register_functions, SchemaError};
pub use store::{SqliteStore, SqliteTransaction};
