//! [`Store`] implementation over a SQLite connection.

use std::path::Path;

use rusqlite::{Connection, TransactionBehavior};
use sportsbook_catalog::*;

use crate::operations::{self, OperationError};
use crate::queries;
use crate::schema::{self, SchemaError};

/// A catalog database that hands out one transaction at a time.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the catalog database at `path`.
    pub fn open(path: &Path) -> Result<Self, SchemaError> {
        Ok(Self {
            conn: schema::open_database(path)?,
        })
    }

    /// An in-memory catalog with the full schema.
    pub fn open_memory() -> Result<Self, SchemaError> {
        Ok(Self {
            conn: schema::open_memory()?,
        })
    }

    /// The underlying connection, for inspection outside a transaction.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn begin(&mut self, behavior: TransactionBehavior) -> Result<SqliteTransaction<'_>, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(behavior)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(SqliteTransaction { tx })
    }
}

impl Store for SqliteStore {
    type Tx<'a> = SqliteTransaction<'a>;

    fn read(&mut self) -> Result<Self::Tx<'_>, StoreError> {
        self.begin(TransactionBehavior::Deferred)
    }

    fn write(&mut self) -> Result<Self::Tx<'_>, StoreError> {
        self.begin(TransactionBehavior::Immediate)
    }
}

/// An open SQLite transaction. Rolls back on drop unless committed.
pub struct SqliteTransaction<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl Transaction for SqliteTransaction<'_> {
    fn commit(self) -> Result<(), StoreError> {
        // Deferred foreign keys are checked here; only selections defer theirs.
        self.tx
            .commit()
            .map_err(|e| OperationError::from(e).into_store_error(EntityKind::Selection))
    }
}

/// Map an operation result into the repository error space for `entity`.
fn on<T>(entity: EntityKind, result: Result<T, OperationError>) -> Result<T, StoreError> {
    result.map_err(|e| e.into_store_error(entity))
}

impl Repository for SqliteTransaction<'_> {
    fn insert_sport(&self, sport: &NewSport) -> Result<Id, StoreError> {
        on(EntityKind::Sport, operations::insert_sport(&self.tx, sport))
    }

    fn find_sport(&self, id: Id) -> Result<Option<Sport>, StoreError> {
        on(EntityKind::Sport, operations::find_sport(&self.tx, id))
    }

    fn update_sport(&self, id: Id, changes: &SportChanges) -> Result<bool, StoreError> {
        on(EntityKind::Sport, operations::update_sport(&self.tx, id, changes))
    }

    fn delete_sport(&self, id: Id) -> Result<bool, StoreError> {
        on(EntityKind::Sport, operations::delete_sport(&self.tx, id))
    }

    fn set_sport_active(&self, id: Id, active: bool) -> Result<bool, StoreError> {
        on(EntityKind::Sport, operations::set_sport_active(&self.tx, id, active))
    }

    fn count_events_for_sport(&self, sport_id: Id) -> Result<i64, StoreError> {
        on(
            EntityKind::Event,
            operations::count_events_for_sport(&self.tx, sport_id),
        )
    }

    fn insert_event(&self, event: &NewEvent, active: bool) -> Result<Id, StoreError> {
        on(EntityKind::Event, operations::insert_event(&self.tx, event, active))
    }

    fn find_event(&self, id: Id) -> Result<Option<Event>, StoreError> {
        on(EntityKind::Event, operations::find_event(&self.tx, id))
    }

    fn update_event(&self, id: Id, changes: &EventChanges) -> Result<bool, StoreError> {
        on(EntityKind::Event, operations::update_event(&self.tx, id, changes))
    }

    fn delete_event(&self, id: Id) -> Result<bool, StoreError> {
        on(EntityKind::Event, operations::delete_event(&self.tx, id))
    }

    fn set_event_active(&self, id: Id, active: bool) -> Result<bool, StoreError> {
        on(EntityKind::Event, operations::set_event_active(&self.tx, id, active))
    }

    fn count_market_events_for_event(&self, event_id: Id) -> Result<i64, StoreError> {
        on(
            EntityKind::MarketEvent,
            operations::count_market_events_for_event(&self.tx, event_id),
        )
    }

    fn insert_market(&self, market: &NewMarket) -> Result<Id, StoreError> {
        on(EntityKind::Market, operations::insert_market(&self.tx, market))
    }

    fn find_market(&self, id: Id) -> Result<Option<Market>, StoreError> {
        on(EntityKind::Market, operations::find_market(&self.tx, id))
    }

    fn update_market(&self, id: Id, changes: &MarketChanges) -> Result<bool, StoreError> {
        on(EntityKind::Market, operations::update_market(&self.tx, id, changes))
    }

    fn delete_market(&self, id: Id) -> Result<bool, StoreError> {
        on(EntityKind::Market, operations::delete_market(&self.tx, id))
    }

    fn set_market_active(&self, id: Id, active: bool) -> Result<bool, StoreError> {
        on(EntityKind::Market, operations::set_market_active(&self.tx, id, active))
    }

    fn count_market_events_for_market(&self, market_id: Id) -> Result<i64, StoreError> {
        on(
            EntityKind::MarketEvent,
            operations::count_market_events_for_market(&self.tx, market_id),
        )
    }

    fn insert_market_event(&self, market_event: &NewMarketEvent) -> Result<Id, StoreError> {
        on(
            EntityKind::MarketEvent,
            operations::insert_market_event(&self.tx, market_event),
        )
    }

    fn find_market_event(&self, id: Id) -> Result<Option<MarketEvent>, StoreError> {
        on(EntityKind::MarketEvent, operations::find_market_event(&self.tx, id))
    }

    fn find_active_market_event(
        &self,
        market_id: Id,
        event_id: Id,
    ) -> Result<Option<MarketEvent>, StoreError> {
        on(
            EntityKind::MarketEvent,
            operations::find_active_market_event(&self.tx, market_id, event_id),
        )
    }

    fn delete_market_event(&self, id: Id) -> Result<bool, StoreError> {
        on(EntityKind::MarketEvent, operations::delete_market_event(&self.tx, id))
    }

    fn insert_selection(&self, selection: &SelectionRecord) -> Result<Id, StoreError> {
        on(EntityKind::Selection, operations::insert_selection(&self.tx, selection))
    }

    fn find_selection(&self, id: Id) -> Result<Option<Selection>, StoreError> {
        on(EntityKind::Selection, operations::find_selection(&self.tx, id))
    }

    fn update_selection(&self, id: Id, update: &SelectionUpdate) -> Result<bool, StoreError> {
        on(
            EntityKind::Selection,
            operations::update_selection(&self.tx, id, update),
        )
    }

    fn delete_selection(&self, id: Id) -> Result<bool, StoreError> {
        on(EntityKind::Selection, operations::delete_selection(&self.tx, id))
    }

    fn count_selections_for_market_event(
        &self,
        marketevent_id: Id,
        excluding: Option<Id>,
    ) -> Result<i64, StoreError> {
        on(
            EntityKind::Selection,
            operations::count_selections_for_market_event(&self.tx, marketevent_id, excluding),
        )
    }

    fn search_catalog(&self, keyword: &str) -> Result<Vec<CatalogRow>, StoreError> {
        on(EntityKind::Selection, queries::search_catalog(&self.tx, keyword))
    }

    fn search_sports(&self, keyword: &str) -> Result<Vec<Sport>, StoreError> {
        on(EntityKind::Sport, queries::search_sports(&self.tx, keyword))
    }

    fn search_events(&self, keyword: &str) -> Result<Vec<Event>, StoreError> {
        on(EntityKind::Event, queries::search_events(&self.tx, keyword))
    }

    fn search_markets(&self, keyword: &str) -> Result<Vec<Market>, StoreError> {
        on(EntityKind::Market, queries::search_markets(&self.tx, keyword))
    }

    fn search_selections(&self, keyword: &str) -> Result<Vec<Selection>, StoreError> {
        on(EntityKind::Selection, queries::search_selections(&self.tx, keyword))
    }

    fn activity_above(&self, threshold: i64) -> Result<Vec<ActivityRow>, StoreError> {
        on(EntityKind::Sport, queries::activity_above(&self.tx, threshold))
    }
}
