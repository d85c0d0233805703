//! Storage interface the consistency engine is written against.
//!
//! A [`Store`] hands out [`Transaction`]s; every read and write goes through
//! the [`Repository`] methods of an open transaction. Dropping a transaction
//! without calling [`Transaction::commit`] rolls it back.

use thiserror::Error;

use crate::payload::{
    EventChanges, MarketChanges, NewEvent, NewMarket, NewMarketEvent, NewSport, SelectionRecord,
    SelectionUpdate, SportChanges,
};
use crate::types::*;

/// Storage failures, already classified by the backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate {entity}: {detail}")]
    DuplicateKey { entity: EntityKind, detail: String },
    /// A foreign-key constraint rejected the write.
    #[error("{entity} references a missing row: {detail}")]
    ForeignKey { entity: EntityKind, detail: String },
    #[error("storage error: {0}")]
    Backend(String),
}

/// Typed reads and writes over the five catalog tables.
///
/// `update_*` and `delete_*` return `false` when no row has the given id.
pub trait Repository {
    // Sports
    fn insert_sport(&self, sport: &NewSport) -> Result<Id, StoreError>;
    fn find_sport(&self, id: Id) -> Result<Option<Sport>, StoreError>;
    fn update_sport(&self, id: Id, changes: &SportChanges) -> Result<bool, StoreError>;
    fn delete_sport(&self, id: Id) -> Result<bool, StoreError>;
    fn set_sport_active(&self, id: Id, active: bool) -> Result<bool, StoreError>;
    fn count_events_for_sport(&self, sport_id: Id) -> Result<i64, StoreError>;

    // Events
    fn insert_event(&self, event: &NewEvent, active: bool) -> Result<Id, StoreError>;
    fn find_event(&self, id: Id) -> Result<Option<Event>, StoreError>;
    /// Writes every present field except `sport_id`, which is immutable.
    fn update_event(&self, id: Id, changes: &EventChanges) -> Result<bool, StoreError>;
    fn delete_event(&self, id: Id) -> Result<bool, StoreError>;
    fn set_event_active(&self, id: Id, active: bool) -> Result<bool, StoreError>;
    fn count_market_events_for_event(&self, event_id: Id) -> Result<i64, StoreError>;

    // Markets
    fn insert_market(&self, market: &NewMarket) -> Result<Id, StoreError>;
    fn find_market(&self, id: Id) -> Result<Option<Market>, StoreError>;
    fn update_market(&self, id: Id, changes: &MarketChanges) -> Result<bool, StoreError>;
    fn delete_market(&self, id: Id) -> Result<bool, StoreError>;
    fn set_market_active(&self, id: Id, active: bool) -> Result<bool, StoreError>;
    fn count_market_events_for_market(&self, market_id: Id) -> Result<i64, StoreError>;

    // Market events
    fn insert_market_event(&self, market_event: &NewMarketEvent) -> Result<Id, StoreError>;
    fn find_market_event(&self, id: Id) -> Result<Option<MarketEvent>, StoreError>;
    fn find_active_market_event(
        &self,
        market_id: Id,
        event_id: Id,
    ) -> Result<Option<MarketEvent>, StoreError>;
    fn delete_market_event(&self, id: Id) -> Result<bool, StoreError>;

    // Selections
    fn insert_selection(&self, selection: &SelectionRecord) -> Result<Id, StoreError>;
    fn find_selection(&self, id: Id) -> Result<Option<Selection>, StoreError>;
    fn update_selection(&self, id: Id, update: &SelectionUpdate) -> Result<bool, StoreError>;
    fn delete_selection(&self, id: Id) -> Result<bool, StoreError>;
    /// Count selections on a join row, ignoring `excluding` if given.
    fn count_selections_for_market_event(
        &self,
        marketevent_id: Id,
        excluding: Option<Id>,
    ) -> Result<i64, StoreError>;

    // Searches
    fn search_catalog(&self, keyword: &str) -> Result<Vec<CatalogRow>, StoreError>;
    fn search_sports(&self, keyword: &str) -> Result<Vec<Sport>, StoreError>;
    fn search_events(&self, keyword: &str) -> Result<Vec<Event>, StoreError>;
    fn search_markets(&self, keyword: &str) -> Result<Vec<Market>, StoreError>;
    fn search_selections(&self, keyword: &str) -> Result<Vec<Selection>, StoreError>;
    fn activity_above(&self, threshold: i64) -> Result<Vec<ActivityRow>, StoreError>;
}

/// An open unit of work. Dropping it without committing discards its writes.
pub trait Transaction: Repository {
    fn commit(self) -> Result<(), StoreError>;
}

/// Source of transactions.
pub trait Store {
    type Tx<'a>: Transaction
    where
        Self: 'a;

    /// Open a transaction for reads only.
    fn read(&mut self) -> Result<Self::Tx<'_>, StoreError>;

    /// Open a transaction that takes the write lock up front.
    fn write(&mut self) -> Result<Self::Tx<'_>, StoreError>;
}
