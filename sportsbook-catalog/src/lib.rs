//! Betting catalog data model, command payloads, and the repository interface.
//!
//! This crate defines the catalog's records and the commands that act on them
//! without any database dependencies. `sportsbook-db` implements the
//! [`Store`] traits over SQLite; `sportsbook-engine` applies the consistency
//! rules through them.

pub mod payload;
pub mod repository;
pub mod types;

pub use payload::{
    parse, CreateCommand, DeleteCommand, EventChanges, MarketChanges, NewEvent, NewMarket,
    NewMarketEvent, NewSelection, NewSport, PayloadError, SearchFilter, SelectionChanges,
    SelectionRecord, SelectionUpdate, SportChanges, Target, Update, UpdateCommand,
};
pub use repository::{Repository, Store, StoreError, Transaction};
pub use types::*;
