//! Consistency rules and search dispatch for the betting catalog.
//!
//! [`CatalogEngine`] wraps a [`sportsbook_catalog::Store`] and runs each
//! command in its own transaction: creates cascade activation up the
//! hierarchy, selection moves clean up orphaned market events, and deletes
//! are refused while dependents remain.

pub mod cancel;
pub mod consistency;
pub mod engine;
pub mod error;
pub mod search;

pub use cancel::CancellationToken;
pub use engine::{CatalogEngine, Command, Outcome};
pub use error::CommandError;
