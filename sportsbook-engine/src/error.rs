use sportsbook_catalog::{EntityKind, Id, PayloadError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),
    #[error("{kind} {id} does not exist")]
    ParentNotFound { kind: EntityKind, id: Id },
    #[error("Duplicate {kind}: {detail}")]
    DuplicateKey { kind: EntityKind, detail: String },
    #[error("Cannot delete {kind} {id}: {count} {dependent} row(s) still reference it")]
    HasDependents {
        kind: EntityKind,
        id: Id,
        dependent: EntityKind,
        count: i64,
    },
    #[error("{kind}.{field} cannot be changed")]
    ImmutableField {
        kind: EntityKind,
        field: &'static str,
    },
    #[error("No {kind} with id {id}")]
    NotFound { kind: EntityKind, id: Id },
    #[error("Command cancelled")]
    Cancelled,
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey { entity, detail } => CommandError::DuplicateKey {
                kind: entity,
                detail,
            },
            // Parents are looked up before every write, so a foreign-key
            // rejection here means the store changed underneath us.
            e @ StoreError::ForeignKey { .. } => CommandError::Storage(e.to_string()),
            StoreError::Backend(msg) => CommandError::Storage(msg),
        }
    }
}
