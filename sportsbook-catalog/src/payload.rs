//! Command payloads and their JSON decoding.
//!
//! Each command arrives as a single-key JSON object whose key names the
//! entity kind (or search filter). Decoding goes straight into closed enums
//! so the engine never inspects raw JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::types::{EntityKind, Id, Price};

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{kind} update has no values")]
    EmptyUpdate { kind: EntityKind },
}

/// Decode a command payload from JSON text.
pub fn parse<T: DeserializeOwned>(json: &str) -> Result<T, PayloadError> {
    Ok(serde_json::from_str(json)?)
}

// ── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateCommand {
    Sport(NewSport),
    Event(NewEvent),
    Market(NewMarket),
    Selection(NewSelection),
}

impl CreateCommand {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Sport(_) => EntityKind::Sport,
            Self::Event(_) => EntityKind::Event,
            Self::Market(_) => EntityKind::Market,
            Self::Selection(_) => EntityKind::Selection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSport {
    pub name: String,
    pub display_name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub active: bool,
}

/// Events are always stored active; an `active` key in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEvent {
    #[serde(deserialize_with = "lenient::int")]
    pub sport_id: Id,
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::int")]
    pub kind: i64,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub status: Option<i64>,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMarket {
    pub name: String,
    pub display_name: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub schema: i64,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub columns: Option<i64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub active: bool,
}

/// A selection as submitted: it names the market and event, not the join row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSelection {
    #[serde(deserialize_with = "lenient::int")]
    pub market_id: Id,
    #[serde(deserialize_with = "lenient::int")]
    pub event_id: Id,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub outcome: Option<String>,
}

/// Join row to insert once the engine has decided one is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewMarketEvent {
    pub market_id: Id,
    pub event_id: Id,
    pub active: bool,
}

/// Selection row as written to storage, bound to a resolved join row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRecord {
    pub marketevent_id: Id,
    pub name: String,
    pub price: Price,
    pub outcome: Option<String>,
    pub active: bool,
}

// ── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateCommand {
    Sport(Update<SportChanges>),
    Event(Update<EventChanges>),
    Market(Update<MarketChanges>),
    Selection(Update<SelectionChanges>),
}

impl UpdateCommand {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Sport(_) => EntityKind::Sport,
            Self::Event(_) => EntityKind::Event,
            Self::Market(_) => EntityKind::Market,
            Self::Selection(_) => EntityKind::Selection,
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Self::Sport(u) => u.id,
            Self::Event(u) => u.id,
            Self::Market(u) => u.id,
            Self::Selection(u) => u.id,
        }
    }

    /// Reject updates that carry no values at all.
    pub fn validate(&self) -> Result<(), PayloadError> {
        let empty = match self {
            Self::Sport(u) => u.values.is_empty(),
            Self::Event(u) => u.values.is_empty(),
            Self::Market(u) => u.values.is_empty(),
            Self::Selection(u) => u.values.is_empty(),
        };
        if empty {
            return Err(PayloadError::EmptyUpdate { kind: self.kind() });
        }
        Ok(())
    }
}

/// Target id plus the subset of fields to change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Update<T> {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Id,
    pub values: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SportChanges {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub active: Option<bool>,
}

impl SportChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `sport_id` is decoded so the engine can refuse it; storage never writes it.
/// It is `Some` whenever the key is present, even as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventChanges {
    #[serde(default, deserialize_with = "lenient::present_int")]
    pub sport_id: Option<Option<Id>>,
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_int")]
    pub kind: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub status: Option<i64>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub active: Option<bool>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketChanges {
    pub name: Option<String>,
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub schema: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub columns: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub active: Option<bool>,
}

impl MarketChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Selection changes as submitted. An omitted `market_id` or `event_id`
/// keeps the value of the selection's current join row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionChanges {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub market_id: Option<Id>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub event_id: Option<Id>,
    pub name: Option<String>,
    pub price: Option<Price>,
    pub outcome: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_flag")]
    pub active: Option<bool>,
}

impl SelectionChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Selection changes as written to storage, after the join row is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionUpdate {
    pub marketevent_id: Option<Id>,
    pub name: Option<String>,
    pub price: Option<Price>,
    pub outcome: Option<String>,
    pub active: Option<bool>,
}

// ── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteCommand {
    Sport(Target),
    Event(Target),
    Market(Target),
    Selection(Target),
}

impl DeleteCommand {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Sport(_) => EntityKind::Sport,
            Self::Event(_) => EntityKind::Event,
            Self::Market(_) => EntityKind::Market,
            Self::Selection(_) => EntityKind::Selection,
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Self::Sport(t) | Self::Event(t) | Self::Market(t) | Self::Selection(t) => t.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Target {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Id,
}

// ── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    /// Substring match across sport, event, market and selection names.
    All(String),
    Sport(String),
    Event(String),
    Market(String),
    Selection(String),
    /// Entities with more than this many active children.
    Active(#[serde(deserialize_with = "lenient::int")] i64),
}

// ── Lenient Scalars ─────────────────────────────────────────────────────────

/// Deserializers accepting the quoted numbers and 0/1 flags that operators
/// tend to type into JSON by hand.
mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntLike {
        Int(i64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    fn to_int<E: serde::de::Error>(v: IntLike) -> Result<i64, E> {
        match v {
            IntLike::Int(i) => Ok(i),
            IntLike::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected an integer, found \"{s}\""))),
        }
    }

    fn to_bool<E: serde::de::Error>(v: BoolLike) -> Result<bool, E> {
        match v {
            BoolLike::Bool(b) => Ok(b),
            BoolLike::Int(0) => Ok(false),
            BoolLike::Int(1) => Ok(true),
            BoolLike::Int(i) => Err(E::custom(format!("expected 0 or 1, found {i}"))),
            BoolLike::Text(s) => match s.trim().to_lowercase().as_str() {
                "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                _ => Err(E::custom(format!("expected a boolean, found \"{s}\""))),
            },
        }
    }

    pub(super) fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        to_int(IntLike::deserialize(d)?)
    }

    pub(super) fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Option::<IntLike>::deserialize(d)?.map(to_int).transpose()
    }

    /// Only called when the key exists, so `null` still yields `Some(None)`.
    pub(super) fn present_int<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<i64>>, D::Error> {
        opt_int(d).map(Some)
    }

    pub(super) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        to_bool(BoolLike::deserialize(d)?)
    }

    pub(super) fn opt_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Option::<BoolLike>::deserialize(d)?.map(to_bool).transpose()
    }
}
