//! Data model types for the betting catalog.
//!
//! These types represent the persistent catalog schema: sports, events,
//! markets, the market/event join rows, and priced selections, plus the row
//! shapes returned by searches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned row identifier.
pub type Id = i64;

// ── Entity Kinds ────────────────────────────────────────────────────────────

/// The five entity types held by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sport,
    Event,
    Market,
    MarketEvent,
    Selection,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sport => "sport",
            Self::Event => "event",
            Self::Market => "market",
            Self::MarketEvent => "market_event",
            Self::Selection => "selection",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Price ───────────────────────────────────────────────────────────────────

/// A non-negative decimal price with two fractional digits.
///
/// Held as integer hundredths so arithmetic and storage stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,
    #[error("price must not be negative: {0}")]
    Negative(String),
    #[error("price has more than two fractional digits: {0}")]
    TooPrecise(String),
    #[error("price is not a decimal number: {0}")]
    Invalid(String),
    #[error("price is out of range: {0}")]
    Overflow(String),
}

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceError::Empty);
        }
        if s.starts_with('-') {
            return Err(PriceError::Negative(s.to_string()));
        }
        let digits = s.strip_prefix('+').unwrap_or(s);

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(PriceError::Invalid(s.to_string()));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(PriceError::Invalid(s.to_string()));
        }
        if frac.len() > 2 {
            return Err(PriceError::TooPrecise(s.to_string()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| PriceError::Overflow(s.to_string()))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| PriceError::Invalid(s.to_string()))? * 10,
            _ => frac.parse().map_err(|_| PriceError::Invalid(s.to_string()))?,
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Price)
            .ok_or_else(|| PriceError::Overflow(s.to_string()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // JSON numbers are re-read through their text form so 1.85 stays 1.85.
        let value = serde_json::Value::deserialize(deserializer)?;
        let text = match &value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a price, found {other}"
                )));
            }
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ── Sport ───────────────────────────────────────────────────────────────────

/// Root of the catalog hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sport {
    pub id: Id,
    pub name: String,
    pub display_name: String,
    pub slug: String,
    pub order: Option<i64>,
    pub active: bool,
}

// ── Event ───────────────────────────────────────────────────────────────────

/// A fixture under exactly one sport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: Id,
    pub sport_id: Id,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub status: Option<i64>,
    pub slug: String,
    pub active: bool,
}

// ── Market ──────────────────────────────────────────────────────────────────

/// A market definition, attached to events only through [`MarketEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Market {
    pub id: Id,
    pub name: String,
    pub display_name: String,
    pub order: Option<i64>,
    pub schema: i64,
    pub columns: Option<i64>,
    pub active: bool,
}

// ── MarketEvent ─────────────────────────────────────────────────────────────

/// Join row linking one market to one event. Selections hang off this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketEvent {
    pub id: Id,
    pub market_id: Id,
    pub event_id: Id,
    pub active: bool,
}

// ── Selection ───────────────────────────────────────────────────────────────

/// A priced outcome under one market/event pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub id: Id,
    pub marketevent_id: Id,
    pub name: String,
    pub price: Price,
    pub outcome: Option<String>,
    pub active: bool,
}

// ── Search Rows ─────────────────────────────────────────────────────────────

/// One path through the sport → event → market → selection join.
///
/// Everything below the sport is optional because the join is outer: a
/// sport without events still produces a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    pub sport: Sport,
    pub event: Option<Event>,
    pub market_event: Option<MarketEvent>,
    pub market: Option<Market>,
    pub selection: Option<Selection>,
}

/// Which level of the hierarchy an activity row counts children for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Active events per sport.
    Sport,
    /// Active selections per event.
    Event,
    /// Active selections per market.
    Market,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sport => "sport",
            Self::Event => "event",
            Self::Market => "market",
        }
    }

    /// Parse the tag written by [`ActivityKind::as_str`].
    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "sport" => Some(Self::Sport),
            "event" => Some(Self::Event),
            "market" => Some(Self::Market),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity whose active-descendant count passed a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub id: Id,
    pub name: String,
    pub active_count: i64,
}

/// Rows produced by a search, one variant per filter shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Catalog(Vec<CatalogRow>),
    Sports(Vec<Sport>),
    Events(Vec<Event>),
    Markets(Vec<Market>),
    Selections(Vec<Selection>),
    Activity(Vec<ActivityRow>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            Self::Catalog(rows) => rows.len(),
            Self::Sports(rows) => rows.len(),
            Self::Events(rows) => rows.len(),
            Self::Markets(rows) => rows.len(),
            Self::Selections(rows) => rows.len(),
            Self::Activity(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
