//! Conversion from API payloads to client rows.
//!
//! The backend is loose about response shapes, so every list endpoint goes
//! through an explicit classification step with a defined fallback instead
//! of ad hoc type checks.

use crate::state::{ArbiPairRow, ArbiTrackRow, decimal_from_value};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Placeholder for a missing exchange name.
const MISSING_EXCHANGE: &str = "N/A";

/// Shape of a list response.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload {
    /// A bare JSON array.
    Bare(Vec<Value>),
    /// An object wrapping the array under a known key.
    Wrapped(Vec<Value>),
    /// Anything else.
    Unrecognized,
}

impl ListPayload {
    /// Classify `value`, looking for the array under `wrapper_keys` when it
    /// is an object.
    pub fn classify(value: Value, wrapper_keys: &[&str]) -> Self {
        match value {
            Value::Array(items) => Self::Bare(items),
            Value::Object(mut map) => wrapper_keys
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .map_or(Self::Unrecognized, Self::Wrapped),
            _ => Self::Unrecognized,
        }
    }

    /// Items of the list; empty when unrecognized.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Bare(items) | Self::Wrapped(items) => items,
            Self::Unrecognized => Vec::new(),
        }
    }
}

/// Decode list items, skipping those that do not fit `T`.
pub fn parse_list<T: DeserializeOwned>(value: Value, wrapper_keys: &[&str]) -> Vec<T> {
    let payload = ListPayload::classify(value, wrapper_keys);
    if payload == ListPayload::Unrecognized {
        warn!("Unrecognized list payload, treating as empty");
    }

    payload
        .into_items()
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!("Skipping undecodable row: {}", e);
                None
            }
        })
        .collect()
}

/// Pair endpoint body: a bare array or `{ "results": [...] }`.
pub fn parse_pairs(value: Value) -> Vec<ArbiPairRow> {
    parse_list(value, &["results"])
}

/// Track endpoint body: an object mapping coin symbol to stats.
pub fn parse_track(value: Value) -> Vec<ArbiTrackRow> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(coin, stats)| format_track_row(coin, stats))
            .collect(),
        _ => {
            warn!("ArbiTrack payload is not an object, treating as empty");
            Vec::new()
        }
    }
}

/// Format one coin's stats into a display row.
pub fn format_track_row(coin: &str, stats: &Value) -> ArbiTrackRow {
    let exchange = |key: &str| {
        stats
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(MISSING_EXCHANGE)
            .to_string()
    };
    let fixed = |key: &str| fixed_2(stats.get(key).and_then(decimal_from_value));

    ArbiTrackRow {
        coin1: coin.to_string(),
        min_exchange: exchange("lowestExchange"),
        min_price1: fixed("lowestPrice"),
        max_exchange: exchange("highestExchange"),
        max_price1: fixed("highestPrice"),
        profit_percentage: fixed("profitPercentage"),
    }
}

/// Two-decimal fixed-point string, half away from zero; missing is zero.
fn fixed_2(value: Option<Decimal>) -> String {
    let rounded = value
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}
