//! Arbitrage rows shown on the dashboard.

use super::table_state::TableRow;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A cross-exchange opportunity for a coin pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbiPairRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub pair: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub coin1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub coin2: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub min_exchange: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub min_price1: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub min_price2: Decimal,
    #[serde(default, deserialize_with = "lenient_string")]
    pub max_exchange: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub max_price1: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub max_price2: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub profit_percentage: Decimal,
}

/// Per-coin best spread across exchanges, pre-formatted for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbiTrackRow {
    pub coin1: String,
    pub min_exchange: String,
    pub min_price1: String,
    pub max_exchange: String,
    pub max_price1: String,
    pub profit_percentage: String,
}

/// Read a JSON number or numeric string as a decimal.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::from_str(&f.to_string()).ok())
            }
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value).unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Compare numeric display strings; unparseable values ("N/A") sort first.
fn cmp_numeric_str(a: &str, b: &str) -> Ordering {
    match (Decimal::from_str(a), Decimal::from_str(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Sortable columns of the pair table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairColumn {
    Pair,
    MinExchange,
    MinPrice1,
    MinPrice2,
    MaxExchange,
    MaxPrice1,
    MaxPrice2,
    Profit,
}

impl fmt::Display for PairColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            Self::Pair => "Pair",
            Self::MinExchange => "Buy On",
            Self::MinPrice1 => "Buy Px 1",
            Self::MinPrice2 => "Buy Px 2",
            Self::MaxExchange => "Sell On",
            Self::MaxPrice1 => "Sell Px 1",
            Self::MaxPrice2 => "Sell Px 2",
            Self::Profit => "Profit %",
        };
        f.write_str(title)
    }
}

impl TableRow for ArbiPairRow {
    type Column = PairColumn;

    const COLUMNS: &'static [PairColumn] = &[
        PairColumn::Pair,
        PairColumn::MinExchange,
        PairColumn::MinPrice1,
        PairColumn::MinPrice2,
        PairColumn::MaxExchange,
        PairColumn::MaxPrice1,
        PairColumn::MaxPrice2,
        PairColumn::Profit,
    ];
    const DEFAULT_SORT: PairColumn = PairColumn::Profit;

    fn compare_by(&self, other: &Self, column: PairColumn) -> Ordering {
        match column {
            PairColumn::Pair => self.pair.cmp(&other.pair),
            PairColumn::MinExchange => self.min_exchange.cmp(&other.min_exchange),
            PairColumn::MinPrice1 => self.min_price1.cmp(&other.min_price1),
            PairColumn::MinPrice2 => self.min_price2.cmp(&other.min_price2),
            PairColumn::MaxExchange => self.max_exchange.cmp(&other.max_exchange),
            PairColumn::MaxPrice1 => self.max_price1.cmp(&other.max_price1),
            PairColumn::MaxPrice2 => self.max_price2.cmp(&other.max_price2),
            PairColumn::Profit => self.profit_percentage.cmp(&other.profit_percentage),
        }
    }

    fn matches(&self, query_lower: &str) -> bool {
        [
            &self.pair,
            &self.coin1,
            &self.coin2,
            &self.min_exchange,
            &self.max_exchange,
        ]
        .iter()
        .any(|field| contains_ci(field, query_lower))
    }
}

/// Sortable columns of the track table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackColumn {
    Coin,
    MinExchange,
    MinPrice,
    MaxExchange,
    MaxPrice,
    Profit,
}

impl fmt::Display for TrackColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            Self::Coin => "Coin",
            Self::MinExchange => "Lowest On",
            Self::MinPrice => "Lowest Px",
            Self::MaxExchange => "Highest On",
            Self::MaxPrice => "Highest Px",
            Self::Profit => "Profit %",
        };
        f.write_str(title)
    }
}

impl TableRow for ArbiTrackRow {
    type Column = TrackColumn;

    const COLUMNS: &'static [TrackColumn] = &[
        TrackColumn::Coin,
        TrackColumn::MinExchange,
        TrackColumn::MinPrice,
        TrackColumn::MaxExchange,
        TrackColumn::MaxPrice,
        TrackColumn::Profit,
    ];
    const DEFAULT_SORT: TrackColumn = TrackColumn::Profit;

    fn compare_by(&self, other: &Self, column: TrackColumn) -> Ordering {
        match column {
            TrackColumn::Coin => self.coin1.cmp(&other.coin1),
            TrackColumn::MinExchange => self.min_exchange.cmp(&other.min_exchange),
            TrackColumn::MinPrice => cmp_numeric_str(&self.min_price1, &other.min_price1),
            TrackColumn::MaxExchange => self.max_exchange.cmp(&other.max_exchange),
            TrackColumn::MaxPrice => cmp_numeric_str(&self.max_price1, &other.max_price1),
            TrackColumn::Profit => {
                cmp_numeric_str(&self.profit_percentage, &other.profit_percentage)
            }
        }
    }

    fn matches(&self, query_lower: &str) -> bool {
        [&self.coin1, &self.min_exchange, &self.max_exchange]
            .iter()
            .any(|field| contains_ci(field, query_lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pair_row_accepts_numbers_strings_and_nulls() {
        let row: ArbiPairRow = serde_json::from_str(
            r#"{
                "pair": "ETH/BTC",
                "coin1": "ETH",
                "coin2": "BTC",
                "minExchange": "binance",
                "minPrice1": 3000.5,
                "minPrice2": "62000",
                "maxExchange": null,
                "maxPrice1": null,
                "profitPercentage": 1.25
            }"#,
        )
        .unwrap();

        assert_eq!(row.min_price1, dec!(3000.5));
        assert_eq!(row.min_price2, dec!(62000));
        assert_eq!(row.max_exchange, "");
        assert_eq!(row.max_price1, Decimal::ZERO);
        assert_eq!(row.max_price2, Decimal::ZERO);
        assert_eq!(row.profit_percentage, dec!(1.25));
    }

    #[test]
    fn test_track_numeric_sort_puts_na_first() {
        let a = ArbiTrackRow {
            profit_percentage: "N/A".to_string(),
            ..Default::default()
        };
        let b = ArbiTrackRow {
            profit_percentage: "10.00".to_string(),
            ..Default::default()
        };
        let c = ArbiTrackRow {
            profit_percentage: "9.50".to_string(),
            ..Default::default()
        };
        assert_eq!(a.compare_by(&b, TrackColumn::Profit), Ordering::Less);
        assert_eq!(b.compare_by(&c, TrackColumn::Profit), Ordering::Greater);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let row = ArbiPairRow {
            pair: "SOL/USDT".to_string(),
            min_exchange: "Kraken".to_string(),
            ..Default::default()
        };
        assert!(row.matches("sol"));
        assert!(row.matches("kraken"));
        assert!(!row.matches("binance"));
    }
}
