//! Simulated commodity prices.
//!
//! Prices are base prices perturbed by a caller-supplied random source, so the
//! handlers use the thread RNG and tests use a seeded one.

use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// Maximum percent deviation of a current market price from its base.
pub const PRICE_VARIATION_PCT: i32 = 5;
/// Maximum percent deviation of a ticker price from its base.
pub const TICKER_VARIATION_PCT: i32 = 2;
/// Maximum relative change of one step of the historical random walk.
pub const HISTORY_STEP: f64 = 0.05;

pub const DEFAULT_HISTORY_DAYS: i64 = 30;
pub const MAX_HISTORY_DAYS: i64 = 365;

// ---------------------------------------------------------------------------
// Reference prices
// ---------------------------------------------------------------------------

struct MarketBoard {
    key: &'static str,
    name: &'static str,
    unit: &'static str,
    /// (market, base price in rupiah)
    markets: &'static [(&'static str, i64)],
}

const MARKET_BOARDS: &[MarketBoard] = &[
    MarketBoard {
        key: "cabai_merah_keriting",
        name: "Cabai Merah Keriting",
        unit: "kg",
        markets: &[("Pasar Induk", 45_000), ("Supermarket", 55_000), ("Ekspor", 75_000)],
    },
    MarketBoard {
        key: "bawang_merah",
        name: "Bawang Merah",
        unit: "kg",
        markets: &[("Pasar Induk", 30_000), ("Supermarket", 40_000), ("Ekspor", 50_000)],
    },
];

struct TrackedCommodity {
    key: &'static str,
    ticker_name: &'static str,
    history_name: &'static str,
    base_price: i64,
    unit: &'static str,
}

const TRACKED: &[TrackedCommodity] = &[
    TrackedCommodity {
        key: "cabai_merah_keriting",
        ticker_name: "Cabai Merah",
        history_name: "Cabai Merah Keriting",
        base_price: 45_000,
        unit: "kg",
    },
    TrackedCommodity {
        key: "bawang_merah",
        ticker_name: "Bawang Merah",
        history_name: "Bawang Merah",
        base_price: 30_000,
        unit: "kg",
    },
    TrackedCommodity {
        key: "jagung_pipilan",
        ticker_name: "Jagung Pipilan",
        history_name: "Jagung Pipilan",
        base_price: 5_500,
        unit: "kg",
    },
    TrackedCommodity {
        key: "beras_medium",
        ticker_name: "Beras Medium",
        history_name: "Beras Medium",
        base_price: 12_000,
        unit: "kg",
    },
];

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketQuote {
    pub name: String,
    pub unit: String,
    /// `(market, price)` pairs in board order, serialized as an object.
    #[serde(serialize_with = "ordered_map")]
    pub prices: Vec<(String, i64)>,
}

impl MarketQuote {
    pub fn price(&self, market: &str) -> Option<i64> {
        self.prices
            .iter()
            .find(|(name, _)| name == market)
            .map(|(_, price)| *price)
    }
}

fn ordered_map<S>(pairs: &[(String, i64)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(pairs.iter().map(|(k, v)| (k, v)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerEntry {
    pub name: String,
    pub price: i64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistory {
    pub commodity_name: String,
    pub labels: Vec<String>,
    pub prices: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

fn vary(base: i64, percent: i32) -> i64 {
    (base as f64 * (1.0 + f64::from(percent) / 100.0)) as i64
}

/// Today's price at each market for `commodity`.
pub fn current_prices(commodity: &str, rng: &mut impl Rng) -> Result<MarketQuote, CoreError> {
    let board = MARKET_BOARDS
        .iter()
        .find(|b| b.key == commodity)
        .ok_or_else(|| CoreError::not_found("MarketPrice", commodity))?;

    let prices = board
        .markets
        .iter()
        .map(|(market, base)| {
            let pct = rng.random_range(-PRICE_VARIATION_PCT..=PRICE_VARIATION_PCT);
            (market.to_string(), vary(*base, pct))
        })
        .collect();

    Ok(MarketQuote {
        name: board.name.to_string(),
        unit: board.unit.to_string(),
        prices,
    })
}

/// One live-looking price per tracked commodity.
pub fn ticker_prices(rng: &mut impl Rng) -> Vec<TickerEntry> {
    TRACKED
        .iter()
        .map(|c| {
            let pct = rng.random_range(-TICKER_VARIATION_PCT..=TICKER_VARIATION_PCT);
            TickerEntry {
                name: c.ticker_name.to_string(),
                price: vary(c.base_price, pct),
                unit: c.unit.to_string(),
            }
        })
        .collect()
}

/// A random-walk price series of `days` points ending on `today`.
pub fn historical_prices(
    commodity: &str,
    days: i64,
    today: NaiveDate,
    rng: &mut impl Rng,
) -> Result<PriceHistory, CoreError> {
    if commodity.trim().is_empty() {
        return Err(CoreError::Validation("commodity is required".into()));
    }
    if !(1..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(CoreError::Validation(format!(
            "range must be between 1 and {MAX_HISTORY_DAYS} days, got {days}"
        )));
    }
    let tracked = TRACKED
        .iter()
        .find(|c| c.key == commodity)
        .ok_or_else(|| CoreError::not_found("PriceHistory", commodity))?;

    let mut labels = Vec::with_capacity(days as usize);
    let mut prices = Vec::with_capacity(days as usize);
    let mut price = tracked.base_price;

    for offset in (0..days as u64).rev() {
        let date = today
            .checked_sub_days(Days::new(offset))
            .ok_or_else(|| CoreError::Internal("date out of range".into()))?;
        labels.push(date.format("%d %b").to_string());

        let change = rng.random_range(-HISTORY_STEP..=HISTORY_STEP);
        price = (price as f64 * (1.0 + change)) as i64;
        if price < 0 {
            price = tracked.base_price;
        }
        prices.push(price);
    }

    Ok(PriceHistory {
        commodity_name: tracked.history_name.to_string(),
        labels,
        prices,
    })
}
