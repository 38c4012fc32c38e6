//! Simulated market price handlers.
//!
//! Prices are generated per request from fixed base prices; the random
//! source is the thread-local generator.

use agrisensa_core::market::{
    current_prices, historical_prices, ticker_prices, MarketQuote, PriceHistory, TickerEntry,
    DEFAULT_HISTORY_DAYS,
};
use axum::extract::{Path, Query};
use axum::Json;
use chrono::Local;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::{data, DataPayload, Success};

/// GET /api/market/prices/{commodity}
pub async fn prices(
    Path(commodity): Path<String>,
) -> AppResult<Json<Success<DataPayload<MarketQuote>>>> {
    let quote = current_prices(&commodity, &mut rand::rng())?;
    Ok(Json(data(quote)))
}

/// GET /api/market/ticker
pub async fn ticker() -> Json<Success<DataPayload<Vec<TickerEntry>>>> {
    Json(data(ticker_prices(&mut rand::rng())))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Number of days, 1 to 365.
    pub range: Option<i64>,
}

/// GET /api/market/history/{commodity}?range=
pub async fn history(
    Path(commodity): Path<String>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<Success<PriceHistory>>> {
    let series = price_series(&commodity, params.range.unwrap_or(DEFAULT_HISTORY_DAYS))?;
    Ok(Json(Success::new(series)))
}

/// Random-walk series ending today (server local date).
pub fn price_series(commodity: &str, days: i64) -> AppResult<PriceHistory> {
    let today = Local::now().date_naive();
    Ok(historical_prices(commodity, days, today, &mut rand::rng())?)
}
