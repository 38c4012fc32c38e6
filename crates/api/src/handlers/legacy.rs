//! Adapters for the old frontend, which sends lookup keys in POST bodies
//! instead of the path.

use agrisensa_core::knowledge::{CommodityGuide, CropKnowledge};
use agrisensa_core::market::{current_prices, MarketQuote, PriceHistory, DEFAULT_HISTORY_DAYS};
use agrisensa_core::numeric::NumericInput;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::handlers::market::price_series;
use crate::response::{data, DataPayload, Success};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CommodityRequest {
    #[serde(default)]
    pub commodity: String,
    pub range: Option<NumericInput>,
}

/// POST /api/legacy/get-prices
pub async fn get_prices(
    ApiJson(input): ApiJson<CommodityRequest>,
) -> AppResult<Json<Success<DataPayload<MarketQuote>>>> {
    let quote = current_prices(&input.commodity, &mut rand::rng())?;
    Ok(Json(data(quote)))
}

/// POST /api/legacy/get-knowledge
pub async fn get_knowledge(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CommodityRequest>,
) -> AppResult<Json<Success<DataPayload<CropKnowledge>>>> {
    Ok(Json(data(state.knowledge.crop(&input.commodity)?.clone())))
}

/// POST /api/legacy/get-commodity-guide
pub async fn get_commodity_guide(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CommodityRequest>,
) -> AppResult<Json<Success<DataPayload<CommodityGuide>>>> {
    Ok(Json(data(
        state.knowledge.commodity_guide(&input.commodity)?.clone(),
    )))
}

/// POST /api/legacy/get-historical-prices
pub async fn get_historical_prices(
    ApiJson(input): ApiJson<CommodityRequest>,
) -> AppResult<Json<Success<PriceHistory>>> {
    let days = match &input.range {
        Some(range) => i64::from(range.to_i32("range")?),
        None => DEFAULT_HISTORY_DAYS,
    };
    Ok(Json(Success::new(price_series(&input.commodity, days)?)))
}
