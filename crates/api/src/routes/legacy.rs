//! Old frontend paths, mapped onto the current handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{analysis, documents, knowledge, legacy, market, ml, recommendation};
use crate::state::AppState;

/// Routes mounted at `/legacy`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analysis::analyze_bwd))
        .route("/analyze-npk", post(analysis::analyze_npk))
        .route("/recommendation", post(recommendation::fertilizer))
        .route("/calculate-fertilizer", post(recommendation::dosage))
        .route("/calculate-fertilizer-bags", post(recommendation::bags))
        .route(
            "/get-integrated-recommendation",
            post(recommendation::integrated),
        )
        .route("/get-spraying-recommendation", post(recommendation::spraying))
        .route("/get-prices", post(legacy::get_prices))
        .route("/get-ticker-prices", get(market::ticker))
        .route("/get-historical-prices", post(legacy::get_historical_prices))
        .route("/get-knowledge", post(legacy::get_knowledge))
        .route("/get-commodity-guide", post(legacy::get_commodity_guide))
        .route("/get-ph-info", get(knowledge::ph_info))
        .route("/get-diagnostic-tree", get(knowledge::diagnostic_tree))
        .route("/recommend-crop", post(ml::crop))
        .route("/predict-yield", post(ml::yield_prediction))
        .route("/predict-yield-advanced", post(ml::yield_explained))
        .route("/predict-success", post(ml::success_probability))
        .route("/generate-yield-plan", post(ml::yield_plan))
        .route("/upload-pdf", post(documents::upload))
        .route("/get-pdfs", get(documents::list))
        .route("/view-pdf/{filename}", get(documents::view))
}
