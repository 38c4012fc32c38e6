pub mod analysis;
pub mod documents;
pub mod health;
pub mod knowledge;
pub mod legacy;
pub mod market;
pub mod ml;
pub mod recommendation;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /info                                 service description
///
/// /analysis/bwd                         leaf color score (POST)
/// /analysis/npk                         NPK analysis (POST)
/// /analysis/npk/history                 caller's readings (GET, auth)
///
/// /recommendation/fertilizer            model-backed N/P/K advice (POST)
/// /recommendation/dosage                per-area product amounts (POST)
/// /recommendation/fertilizer-bags       nutrient to product kg (POST)
/// /recommendation/integrated            seed/fertilizer/spray advice (POST)
/// /recommendation/spraying              pest rotation strategy (POST)
///
/// /knowledge/crops/{commodity}          crop knowledge
/// /knowledge/guides/{commodity}         SOP and business analysis
/// /knowledge/ph                         soil pH guide
/// /knowledge/diagnostic-tree            symptom decision tree
/// /knowledge/fertilizers                product compositions
///
/// /market/prices/{commodity}            market board
/// /market/ticker                        ticker prices
/// /market/history/{commodity}           price series (?range=)
///
/// /ml/recommend-crop                    crop recommendation (POST)
/// /ml/predict-yield                     yield (POST)
/// /ml/predict-yield-advanced            explained yield (POST)
/// /ml/predict-success                   success probability (POST)
/// /ml/yield-plan                        reverse yield plan (POST)
///
/// /documents                            upload (POST), list (GET)
/// /documents/{filename}                 download
///
/// /legacy/*                             old frontend paths
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/info", get(handlers::system::api_info))
        .nest("/analysis", analysis::router())
        .nest("/recommendation", recommendation::router())
        .nest("/knowledge", knowledge::router())
        .nest("/market", market::router())
        .nest("/ml", ml::router())
        .nest("/documents", documents::router())
        .nest("/legacy", legacy::router())
}
