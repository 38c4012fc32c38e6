use axum::routing::post;
use axum::Router;

use crate::handlers::ml;
use crate::state::AppState;

/// Routes mounted at `/ml`.
///
/// ```text
/// POST /recommend-crop          -> crop
/// POST /predict-yield           -> yield_prediction
/// POST /predict-yield-advanced  -> yield_explained
/// POST /predict-success         -> success_probability
/// POST /yield-plan              -> yield_plan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recommend-crop", post(ml::crop))
        .route("/predict-yield", post(ml::yield_prediction))
        .route("/predict-yield-advanced", post(ml::yield_explained))
        .route("/predict-success", post(ml::success_probability))
        .route("/yield-plan", post(ml::yield_plan))
}
