use axum::routing::post;
use axum::Router;

use crate::handlers::recommendation;
use crate::state::AppState;

/// Routes mounted at `/recommendation`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fertilizer", post(recommendation::fertilizer))
        .route("/dosage", post(recommendation::dosage))
        .route("/fertilizer-bags", post(recommendation::bags))
        .route("/integrated", post(recommendation::integrated))
        .route("/spraying", post(recommendation::spraying))
}
