use axum::routing::get;
use axum::Router;

use crate::handlers::system;
use crate::state::AppState;

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(system::health_check))
}
