//! Route definitions for leaf and soil analysis.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

/// Routes mounted at `/analysis`.
///
/// ```text
/// POST /bwd          -> analyze_bwd
/// POST /npk          -> analyze_npk
/// GET  /npk/history  -> npk_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bwd", post(analysis::analyze_bwd))
        .route("/npk", post(analysis::analyze_npk))
        .route("/npk/history", get(analysis::npk_history))
}
