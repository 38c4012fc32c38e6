use axum::routing::get;
use axum::Router;

use crate::handlers::market;
use crate::state::AppState;

/// Routes mounted at `/market`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prices/{commodity}", get(market::prices))
        .route("/ticker", get(market::ticker))
        .route("/history/{commodity}", get(market::history))
}
