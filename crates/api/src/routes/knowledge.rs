use axum::routing::get;
use axum::Router;

use crate::handlers::knowledge;
use crate::state::AppState;

/// Routes mounted at `/knowledge`.
///
/// ```text
/// GET /crops/{commodity}   -> crop
/// GET /guides/{commodity}  -> commodity_guide
/// GET /ph                  -> ph_info
/// GET /diagnostic-tree     -> diagnostic_tree
/// GET /fertilizers         -> fertilizers
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/crops/{commodity}", get(knowledge::crop))
        .route("/guides/{commodity}", get(knowledge::commodity_guide))
        .route("/ph", get(knowledge::ph_info))
        .route("/diagnostic-tree", get(knowledge::diagnostic_tree))
        .route("/fertilizers", get(knowledge::fertilizers))
}
