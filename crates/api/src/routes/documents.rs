use axum::routing::get;
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list).post(documents::upload))
        .route("/{filename}", get(documents::view))
}
