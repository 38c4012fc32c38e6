//! Service health and discovery.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::response::Success;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    /// Always `"healthy"` while the process serves requests.
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Success<HealthPayload>> {
    let db_healthy = agrisensa_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Database health check failed");
    }

    Json(Success::new(HealthPayload {
        status: "healthy",
        message: "AgriSensa API is running",
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    }))
}

#[derive(Debug, Serialize)]
pub struct EndpointMap {
    pub analysis: &'static str,
    pub recommendation: &'static str,
    pub knowledge: &'static str,
    pub market: &'static str,
    pub ml: &'static str,
    pub documents: &'static str,
    pub legacy: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InfoPayload {
    pub api_name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: EndpointMap,
}

/// GET /api/info
pub async fn api_info() -> Json<Success<InfoPayload>> {
    Json(Success::new(InfoPayload {
        api_name: "AgriSensa API",
        version: "2.0.0",
        description: "Smart Agriculture Platform for Indonesian Farmers",
        endpoints: EndpointMap {
            analysis: "/api/analysis",
            recommendation: "/api/recommendation",
            knowledge: "/api/knowledge",
            market: "/api/market",
            ml: "/api/ml",
            documents: "/api/documents",
            legacy: "/api/legacy",
        },
    }))
}
