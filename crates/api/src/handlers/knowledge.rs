//! Read-only lookups into the static knowledge base.

use std::collections::BTreeMap;

use agrisensa_core::fertilizer::{fertilizer_catalog, FertilizerProduct};
use agrisensa_core::knowledge::{CommodityGuide, CropKnowledge, DiagnosticNode, PhKnowledge};
use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppResult;
use crate::response::{data, DataPayload, Success};
use crate::state::AppState;

type DataJson<T> = Json<Success<DataPayload<T>>>;

/// GET /api/knowledge/crops/{commodity}
pub async fn crop(
    State(state): State<AppState>,
    Path(commodity): Path<String>,
) -> AppResult<DataJson<CropKnowledge>> {
    Ok(Json(data(state.knowledge.crop(&commodity)?.clone())))
}

/// GET /api/knowledge/guides/{commodity}
///
/// Cultivation SOP and a per-hectare business analysis.
pub async fn commodity_guide(
    State(state): State<AppState>,
    Path(commodity): Path<String>,
) -> AppResult<DataJson<CommodityGuide>> {
    Ok(Json(data(state.knowledge.commodity_guide(&commodity)?.clone())))
}

/// GET /api/knowledge/ph
pub async fn ph_info(State(state): State<AppState>) -> DataJson<PhKnowledge> {
    Json(data(state.knowledge.ph_knowledge().clone()))
}

/// GET /api/knowledge/diagnostic-tree
pub async fn diagnostic_tree(
    State(state): State<AppState>,
) -> DataJson<BTreeMap<String, DiagnosticNode>> {
    Json(data(state.knowledge.diagnostic_tree().clone()))
}

/// GET /api/knowledge/fertilizers
///
/// Nutrient fractions of the supported fertilizer products.
pub async fn fertilizers() -> DataJson<BTreeMap<&'static str, FertilizerProduct>> {
    Json(data(fertilizer_catalog()))
}
