//! Handlers for fertilizer advice, dosage, product conversion and field
//! recommendations.

use agrisensa_core::fertilizer::{
    calculate_dosage, fertilizer_bags, recommend_fertilizer, DosageAmounts,
    FertilizerRecommendation, SoilConditions, DEFAULT_SOIL_PH,
};
use agrisensa_core::knowledge::{IntegratedRecommendation, SprayingPlan};
use agrisensa_core::models::ArtifactName;
use agrisensa_core::numeric::{require_f64, NumericInput};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::response::{data, DataPayload, Success};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Model-backed fertilizer recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FertilizerRequest {
    pub ph_tanah: Option<NumericInput>,
    pub skor_bwd: Option<NumericInput>,
    pub kelembaban_tanah: Option<NumericInput>,
    pub umur_tanaman_hari: Option<NumericInput>,
}

impl FertilizerRequest {
    fn conditions(&self) -> Result<SoilConditions, AppError> {
        Ok(SoilConditions {
            ph_tanah: require_f64(self.ph_tanah.as_ref(), "ph_tanah")?,
            skor_bwd: require_f64(self.skor_bwd.as_ref(), "skor_bwd")?,
            kelembaban_tanah: require_f64(self.kelembaban_tanah.as_ref(), "kelembaban_tanah")?,
            umur_tanaman_hari: require_f64(self.umur_tanaman_hari.as_ref(), "umur_tanaman_hari")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationPayload {
    pub recommendation: FertilizerRecommendation,
}

/// POST /api/recommendation/fertilizer
pub async fn fertilizer(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<FertilizerRequest>,
) -> AppResult<Json<Success<RecommendationPayload>>> {
    let conditions = input.conditions()?;
    let model = state.models.get(ArtifactName::Recommendation).await?;
    let recommendation = recommend_fertilizer(&conditions, model.regressor()?)?;

    Ok(Json(Success::new(RecommendationPayload { recommendation })))
}

// ---------------------------------------------------------------------------
// Dosage calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DosageRequest {
    pub commodity: Option<String>,
    pub area_sqm: Option<NumericInput>,
    pub ph_tanah: Option<NumericInput>,
}

#[derive(Debug, Serialize)]
pub struct DosagePayload {
    pub data: DosageAmounts,
    pub commodity_name: String,
    pub area_sqm: f64,
}

/// POST /api/recommendation/dosage
///
/// Product amounts for a commodity over an area in square metres.
pub async fn dosage(
    ApiJson(input): ApiJson<DosageRequest>,
) -> AppResult<Json<Success<DosagePayload>>> {
    let area_sqm = input
        .area_sqm
        .as_ref()
        .map_or(Ok(0.0), |v| v.to_f64("area_sqm"))?;
    let ph = input
        .ph_tanah
        .as_ref()
        .map_or(Ok(DEFAULT_SOIL_PH), |v| v.to_f64("ph_tanah"))?;

    let plan = calculate_dosage(input.commodity.as_deref().unwrap_or_default(), area_sqm, ph)?;

    Ok(Json(Success::new(DosagePayload {
        data: plan.results,
        commodity_name: plan.commodity_name,
        area_sqm: plan.area_sqm,
    })))
}

// ---------------------------------------------------------------------------
// Nutrient to product conversion
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BagRequest {
    pub nutrient_needed: Option<String>,
    pub nutrient_amount_kg: Option<NumericInput>,
    pub fertilizer_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BagPayload {
    pub required_fertilizer_kg: f64,
    pub fertilizer_name: String,
    pub nutrient_needed: String,
    pub nutrient_amount_kg: f64,
    pub fertilizer_type: String,
}

/// POST /api/recommendation/fertilizer-bags
pub async fn bags(
    ApiJson(input): ApiJson<BagRequest>,
) -> AppResult<Json<Success<BagPayload>>> {
    let (Some(nutrient), Some(fertilizer_type)) = (input.nutrient_needed, input.fertilizer_type)
    else {
        return Err(AppError::BadRequest(
            "nutrient_needed and fertilizer_type are required".into(),
        ));
    };
    let amount = require_f64(input.nutrient_amount_kg.as_ref(), "nutrient_amount_kg")?;

    let calc = fertilizer_bags(&nutrient, amount, &fertilizer_type)?;

    Ok(Json(Success::new(BagPayload {
        required_fertilizer_kg: calc.required_kg,
        fertilizer_name: calc.fertilizer_name,
        nutrient_needed: calc.nutrient_needed,
        nutrient_amount_kg: calc.nutrient_amount_kg,
        fertilizer_type,
    })))
}

// ---------------------------------------------------------------------------
// Integrated and spraying recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct IntegratedRequest {
    pub ketinggian: Option<String>,
    pub iklim: Option<String>,
    pub fase: Option<String>,
    pub masalah: Option<String>,
}

/// POST /api/recommendation/integrated
///
/// Seed, fertilization and spraying advice; unknown keys get generic advice.
pub async fn integrated(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<IntegratedRequest>,
) -> Json<Success<DataPayload<IntegratedRecommendation>>> {
    Json(data(state.knowledge.integrated_recommendation(
        input.ketinggian.as_deref(),
        input.iklim.as_deref(),
        input.fase.as_deref(),
        input.masalah.as_deref(),
    )))
}

#[derive(Debug, Deserialize)]
pub struct SprayingRequest {
    pub pest: Option<String>,
}

/// POST /api/recommendation/spraying
///
/// Rotation strategy for a pest plus the general spraying protocol.
pub async fn spraying(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SprayingRequest>,
) -> AppResult<Json<Success<DataPayload<SprayingPlan>>>> {
    let plan = state
        .knowledge
        .spraying_plan(input.pest.as_deref().unwrap_or_default())?;
    Ok(Json(data(plan)))
}
