//! Handlers for the model-backed predictions and the yield planner.

use agrisensa_core::models::ArtifactName;
use agrisensa_core::numeric::NumericInput;
use agrisensa_core::predictions::{
    predict_success, predict_yield, predict_yield_explained, recommend_crop, CropConditions,
    ExplainedYield, GrowingConditions, SuccessPrediction,
};
use agrisensa_core::yield_plan::{generate_yield_plan, YieldDataset, YieldPlan};
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::response::Success;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CropPayload {
    pub recommended_crop: String,
}

/// POST /api/ml/recommend-crop
pub async fn crop(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CropConditions>,
) -> AppResult<Json<Success<CropPayload>>> {
    let model = state.models.get(ArtifactName::CropRecommendation).await?;
    let recommended_crop = recommend_crop(&input, model.classifier()?)?;
    Ok(Json(Success::new(CropPayload { recommended_crop })))
}

#[derive(Debug, Serialize)]
pub struct YieldPayload {
    pub predicted_yield_ton_ha: f64,
}

/// POST /api/ml/predict-yield
pub async fn yield_prediction(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<GrowingConditions>,
) -> AppResult<Json<Success<YieldPayload>>> {
    let model = state.models.get(ArtifactName::YieldPrediction).await?;
    let predicted_yield_ton_ha = predict_yield(&input, model.regressor()?)?;
    Ok(Json(Success::new(YieldPayload {
        predicted_yield_ton_ha,
    })))
}

/// POST /api/ml/predict-yield-advanced
///
/// Yield prediction with feature importances and per-feature contributions.
pub async fn yield_explained(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<GrowingConditions>,
) -> AppResult<Json<Success<ExplainedYield>>> {
    let model = state.models.get(ArtifactName::AdvancedYield).await?;
    let explainer = state.models.get(ArtifactName::ShapExplainer).await?;
    let result = predict_yield_explained(&input, model.regressor()?, explainer.explainer()?)?;
    Ok(Json(Success::new(result)))
}

/// POST /api/ml/predict-success
pub async fn success_probability(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<GrowingConditions>,
) -> AppResult<Json<Success<SuccessPrediction>>> {
    let model = state.models.get(ArtifactName::SuccessModel).await?;
    let prediction = predict_success(&input, model.classifier()?)?;
    Ok(Json(Success::new(prediction)))
}

#[derive(Debug, Deserialize)]
pub struct YieldPlanRequest {
    /// Target yield in tonnes per hectare.
    pub target_yield: Option<NumericInput>,
}

#[derive(Debug, Serialize)]
pub struct PlanPayload {
    pub plan: YieldPlan,
}

/// POST /api/ml/yield-plan
///
/// Inputs of the historical field whose yield is closest to the target.
pub async fn yield_plan(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<YieldPlanRequest>,
) -> AppResult<Json<Success<PlanPayload>>> {
    let target = input
        .target_yield
        .as_ref()
        .map_or(Ok(0.0), |v| v.to_f64("target_yield"))?;
    let dataset = YieldDataset::load(&state.config.dataset_path).await?;
    let plan = generate_yield_plan(&dataset, target)?;
    Ok(Json(Success::new(PlanPayload { plan })))
}
