//! Model-backed agronomic predictions.
//!
//! Inputs are loosely typed client payloads; absent fields are fed to the
//! models as `0.0`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{ArtifactName, Classifier, Explainer, Regressor};
use crate::numeric::{checked_round2, feature_or_zero, round2, NumericInput};

const KG_PER_TONNE: f64 = 1000.0;

/// Feature names of the yield models, in model order.
pub const YIELD_FEATURES: [&str; 6] = [
    "Nitrogen",
    "Phosphorus",
    "Potassium",
    "Temperature",
    "Rainfall",
    "pH",
];

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Soil and weather readings for the crop recommender.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CropConditions {
    pub n_value: Option<NumericInput>,
    pub p_value: Option<NumericInput>,
    pub k_value: Option<NumericInput>,
    pub temperature: Option<NumericInput>,
    pub humidity: Option<NumericInput>,
    pub ph: Option<NumericInput>,
    pub rainfall: Option<NumericInput>,
}

impl CropConditions {
    pub fn features(&self) -> Result<[f64; 7], CoreError> {
        Ok([
            feature_or_zero(self.n_value.as_ref(), "n_value")?,
            feature_or_zero(self.p_value.as_ref(), "p_value")?,
            feature_or_zero(self.k_value.as_ref(), "k_value")?,
            feature_or_zero(self.temperature.as_ref(), "temperature")?,
            feature_or_zero(self.humidity.as_ref(), "humidity")?,
            feature_or_zero(self.ph.as_ref(), "ph")?,
            feature_or_zero(self.rainfall.as_ref(), "rainfall")?,
        ])
    }
}

/// Inputs shared by the yield and success models.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrowingConditions {
    pub nitrogen: Option<NumericInput>,
    pub phosphorus: Option<NumericInput>,
    pub potassium: Option<NumericInput>,
    pub temperature: Option<NumericInput>,
    pub rainfall: Option<NumericInput>,
    pub ph: Option<NumericInput>,
}

impl GrowingConditions {
    pub fn features(&self) -> Result<[f64; 6], CoreError> {
        Ok([
            feature_or_zero(self.nitrogen.as_ref(), "nitrogen")?,
            feature_or_zero(self.phosphorus.as_ref(), "phosphorus")?,
            feature_or_zero(self.potassium.as_ref(), "potassium")?,
            feature_or_zero(self.temperature.as_ref(), "temperature")?,
            feature_or_zero(self.rainfall.as_ref(), "rainfall")?,
            feature_or_zero(self.ph.as_ref(), "ph")?,
        ])
    }
}

// ---------------------------------------------------------------------------
// Crop recommendation
// ---------------------------------------------------------------------------

/// The most suitable crop, capitalized for display.
pub fn recommend_crop(
    conditions: &CropConditions,
    model: &dyn Classifier,
) -> Result<String, CoreError> {
    let label = model.predict(&conditions.features()?)?;
    Ok(capitalize(&label.to_string()))
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Yield
// ---------------------------------------------------------------------------

fn first_output(model: &dyn Regressor, features: &[f64], name: ArtifactName) -> Result<f64, CoreError> {
    model
        .predict(features)?
        .first()
        .copied()
        .ok_or_else(|| CoreError::ModelUnavailable {
            name: name.as_str(),
            reason: "model produced no output".into(),
        })
}

/// Predicted yield in tonnes per hectare.
pub fn predict_yield(
    conditions: &GrowingConditions,
    model: &dyn Regressor,
) -> Result<f64, CoreError> {
    let kg_ha = first_output(model, &conditions.features()?, ArtifactName::YieldPrediction)?;
    checked_round2(kg_ha / KG_PER_TONNE)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedYield {
    pub predicted_yield_ton_ha: f64,
    /// `(feature, importance)` pairs, most important first.
    pub feature_importances: Vec<(&'static str, f64)>,
    /// Per-feature contribution to the prediction, in kg/ha.
    pub shap_values: BTreeMap<&'static str, f64>,
    /// Model output for an average field, in t/ha.
    pub base_value: f64,
}

/// Yield prediction with global importances and a per-input explanation.
pub fn predict_yield_explained(
    conditions: &GrowingConditions,
    model: &dyn Regressor,
    explainer: &dyn Explainer,
) -> Result<ExplainedYield, CoreError> {
    let features = conditions.features()?;
    let kg_ha = first_output(model, &features, ArtifactName::AdvancedYield)?;

    let importances = model
        .feature_importances()
        .ok_or_else(|| CoreError::ModelUnavailable {
            name: ArtifactName::AdvancedYield.as_str(),
            reason: "artifact has no feature importances".into(),
        })?;
    let mut ranked: Vec<(&'static str, f64)> =
        YIELD_FEATURES.iter().copied().zip(importances.iter().copied()).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let contributions = explainer.contributions(&features)?;
    let shap_values = YIELD_FEATURES
        .iter()
        .copied()
        .zip(contributions)
        .map(|(feature, value)| checked_round2(value).map(|v| (feature, v)))
        .collect::<Result<_, _>>()?;

    Ok(ExplainedYield {
        predicted_yield_ton_ha: checked_round2(kg_ha / KG_PER_TONNE)?,
        feature_importances: ranked,
        shap_values,
        base_value: round2(explainer.expected_value() / KG_PER_TONNE),
    })
}

// ---------------------------------------------------------------------------
// Success probability
// ---------------------------------------------------------------------------

pub const STATUS_SUCCESS: &str = "Berhasil";
pub const STATUS_AT_RISK: &str = "Berisiko Tinggi";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessPrediction {
    pub status: &'static str,
    pub probability_of_success: f64,
}

/// Probability that a planting under `conditions` succeeds.
///
/// Class `1` is success.
pub fn predict_success(
    conditions: &GrowingConditions,
    model: &dyn Classifier,
) -> Result<SuccessPrediction, CoreError> {
    let features = conditions.features()?;
    let success_idx = model
        .classes()
        .iter()
        .position(|c| c.as_integer() == Some(1))
        .ok_or_else(|| CoreError::ModelUnavailable {
            name: ArtifactName::SuccessModel.as_str(),
            reason: "model has no success class".into(),
        })?;

    let label = model.predict(&features)?;
    let proba = model.predict_proba(&features)?;
    let status = if label.as_integer() == Some(1) {
        STATUS_SUCCESS
    } else {
        STATUS_AT_RISK
    };

    Ok(SuccessPrediction {
        status,
        probability_of_success: round2(proba[success_idx] * 100.0),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::models::artifact::{
        ClassLabel, LinearExplainer, LinearRegression, LogisticRegression,
    };

    fn growing(n: f64, ph: f64) -> GrowingConditions {
        GrowingConditions {
            nitrogen: Some(n.into()),
            ph: Some(ph.into()),
            ..Default::default()
        }
    }

    #[test]
    fn capitalize_matches_display_convention() {
        assert_eq!(capitalize("rice"), "Rice");
        assert_eq!(capitalize("MAIZE"), "Maize");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn crop_recommendation_capitalizes_label() {
        let model = LogisticRegression {
            classes: vec![ClassLabel::Text("rice".into()), ClassLabel::Text("coffee".into())],
            coef: vec![vec![0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]],
            intercept: vec![-5.0],
        };
        let wet = CropConditions {
            n_value: Some(NumericInput::Integer(10)),
            ..Default::default()
        };
        assert_eq!(recommend_crop(&wet, &model).unwrap(), "Rice");
        let rich = CropConditions {
            n_value: Some(NumericInput::Text("120".into())),
            ..Default::default()
        };
        assert_eq!(recommend_crop(&rich, &model).unwrap(), "Coffee");
    }

    #[test]
    fn missing_fields_default_to_zero() {
        assert_eq!(GrowingConditions::default().features().unwrap(), [0.0; 6]);
        assert_eq!(CropConditions::default().features().unwrap(), [0.0; 7]);
    }

    #[test]
    fn non_numeric_field_is_validation_error() {
        let conditions = GrowingConditions {
            rainfall: Some(NumericInput::Text("deras".into())),
            ..Default::default()
        };
        assert_matches!(conditions.features(), Err(CoreError::Validation(_)));
    }

    fn yield_model(with_importances: bool) -> LinearRegression {
        LinearRegression {
            coef: vec![vec![20.0, 0.0, 0.0, 0.0, 0.0, 100.0]],
            intercept: vec![1000.0],
            feature_importances: with_importances
                .then(|| vec![0.3, 0.05, 0.05, 0.1, 0.2, 0.3]),
        }
    }

    #[test]
    fn yield_is_converted_to_tonnes() {
        let t_ha = predict_yield(&growing(100.0, 6.5), &yield_model(false)).unwrap();
        assert_eq!(t_ha, 3.65);
    }

    #[test]
    fn explained_yield_ranks_importances_and_rounds_contributions() {
        let explainer = LinearExplainer {
            expected_value: 2500.0,
            coef: vec![20.0, 0.0, 0.0, 0.0, 0.0, 100.0],
            feature_means: vec![50.0, 0.0, 0.0, 0.0, 0.0, 6.123],
        };
        let result =
            predict_yield_explained(&growing(100.0, 6.5), &yield_model(true), &explainer)
                .unwrap();

        assert_eq!(result.predicted_yield_ton_ha, 3.65);
        assert_eq!(result.base_value, 2.5);
        assert_eq!(result.feature_importances[0], ("Nitrogen", 0.3));
        assert_eq!(result.feature_importances[1], ("pH", 0.3));
        assert_eq!(result.feature_importances.last().unwrap().1, 0.05);
        assert_eq!(result.shap_values["Nitrogen"], 1000.0);
        assert_eq!(result.shap_values["pH"], 37.7);
        assert_eq!(result.shap_values["Rainfall"], 0.0);
    }

    #[test]
    fn explained_yield_needs_importances() {
        let explainer = LinearExplainer {
            expected_value: 0.0,
            coef: vec![0.0; 6],
            feature_means: vec![0.0; 6],
        };
        assert_matches!(
            predict_yield_explained(&growing(1.0, 1.0), &yield_model(false), &explainer),
            Err(CoreError::ModelUnavailable { name: "advanced_yield", .. })
        );
    }

    fn success_model() -> LogisticRegression {
        LogisticRegression {
            classes: vec![ClassLabel::Integer(0), ClassLabel::Integer(1)],
            coef: vec![vec![0.05, 0.0, 0.0, 0.0, 0.0, 0.0]],
            intercept: vec![-5.0],
        }
    }

    #[test]
    fn success_prediction_reports_class_one_probability() {
        let good = predict_success(&growing(200.0, 6.5), &success_model()).unwrap();
        assert_eq!(good.status, STATUS_SUCCESS);
        assert!(good.probability_of_success > 50.0);

        let poor = predict_success(&growing(20.0, 6.5), &success_model()).unwrap();
        assert_eq!(poor.status, STATUS_AT_RISK);
        assert!(poor.probability_of_success < 50.0);

        let even = predict_success(&growing(100.0, 0.0), &success_model()).unwrap();
        assert_eq!(even.probability_of_success, 50.0);
    }

    #[test]
    fn overflowing_inputs_are_out_of_range() {
        let huge = growing(1e308, 6.5);

        assert_matches!(
            predict_yield(&huge, &yield_model(false)),
            Err(CoreError::Validation(m)) if m == "input out of range"
        );

        let steep = LogisticRegression {
            classes: vec![ClassLabel::Integer(0), ClassLabel::Integer(1), ClassLabel::Integer(2)],
            coef: vec![vec![10.0, 0.0, 0.0, 0.0, 0.0, 0.0]; 3],
            intercept: vec![0.0; 3],
        };
        assert_matches!(
            predict_success(&huge, &steep),
            Err(CoreError::Validation(m)) if m == "input out of range"
        );
    }

    #[test]
    fn success_model_without_class_one_is_unavailable() {
        let model = LogisticRegression {
            classes: vec![ClassLabel::Integer(2), ClassLabel::Integer(3)],
            coef: vec![vec![0.0; 6]],
            intercept: vec![0.0],
        };
        assert_matches!(
            predict_success(&GrowingConditions::default(), &model),
            Err(CoreError::ModelUnavailable { name: "success_model", .. })
        );
    }
}
