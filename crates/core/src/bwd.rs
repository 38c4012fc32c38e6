//! Leaf color chart (Bagan Warna Daun) scoring.
//!
//! Combines [`leaf_color::extract`] with a classifier artifact that maps the
//! mean vegetation hue to an integer BWD score.

use serde::Serialize;

use crate::error::CoreError;
use crate::leaf_color::{self, VegetationBand};
use crate::models::artifact::{argmax, Classifier};
use crate::numeric::round2;

/// A scored leaf. Only produced when at least one vegetation pixel was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub bwd_score: i64,
    #[serde(rename = "avg_hue_value")]
    pub avg_hue: f64,
    #[serde(rename = "confidence_percent")]
    pub confidence: f64,
}

/// Classify a single hue value.
///
/// The returned `avg_hue` is the input rounded to two decimals.
pub fn classify_hue(classifier: &dyn Classifier, hue: f64) -> Result<ScoreResult, CoreError> {
    if !hue.is_finite() {
        return Err(CoreError::Validation(format!(
            "hue must be a finite number, got {hue}"
        )));
    }

    let proba = classifier.predict_proba(&[hue])?;
    let best = argmax(&proba)
        .ok_or_else(|| CoreError::Internal("classifier produced no probabilities".into()))?;
    let label = &classifier.classes()[best];
    let bwd_score = label.as_integer().ok_or_else(|| CoreError::ModelUnavailable {
        name: "bwd",
        reason: format!("class label '{label}' is not an integer score"),
    })?;

    Ok(ScoreResult {
        bwd_score,
        avg_hue: round2(hue),
        confidence: round2(proba[best] * 100.0),
    })
}

/// Run the full pipeline on raw image bytes.
///
/// `Ok(None)` means the image decoded but contained no vegetation.
pub fn score_leaf(
    image_bytes: &[u8],
    band: &VegetationBand,
    classifier: &dyn Classifier,
) -> Result<Option<ScoreResult>, CoreError> {
    let Some(sample) = leaf_color::extract(image_bytes, band)? else {
        return Ok(None);
    };
    tracing::debug!(
        mean_hue = sample.mean_hue,
        pixel_count = sample.pixel_count,
        "Leaf hue extracted"
    );
    classify_hue(classifier, sample.mean_hue).map(Some)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::leaf_color::tests::{png_bytes, solid};
    use crate::leaf_color::DEFAULT_VEGETATION_BAND;
    use crate::models::artifact::{ClassLabel, GaussianNb, ModelArtifact};

    fn bwd_model() -> ModelArtifact {
        ModelArtifact::GaussianNb(GaussianNb {
            classes: vec![
                ClassLabel::Integer(2),
                ClassLabel::Integer(3),
                ClassLabel::Integer(4),
                ClassLabel::Integer(5),
            ],
            theta: vec![vec![75.0], vec![62.0], vec![50.0], vec![40.0]],
            var: vec![vec![16.0]; 4],
            class_prior: vec![0.25; 4],
        })
    }

    #[test]
    fn green_leaf_is_scored() {
        let model = bwd_model();
        let clf = model.as_classifier().unwrap();
        let bytes = png_bytes(solid(10, 10, [0, 255, 0]));

        let result = score_leaf(&bytes, &DEFAULT_VEGETATION_BAND, clf)
            .unwrap()
            .expect("green image has vegetation");
        assert_eq!(result.bwd_score, 3);
        assert_eq!(result.avg_hue, 60.0);
        assert!(result.confidence > 0.0 && result.confidence <= 100.0);
    }

    #[test]
    fn no_vegetation_yields_no_score() {
        let model = bwd_model();
        let bytes = png_bytes(solid(10, 10, [255, 0, 0]));
        let result = score_leaf(&bytes, &DEFAULT_VEGETATION_BAND, model.as_classifier().unwrap());
        assert_matches!(result, Ok(None));
    }

    #[test]
    fn decode_errors_propagate() {
        let model = bwd_model();
        assert_matches!(
            score_leaf(b"garbage", &DEFAULT_VEGETATION_BAND, model.as_classifier().unwrap()),
            Err(CoreError::ImageDecode(_))
        );
    }

    #[test]
    fn non_finite_hue_is_rejected() {
        let model = bwd_model();
        let clf = model.as_classifier().unwrap();
        for hue in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_matches!(classify_hue(clf, hue), Err(CoreError::Validation(_)));
        }
    }

    #[test]
    fn out_of_range_hue_still_classified() {
        let model = bwd_model();
        let result = classify_hue(model.as_classifier().unwrap(), 500.0).unwrap();
        assert_eq!(result.bwd_score, 2);
    }

    #[test]
    fn classification_is_idempotent() {
        let model = bwd_model();
        let clf = model.as_classifier().unwrap();
        assert_eq!(classify_hue(clf, 55.556).unwrap(), classify_hue(clf, 55.556).unwrap());
        assert_eq!(classify_hue(clf, 55.556).unwrap().avg_hue, 55.56);
    }

    #[test]
    fn text_labels_that_are_not_scores_are_rejected() {
        let model = ModelArtifact::GaussianNb(GaussianNb {
            classes: vec![ClassLabel::Text("hijau".into())],
            theta: vec![vec![60.0]],
            var: vec![vec![1.0]],
            class_prior: vec![1.0],
        });
        assert_matches!(
            classify_hue(model.as_classifier().unwrap(), 60.0),
            Err(CoreError::ModelUnavailable { .. })
        );
    }

    #[test]
    fn serializes_with_frontend_field_names() {
        let result = ScoreResult {
            bwd_score: 4,
            avg_hue: 48.25,
            confidence: 87.5,
        };
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"bwd_score": 4, "avg_hue_value": 48.25, "confidence_percent": 87.5})
        );
    }
}
