//! Rule-based NPK soil nutrient advisor.
//!
//! Each nutrient is banded into low / optimal / excess against fixed
//! inclusive optimal ranges, with one advisory line per band.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::numeric::NumericInput;

/// Optimal nitrogen range (inclusive).
pub const NITROGEN_OPTIMAL: (i32, i32) = (100, 200);
/// Optimal phosphorus range (inclusive).
pub const PHOSPHORUS_OPTIMAL: (i32, i32) = (20, 40);
/// Optimal potassium range (inclusive).
pub const POTASSIUM_OPTIMAL: (i32, i32) = (150, 250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutrientStatus {
    Rendah,
    Optimal,
    Berlebih,
}

impl NutrientStatus {
    fn classify(value: i32, (low, high): (i32, i32)) -> Self {
        if value < low {
            NutrientStatus::Rendah
        } else if value > high {
            NutrientStatus::Berlebih
        } else {
            NutrientStatus::Optimal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientAssessment {
    pub value: i32,
    pub label: NutrientStatus,
    pub rekomendasi: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpkAnalysis {
    #[serde(rename = "Nitrogen (N)")]
    pub nitrogen: NutrientAssessment,
    #[serde(rename = "Fosfor (P)")]
    pub phosphorus: NutrientAssessment,
    #[serde(rename = "Kalium (K)")]
    pub potassium: NutrientAssessment,
}

#[derive(Clone, Copy)]
enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    fn optimal_range(self) -> (i32, i32) {
        match self {
            Nutrient::Nitrogen => NITROGEN_OPTIMAL,
            Nutrient::Phosphorus => PHOSPHORUS_OPTIMAL,
            Nutrient::Potassium => POTASSIUM_OPTIMAL,
        }
    }

    fn advice(self, status: NutrientStatus) -> &'static str {
        use NutrientStatus::*;
        match (self, status) {
            (Nutrient::Nitrogen, Optimal) => {
                "Nitrogen level is optimal. Maintain current fertilization."
            }
            (Nutrient::Nitrogen, Rendah) => {
                "Nitrogen is low. Increase Urea or organic nitrogen sources."
            }
            (Nutrient::Nitrogen, Berlebih) => {
                "Nitrogen is excessive. Reduce nitrogen fertilizers to prevent lodging."
            }
            (Nutrient::Phosphorus, Optimal) => {
                "Phosphorus level is optimal. Important for root and flower development."
            }
            (Nutrient::Phosphorus, Rendah) => "Phosphorus is low. Apply SP-36 or rock phosphate.",
            (Nutrient::Phosphorus, Berlebih) => {
                "Phosphorus is excessive. May interfere with micronutrient uptake."
            }
            (Nutrient::Potassium, Optimal) => {
                "Potassium level is optimal. Important for fruit quality."
            }
            (Nutrient::Potassium, Rendah) => {
                "Potassium is low. Apply KCL or organic potassium sources."
            }
            (Nutrient::Potassium, Berlebih) => "Potassium is excessive. May cause salt stress.",
        }
    }

    fn assess(self, value: i32) -> NutrientAssessment {
        let label = NutrientStatus::classify(value, self.optimal_range());
        NutrientAssessment {
            value,
            label,
            rekomendasi: self.advice(label).to_string(),
        }
    }
}

/// Band each nutrient and attach its advisory line. Total and pure.
pub fn advise(n: i32, p: i32, k: i32) -> NpkAnalysis {
    NpkAnalysis {
        nitrogen: Nutrient::Nitrogen.assess(n),
        phosphorus: Nutrient::Phosphorus.assess(p),
        potassium: Nutrient::Potassium.assess(k),
    }
}

/// Optional field context recorded alongside a reading.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ReadingContext {
    #[validate(range(min = 0.0, max = 14.0))]
    pub ph_value: Option<f64>,
    pub temperature: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: Option<f64>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

impl ReadingContext {
    /// Range-check the context. Non-finite temperatures are rejected too.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        if self.temperature.is_some_and(|t| !t.is_finite()) {
            return Err(CoreError::Validation("temperature must be a number".into()));
        }
        Ok(())
    }
}

/// Reading context as sent by clients. Numbers may arrive as JSON numbers or
/// numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingContextInput {
    pub ph_value: Option<NumericInput>,
    pub temperature: Option<NumericInput>,
    pub humidity: Option<NumericInput>,
    pub location: Option<String>,
}

impl ReadingContextInput {
    /// Coerce the numeric fields and range-check the result.
    pub fn resolve(self) -> Result<ReadingContext, CoreError> {
        let number = |value: Option<NumericInput>, field: &str| {
            value.map(|v| v.to_f64(field)).transpose()
        };
        let context = ReadingContext {
            ph_value: number(self.ph_value, "ph_value")?,
            temperature: number(self.temperature, "temperature")?,
            humidity: number(self.humidity, "humidity")?,
            location: self.location,
        };
        context.check()?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use NutrientStatus::*;

    fn labels(a: &NpkAnalysis) -> [NutrientStatus; 3] {
        [a.nitrogen.label, a.phosphorus.label, a.potassium.label]
    }

    #[test]
    fn mid_range_values_are_optimal() {
        assert_eq!(labels(&advise(150, 30, 200)), [Optimal; 3]);
    }

    #[test]
    fn low_values_are_rendah() {
        assert_eq!(labels(&advise(50, 10, 100)), [Rendah; 3]);
    }

    #[test]
    fn high_values_are_berlebih() {
        assert_eq!(labels(&advise(250, 50, 300)), [Berlebih; 3]);
    }

    #[test]
    fn lower_bounds_are_inclusive() {
        assert_eq!(labels(&advise(100, 20, 150)), [Optimal; 3]);
        assert_eq!(labels(&advise(99, 19, 149)), [Rendah; 3]);
    }

    #[test]
    fn upper_bounds_are_inclusive() {
        assert_eq!(labels(&advise(200, 40, 250)), [Optimal; 3]);
        assert_eq!(labels(&advise(201, 41, 251)), [Berlebih; 3]);
    }

    #[test]
    fn negative_values_are_low() {
        assert_eq!(labels(&advise(-1, -1, -1)), [Rendah; 3]);
    }

    #[test]
    fn advice_matches_band() {
        let a = advise(50, 30, 300);
        assert_eq!(
            a.nitrogen.rekomendasi,
            "Nitrogen is low. Increase Urea or organic nitrogen sources."
        );
        assert_eq!(
            a.phosphorus.rekomendasi,
            "Phosphorus level is optimal. Important for root and flower development."
        );
        assert_eq!(
            a.potassium.rekomendasi,
            "Potassium is excessive. May cause salt stress."
        );
    }

    #[test]
    fn serializes_with_display_keys() {
        let json = serde_json::to_value(advise(150, 30, 200)).unwrap();
        assert_eq!(json["Nitrogen (N)"]["value"], 150);
        assert_eq!(json["Fosfor (P)"]["label"], "Optimal");
        assert_eq!(
            json["Kalium (K)"]["rekomendasi"],
            "Potassium level is optimal. Important for fruit quality."
        );
    }

    #[test]
    fn reading_context_accepts_plausible_values() {
        let ctx = ReadingContext {
            ph_value: Some(6.5),
            temperature: Some(28.0),
            humidity: Some(80.0),
            location: Some("Subang".into()),
        };
        assert!(ctx.check().is_ok());
        assert!(ReadingContext::default().check().is_ok());
    }

    #[test]
    fn reading_context_rejects_out_of_range_ph_and_humidity() {
        let ph = ReadingContext {
            ph_value: Some(14.5),
            ..Default::default()
        };
        assert_matches!(ph.check(), Err(CoreError::Validation(m)) if m.contains("ph_value"));

        let humidity = ReadingContext {
            humidity: Some(-1.0),
            ..Default::default()
        };
        assert_matches!(humidity.check(), Err(CoreError::Validation(m)) if m.contains("humidity"));
    }

    #[test]
    fn reading_context_input_coerces_numeric_strings() {
        let input: ReadingContextInput = serde_json::from_value(serde_json::json!({
            "ph_value": "6.5",
            "temperature": 28,
            "humidity": 80.5,
        }))
        .unwrap();
        let ctx = input.resolve().unwrap();
        assert_eq!(ctx.ph_value, Some(6.5));
        assert_eq!(ctx.temperature, Some(28.0));
        assert_eq!(ctx.humidity, Some(80.5));
        assert_eq!(ctx.location, None);
    }

    #[test]
    fn reading_context_input_rejects_non_numeric_text() {
        let input = ReadingContextInput {
            temperature: Some(NumericInput::Text("hangat".into())),
            ..Default::default()
        };
        assert_matches!(
            input.resolve(),
            Err(CoreError::Validation(m)) if m.contains("temperature")
        );
    }
}
