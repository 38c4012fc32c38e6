//! Numeric input coercion and rounding helpers shared by the domain modules.
//!
//! Request payloads from the frontend are loosely typed: a nutrient value may
//! arrive as `150`, `150.0` or `"150"`. [`NumericInput`] accepts all three and
//! converts them with explicit, field-named validation errors.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Round to two decimal places (the reporting precision of every endpoint).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// [`round2`] for derived quantities. Huge finite inputs can overflow the
/// arithmetic before rounding, and those are reported as out of range.
pub fn checked_round2(value: f64) -> Result<f64, CoreError> {
    let rounded = round2(value);
    if rounded.is_finite() {
        Ok(rounded)
    } else {
        Err(CoreError::Validation("input out of range".into()))
    }
}

/// A JSON number or numeric string supplied by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumericInput {
    /// Convert to an `i32`. Floats are truncated toward zero.
    pub fn to_i32(&self, field: &str) -> Result<i32, CoreError> {
        let wide = match self {
            NumericInput::Integer(v) => *v,
            NumericInput::Float(v) => {
                if !v.is_finite() {
                    return Err(not_a_number(field));
                }
                v.trunc() as i64
            }
            NumericInput::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                CoreError::Validation(format!("{field} must be an integer, got '{s}'"))
            })?,
        };
        i32::try_from(wide)
            .map_err(|_| CoreError::Validation(format!("{field} is out of range: {wide}")))
    }

    /// Convert to a finite `f64`.
    pub fn to_f64(&self, field: &str) -> Result<f64, CoreError> {
        let value = match self {
            NumericInput::Integer(v) => *v as f64,
            NumericInput::Float(v) => *v,
            NumericInput::Text(s) => s.trim().parse::<f64>().map_err(|_| not_a_number(field))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(not_a_number(field))
        }
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Float(value)
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        NumericInput::Integer(value)
    }
}

/// Resolve an optional model feature, treating an absent field as `0.0`.
pub fn feature_or_zero(value: Option<&NumericInput>, field: &str) -> Result<f64, CoreError> {
    value.map_or(Ok(0.0), |v| v.to_f64(field))
}

/// Resolve a required integer field.
pub fn require_i32(value: Option<&NumericInput>, field: &str) -> Result<i32, CoreError> {
    value
        .ok_or_else(|| CoreError::Validation(format!("{field} is required")))?
        .to_i32(field)
}

/// Resolve a required numeric field.
pub fn require_f64(value: Option<&NumericInput>, field: &str) -> Result<f64, CoreError> {
    value
        .ok_or_else(|| CoreError::Validation(format!("{field} is required")))?
        .to_f64(field)
}

fn not_a_number(field: &str) -> CoreError {
    CoreError::Validation(format!("{field} must be a number"))
}
