//! Reverse yield planning: find the historical field whose yield is closest
//! to a target and report its inputs as a plan.

use std::path::Path;

use serde::Serialize;

use crate::error::CoreError;
use crate::numeric::round2;

const REQUIRED_COLUMNS: [&str; 7] = [
    "Nitrogen",
    "Phosphorus",
    "Potassium",
    "Temperature",
    "Rainfall",
    "pH",
    "Yield",
];

/// One observed field season. Yield is in kg/ha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldRecord {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub rainfall: f64,
    pub ph: f64,
    pub yield_kg_ha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldPlan {
    #[serde(rename = "Nitrogen (kg/ha)")]
    pub nitrogen: f64,
    #[serde(rename = "Phosphorus (kg/ha)")]
    pub phosphorus: f64,
    #[serde(rename = "Potassium (kg/ha)")]
    pub potassium: f64,
    #[serde(rename = "Temperature (°C)")]
    pub temperature: f64,
    #[serde(rename = "Rainfall (mm)")]
    pub rainfall: f64,
    #[serde(rename = "pH Tanah")]
    pub ph: f64,
    #[serde(rename = "Hasil Panen Aktual dari Data")]
    pub actual_yield: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct YieldDataset {
    records: Vec<YieldRecord>,
}

impl YieldDataset {
    /// Read a comma-separated dataset from disk.
    pub async fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            CoreError::Internal(format!("yield dataset {} unavailable: {e}", path.display()))
        })?;
        Self::from_csv(&raw)
    }

    /// Parse CSV text with a header row naming at least the required columns.
    ///
    /// Rows whose `Yield` is not a number are skipped. Any other required cell
    /// that is missing or not a number makes the dataset unusable.
    pub fn from_csv(raw: &str) -> Result<Self, CoreError> {
        let mut lines = raw
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());
        let (_, header_line) = lines
            .next()
            .ok_or_else(|| CoreError::Internal("yield dataset has no header".into()))?;
        let header = split_record(header_line);

        let mut idx = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, column) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = header.iter().position(|h| h == column).ok_or_else(|| {
                CoreError::Internal(format!("yield dataset is missing column {column}"))
            })?;
        }
        let yield_idx = idx[REQUIRED_COLUMNS.len() - 1];

        let mut records = Vec::new();
        for (line_no, line) in lines {
            let cells = split_record(line);
            if number(&cells, yield_idx).is_none() {
                continue;
            }
            let mut values = [0.0f64; REQUIRED_COLUMNS.len()];
            for ((value, &i), column) in values.iter_mut().zip(&idx).zip(REQUIRED_COLUMNS) {
                *value = number(&cells, i).ok_or_else(|| {
                    CoreError::Internal(format!(
                        "yield dataset line {}: {column} is not a number",
                        line_no + 1
                    ))
                })?;
            }
            let [nitrogen, phosphorus, potassium, temperature, rainfall, ph, yield_kg_ha] = values;
            records.push(YieldRecord {
                nitrogen,
                phosphorus,
                potassium,
                temperature,
                rainfall,
                ph,
                yield_kg_ha,
            });
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record whose yield is closest to `target_kg_ha`. Earlier rows win ties.
    pub fn closest(&self, target_kg_ha: f64) -> Option<&YieldRecord> {
        self.records.iter().reduce(|best, r| {
            if (r.yield_kg_ha - target_kg_ha).abs() < (best.yield_kg_ha - target_kg_ha).abs() {
                r
            } else {
                best
            }
        })
    }
}

fn number(cells: &[String], i: usize) -> Option<f64> {
    cells
        .get(i)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Split one CSV line into trimmed cells. Double-quoted cells may contain
/// commas, and `""` inside quotes is a literal quote.
fn split_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

/// Build a plan for a target yield given in tonnes per hectare.
pub fn generate_yield_plan(
    dataset: &YieldDataset,
    target_t_ha: f64,
) -> Result<YieldPlan, CoreError> {
    if !target_t_ha.is_finite() {
        return Err(CoreError::Validation("target_yield must be a number".into()));
    }
    let record = dataset
        .closest(target_t_ha * 1000.0)
        .ok_or_else(|| CoreError::not_found("YieldRecord", target_t_ha.to_string()))?;

    Ok(YieldPlan {
        nitrogen: round2(record.nitrogen),
        phosphorus: round2(record.phosphorus),
        potassium: round2(record.potassium),
        temperature: round2(record.temperature),
        rainfall: round2(record.rainfall),
        ph: round2(record.ph),
        actual_yield: format!("{} ton/ha", decimal(round2(record.yield_kg_ha / 1000.0))),
    })
}

/// Render a float keeping at least one decimal place ("4.0", "3.25").
fn decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
