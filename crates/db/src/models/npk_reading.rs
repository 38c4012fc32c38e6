//! NPK soil reading model and DTOs.

use agrisensa_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `npk_readings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NpkReading {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub n_value: i32,
    pub p_value: i32,
    pub k_value: i32,
    pub ph_value: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub location: Option<String>,
    /// Advisor output captured at insert time.
    pub analysis_result: serde_json::Value,
    #[serde(rename = "timestamp")]
    pub recorded_at: Timestamp,
}

/// DTO for inserting a reading. The analysis is computed by the caller.
#[derive(Debug, Clone)]
pub struct CreateNpkReading {
    pub user_id: Option<DbId>,
    pub n_value: i32,
    pub p_value: i32,
    pub k_value: i32,
    pub ph_value: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub location: Option<String>,
    pub analysis_result: serde_json::Value,
}
