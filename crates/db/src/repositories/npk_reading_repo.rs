//! Repository for the `npk_readings` table.

use agrisensa_core::types::DbId;
use sqlx::PgPool;

use crate::models::npk_reading::{CreateNpkReading, NpkReading};

/// Column list for `npk_readings` queries.
const COLUMNS: &str = "\
    id, user_id, n_value, p_value, k_value, \
    ph_value, temperature, humidity, location, \
    analysis_result, recorded_at";

/// Insert and read NPK readings. Readings are never updated.
pub struct NpkReadingRepo;

impl NpkReadingRepo {
    /// Insert a reading, returning the full row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNpkReading,
    ) -> Result<NpkReading, sqlx::Error> {
        let query = format!(
            "INSERT INTO npk_readings \
                (user_id, n_value, p_value, k_value, \
                 ph_value, temperature, humidity, location, analysis_result) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NpkReading>(&query)
            .bind(input.user_id)
            .bind(input.n_value)
            .bind(input.p_value)
            .bind(input.k_value)
            .bind(input.ph_value)
            .bind(input.temperature)
            .bind(input.humidity)
            .bind(&input.location)
            .bind(&input.analysis_result)
            .fetch_one(pool)
            .await
    }

    /// Find a reading by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<NpkReading>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM npk_readings WHERE id = $1");
        sqlx::query_as::<_, NpkReading>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A page of one user's readings, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NpkReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM npk_readings \
             WHERE user_id = $1 \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, NpkReading>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of readings owned by `user_id`.
    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM npk_readings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
