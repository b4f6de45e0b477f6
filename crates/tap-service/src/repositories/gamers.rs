//! Gamer repository module for database operations.

use crate::errors::ApiError;
use crate::models::Gamer;
use crate::repositories::fields::{self, ColumnKind, FieldUpdate, UpdatableColumn};
use sqlx::SqlitePool;

/// Fields a client may change through `POST /update_gamer`.
pub const UPDATABLE_COLUMNS: &[UpdatableColumn] = &[
    UpdatableColumn::new("hookspeed", "hook_speed", ColumnKind::Integer),
    UpdatableColumn::new("multiplier", "multiplier", ColumnKind::Integer),
    UpdatableColumn::new("hookspeedtime", "hook_speed_time", ColumnKind::Integer),
    UpdatableColumn::new("multipliertime", "multiplier_time", ColumnKind::Integer),
    UpdatableColumn::new("startime", "star_time", ColumnKind::Integer),
    UpdatableColumn::new("starmultiplier", "star_multiplier", ColumnKind::Integer),
];

/// Get gamer by ID.
pub async fn get_by_id(pool: &SqlitePool, gamer_id: i64) -> Result<Option<Gamer>, ApiError> {
    let gamer = sqlx::query_as::<_, Gamer>(
        r#"
        SELECT
            gamer_id, hook_speed, multiplier, hook_speed_time,
            multiplier_time, star_time, star_multiplier
        FROM gamers
        WHERE gamer_id = ?
        "#,
    )
    .bind(gamer_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch gamer: {}", e)))?;

    Ok(gamer)
}

/// Insert a gamer with base speed and multiplier.
///
/// Returns `false` without touching the row if the gamer already exists.
pub async fn create_with_defaults(pool: &SqlitePool, gamer_id: i64) -> Result<bool, ApiError> {
    let result = sqlx::query(
        r#"
        INSERT INTO gamers (gamer_id, hook_speed, multiplier, hook_speed_time, multiplier_time)
        VALUES (?, 1, 1, 0, 0)
        ON CONFLICT (gamer_id) DO NOTHING
        "#,
    )
    .bind(gamer_id)
    .execute(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to create gamer: {}", e)))?;

    Ok(result.rows_affected() == 1)
}

/// Apply a partial update. Returns the number of rows changed (0 if unknown).
pub async fn update_fields(
    pool: &SqlitePool,
    gamer_id: i64,
    updates: Vec<FieldUpdate>,
) -> Result<u64, ApiError> {
    let mut builder = fields::update_statement("gamers", updates);
    builder.push(" WHERE gamer_id = ").push_bind(gamer_id);

    let result = builder
        .build()
        .execute(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to update gamer: {}", e)))?;

    Ok(result.rows_affected())
}
