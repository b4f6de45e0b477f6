//! Account age reward handler.

use crate::errors::ApiError;
use crate::models::{AccountAgeQuery, AccountAgeResponse};
use crate::services::creation_date;
use axum::{extract::Query, Json};
use chrono::Utc;
use tracing::instrument;

/// Handler for GET /get_creation_month_count?userid=
///
/// Estimates the account's age from its Telegram ID and returns the
/// matching reward tier.
///
/// ```json
/// {"user_id": 123456789, "years": 8.7, "reward": 6750}
/// ```
#[instrument(skip_all, name = "tap.handlers.get_creation_month_count")]
pub async fn get_creation_month_count(
    Query(query): Query<AccountAgeQuery>,
) -> Result<Json<AccountAgeResponse>, ApiError> {
    let user_id: i64 = query
        .userid
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ApiError::BadRequest("Invalid or missing user ID".to_string()))?;

    let created = creation_date::predict_creation_date(user_id);
    let years = creation_date::account_age_years(created, Utc::now());

    Ok(Json(AccountAgeResponse {
        user_id,
        years: creation_date::years_rounded(years),
        reward: creation_date::reward_for_years(years),
    }))
}
