//! Leaderboard handler.

use crate::errors::ApiError;
use crate::handlers::non_empty;
use crate::models::{RankingResponse, UserIdQuery};
use crate::routes::AppState;
use crate::services::ranking;
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /get_user_ranking?UserId=
///
/// Returns the top 100 users, the requester's position and the user count.
///
/// ```json
/// {
///   "requested_user": {"position": 12, "username": "ann", "totalgot": 840.5},
///   "top_users": [{"rank": 1, "username": "bob", "totalgot": 99000.0}],
///   "total_users": "1.234k"
/// }
/// ```
#[instrument(skip_all, name = "tap.handlers.get_user_ranking")]
pub async fn get_user_ranking(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    let user_id = non_empty(query.user_id.as_ref())
        .ok_or_else(|| ApiError::BadRequest("UserId is required".to_string()))?;

    let response = ranking::build_ranking(&state.pool, user_id).await?;

    Ok(Json(response))
}
