//! Telegram channel membership handler.

use crate::errors::ApiError;
use crate::handlers::non_empty;
use crate::models::{MembershipQuery, MembershipStatusResponse};
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /check_telegram_status?user_id=&chat_id=
///
/// `{"status": "1"}` when the user is a member, administrator or creator of
/// the chat, `{"status": "0"}` otherwise. A Bot API failure is a 500 with
/// `{"error": "Failed to connect to Telegram API"}`.
#[instrument(skip_all, name = "tap.handlers.check_telegram_status")]
pub async fn check_telegram_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MembershipQuery>,
) -> Result<Json<MembershipStatusResponse>, ApiError> {
    let (Some(user_id), Some(chat_id)) = (
        non_empty(query.user_id.as_ref()),
        non_empty(query.chat_id.as_ref()),
    ) else {
        return Err(ApiError::BadRequest(
            "User ID and Chat ID are required".to_string(),
        ));
    };

    let is_member = state.membership.is_member(chat_id, user_id).await?;

    Ok(Json(MembershipStatusResponse {
        status: if is_member { "1" } else { "0" }.to_string(),
    }))
}
