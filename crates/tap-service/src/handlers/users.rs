//! User handlers: registration, profile, referrals and balance.

use crate::errors::ApiError;
use crate::handlers::{id_from_value, non_empty};
use crate::models::{
    AddUserRequest, DataResponse, IncreaseTotalGotRequest, IncreaseTotalGotResponse,
    InvitationsResponse, MessageResponse, User, UserIdQuery,
};
use crate::repositories::{fields, users};
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /add_user
///
/// Registers a user with starting mining defaults.
///
/// - 201 `{"message": "User added successfully with default values"}`
/// - 200 `{"message": "User already exists"}` (row left untouched)
/// - 400 when `UserId` or `Username` is missing
#[instrument(skip_all, name = "tap.handlers.add_user")]
pub async fn add_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let (Some(user_id), Some(username)) = (
        id_from_value(request.user_id.as_ref()),
        id_from_value(request.username.as_ref()),
    ) else {
        return Err(ApiError::BadRequest(
            "UserId and Username are required".to_string(),
        ));
    };
    let invited_by = id_from_value(request.invited_by.as_ref());

    let created =
        users::create_with_defaults(&state.pool, &user_id, &username, invited_by.as_deref())
            .await?;

    if created {
        tracing::info!(target: "tap.handlers.users", user_id = %user_id, "User registered");
        Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new(
                "User added successfully with default values",
            )),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(MessageResponse::new("User already exists")),
        ))
    }
}

/// Handler for GET /get_user?UserId=
///
/// Returns `{"data": user}` or 404.
#[instrument(skip_all, name = "tap.handlers.get_user")]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<DataResponse<User>>, ApiError> {
    let user_id = non_empty(query.user_id.as_ref())
        .ok_or_else(|| ApiError::BadRequest("UserId is required".to_string()))?;

    let user = users::get_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(DataResponse { data: user }))
}

/// Handler for GET /get_invitations?UserId=
///
/// Lists the users this user invited together with the user's referral
/// reward marker. 404 only when there are no invitations and no marker.
#[instrument(skip_all, name = "tap.handlers.get_invitations")]
pub async fn get_invitations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<InvitationsResponse>, ApiError> {
    let user_id = non_empty(query.user_id.as_ref())
        .ok_or_else(|| ApiError::BadRequest("UserId is required".to_string()))?;

    let referrewarded = users::get_refer_rewarded(&state.pool, user_id).await?;
    let invitations = users::list_invited(&state.pool, user_id).await?;

    if invitations.is_empty() && referrewarded.is_none() {
        return Err(ApiError::NotFound(
            "No invitations or referrewarded value found".to_string(),
        ));
    }

    Ok(Json(InvitationsResponse {
        invitations,
        referrewarded,
    }))
}

/// Handler for POST /update_user
///
/// Body: `{"UserId": ..., "<field>": value, ...}`. Only whitelisted fields
/// are accepted.
#[instrument(skip_all, name = "tap.handlers.update_user")]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = id_from_value(body.get("UserId"))
        .ok_or_else(|| ApiError::BadRequest("UserId is required".to_string()))?;

    let updates = fields::parse_updates(users::UPDATABLE_COLUMNS, &body, "UserId")?;
    let changed = users::update_fields(&state.pool, &user_id, updates).await?;

    if changed == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// Handler for POST /increase_totalgot
///
/// Adds `Amount` (may be negative) to the user's balance atomically.
#[instrument(skip_all, name = "tap.handlers.increase_totalgot")]
pub async fn increase_totalgot(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IncreaseTotalGotRequest>,
) -> Result<Json<IncreaseTotalGotResponse>, ApiError> {
    let (Some(user_id), Some(amount)) = (id_from_value(request.user_id.as_ref()), request.amount)
    else {
        return Err(ApiError::BadRequest(
            "UserId and Amount are required".to_string(),
        ));
    };

    let totalgot = users::increase_total_got(&state.pool, &user_id, amount)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(IncreaseTotalGotResponse {
        message: "Total got updated successfully".to_string(),
        totalgot,
    }))
}
