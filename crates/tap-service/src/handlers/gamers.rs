//! Mini-game state handlers.

use crate::errors::ApiError;
use crate::handlers::numeric_id_from_value;
use crate::models::{DataResponse, Gamer, GamerRequest, MessageResponse};
use crate::repositories::{fields, gamers};
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /gamer
///
/// Returns the gamer's state (200), creating it with defaults first if it
/// does not exist (201).
#[instrument(skip_all, name = "tap.handlers.gamer")]
pub async fn get_or_add_gamer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GamerRequest>,
) -> Result<(StatusCode, Json<DataResponse<Gamer>>), ApiError> {
    let gamer_id = numeric_id_from_value(request.gamer_id.as_ref())
        .ok_or_else(|| ApiError::BadRequest("GamerId is required".to_string()))?;

    if let Some(gamer) = gamers::get_by_id(&state.pool, gamer_id).await? {
        return Ok((StatusCode::OK, Json(DataResponse { data: gamer })));
    }

    let created = gamers::create_with_defaults(&state.pool, gamer_id).await?;
    let gamer = gamers::get_by_id(&state.pool, gamer_id).await?.ok_or_else(|| {
        tracing::error!(target: "tap.handlers.gamers", gamer_id, "Gamer missing after insert");
        ApiError::Internal
    })?;

    // A concurrent request may have inserted the row first.
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(DataResponse { data: gamer })))
}

/// Handler for POST /update_gamer
///
/// Body: `{"GamerId": ..., "<field>": value, ...}`.
#[instrument(skip_all, name = "tap.handlers.update_gamer")]
pub async fn update_gamer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let gamer_id = numeric_id_from_value(body.get("GamerId"))
        .ok_or_else(|| ApiError::BadRequest("GamerId is required".to_string()))?;

    let updates = fields::parse_updates(gamers::UPDATABLE_COLUMNS, &body, "GamerId")?;
    let changed = gamers::update_fields(&state.pool, gamer_id, updates).await?;

    if changed == 0 {
        return Err(ApiError::NotFound("Gamer not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Gamer updated successfully")))
}
