//! Current Telegram user handler.

use crate::errors::ApiError;
use crate::repositories::users;
use crate::routes::AppState;
use axum::{extract::State, Extension, Json};
use common::init_data::{InitData, TelegramUser};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Response for `/me`.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    /// Telegram user from the verified initData, if the client sent one.
    pub user: Option<TelegramUser>,

    /// When Telegram issued the initData (unix seconds).
    pub auth_date: i64,

    /// Whether the user already has a row in the users table.
    pub registered: bool,
}

/// Handler for GET /me
///
/// Returns the identity Telegram vouched for in the request's initData.
#[instrument(skip_all, name = "tap.handlers.me")]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(init_data): Extension<InitData>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = init_data.user();

    let registered = match &user {
        Some(u) => users::exists(&state.pool, &u.id.to_string()).await?,
        None => false,
    };

    tracing::debug!(target: "tap.handlers.me", has_user = user.is_some(), registered, "Returning initData identity");

    Ok(Json(MeResponse {
        user,
        auth_date: init_data.auth_date(),
        registered,
    }))
}
