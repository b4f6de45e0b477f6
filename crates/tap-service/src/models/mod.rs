//! Tap service models.
//!
//! Database rows and API payloads. JSON field names follow the keys the
//! Mini App frontend already uses (`UserId`, `totalgot`, `hookspeed`, ...),
//! while database columns are snake_case.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health check response.
///
/// Returned by the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy" or "unhealthy").
    pub status: String,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Generic `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Generic `{"data": ...}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

// ============================================================================
// Users
// ============================================================================

/// User database row (maps to `users` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    #[serde(rename = "UserId")]
    pub user_id: String,

    #[serde(rename = "Username")]
    pub username: Option<String>,

    #[serde(rename = "Refertotal")]
    pub refer_total: Option<String>,

    #[serde(rename = "X")]
    pub x: Option<String>,

    #[serde(rename = "alreadydailyclaimed")]
    pub already_daily_claimed: Option<i64>,

    #[serde(rename = "claimedtotal")]
    pub claimed_total: Option<i64>,

    #[serde(rename = "dailyclaimedtime")]
    pub daily_claimed_time: Option<i64>,

    #[serde(rename = "dailycombotime")]
    pub daily_combo_time: Option<i64>,

    pub discord: Option<String>,

    pub facebook: Option<String>,

    pub instagram: Option<String>,

    #[serde(rename = "invitedby")]
    pub invited_by: Option<String>,

    #[serde(rename = "miningstarttime")]
    pub mining_start_time: Option<String>,

    pub rate: Option<String>,

    pub telegram: Option<String>,

    #[serde(rename = "timeinminute")]
    pub time_in_minute: Option<String>,

    #[serde(rename = "totalcollectabledaily")]
    pub total_collectable_daily: Option<String>,

    #[serde(rename = "totalgot")]
    pub total_got: f64,

    pub youtube: Option<String>,

    #[serde(rename = "walletid")]
    pub wallet_id: Option<String>,

    #[serde(rename = "referrewarded")]
    pub refer_rewarded: Option<i64>,
}

/// Request body for `POST /add_user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddUserRequest {
    #[serde(rename = "UserId", default)]
    pub user_id: Option<Value>,

    #[serde(rename = "Username", default)]
    pub username: Option<Value>,

    #[serde(rename = "invitedby", default)]
    pub invited_by: Option<Value>,
}

/// Request body for `POST /increase_totalgot`.
#[derive(Debug, Clone, Deserialize)]
pub struct IncreaseTotalGotRequest {
    #[serde(rename = "UserId", default)]
    pub user_id: Option<Value>,

    #[serde(rename = "Amount", default)]
    pub amount: Option<f64>,
}

/// Response for `POST /increase_totalgot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncreaseTotalGotResponse {
    pub message: String,
    pub totalgot: f64,
}

/// A user invited by the requester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvitedUser {
    #[serde(rename = "Username")]
    pub username: Option<String>,

    #[serde(rename = "totalgot")]
    pub total_got: f64,
}

/// Response for `GET /get_invitations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationsResponse {
    pub invitations: Vec<InvitedUser>,
    pub referrewarded: Option<i64>,
}

/// `?UserId=` query parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct UserIdQuery {
    #[serde(rename = "UserId")]
    pub user_id: Option<String>,
}

// ============================================================================
// Ranking
// ============================================================================

/// Leaderboard row read from the database.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub user_id: String,
    pub username: Option<String>,
    pub total_got: f64,
}

/// One entry of the top-users list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedUser {
    pub rank: usize,
    pub username: Option<String>,
    pub totalgot: f64,
}

/// Position of the requesting user, or an inline error when unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestedUserRank {
    Found {
        position: i64,
        username: Option<String>,
        totalgot: f64,
    },
    Missing {
        error: String,
    },
}

/// Response for `GET /get_user_ranking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingResponse {
    pub requested_user: RequestedUserRank,
    pub top_users: Vec<RankedUser>,
    pub total_users: String,
}

// ============================================================================
// Account age
// ============================================================================

/// `?userid=` query parameter for `GET /get_creation_month_count`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountAgeQuery {
    pub userid: Option<String>,
}

/// Response for `GET /get_creation_month_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountAgeResponse {
    pub user_id: i64,
    pub years: f64,
    pub reward: u32,
}

// ============================================================================
// Telegram membership
// ============================================================================

/// Query parameters for `GET /check_telegram_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct MembershipQuery {
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
}

/// Response for `GET /check_telegram_status`: `"1"` member, `"0"` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipStatusResponse {
    pub status: String,
}

// ============================================================================
// Gamers
// ============================================================================

/// Gamer database row (maps to `gamers` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Gamer {
    #[serde(rename = "userid")]
    pub gamer_id: i64,

    #[serde(rename = "hookspeed")]
    pub hook_speed: Option<i64>,

    pub multiplier: Option<i64>,

    #[serde(rename = "hookspeedtime")]
    pub hook_speed_time: Option<i64>,

    #[serde(rename = "multipliertime")]
    pub multiplier_time: Option<i64>,

    #[serde(rename = "startime")]
    pub star_time: Option<i64>,

    #[serde(rename = "starmultiplier")]
    pub star_multiplier: Option<i64>,
}

/// Request body for `POST /gamer`.
#[derive(Debug, Clone, Deserialize)]
pub struct GamerRequest {
    #[serde(rename = "GamerId", default)]
    pub gamer_id: Option<Value>,
}
