//! Leaderboard assembly.

use crate::errors::ApiError;
use crate::models::{RankedUser, RankingResponse, RequestedUserRank};
use crate::repositories::users;
use sqlx::SqlitePool;
use tracing::instrument;

/// Number of users listed on the leaderboard.
pub const LEADERBOARD_SIZE: i64 = 100;

/// Build the leaderboard plus the requesting user's position.
///
/// The position is the number of users with a strictly higher balance plus
/// one, so tied users share a position.
///
/// # Errors
///
/// `ApiError::NotFound` when there are no users at all.
#[instrument(skip(pool), name = "tap.services.ranking")]
pub async fn build_ranking(pool: &SqlitePool, user_id: &str) -> Result<RankingResponse, ApiError> {
    let top = users::top_by_total_got(pool, LEADERBOARD_SIZE).await?;
    if top.is_empty() {
        return Err(ApiError::NotFound("No users found".to_string()));
    }

    let top_users = top
        .into_iter()
        .enumerate()
        .map(|(i, row)| RankedUser {
            rank: i + 1,
            username: row.username,
            totalgot: row.total_got,
        })
        .collect();

    let requested_user = match users::get_by_id(pool, user_id).await? {
        Some(user) => {
            let above = users::count_with_total_got_above(pool, user.total_got).await?;
            RequestedUserRank::Found {
                position: above + 1,
                username: user.username,
                totalgot: user.total_got,
            }
        }
        None => RequestedUserRank::Missing {
            error: "User not found".to_string(),
        },
    };

    let total_users = format_total_users(users::count_all(pool).await?);

    Ok(RankingResponse {
        requested_user,
        top_users,
        total_users,
    })
}

/// Thousands with three decimals: 1234 → `"1.234k"`.
pub fn format_total_users(count: i64) -> String {
    format!("{:.3}k", count as f64 / 1000.0)
}
