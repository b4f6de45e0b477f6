//! User repository module for database operations.
//!
//! Mining, referral and social-task state per Telegram user, plus the
//! leaderboard queries.

use crate::errors::ApiError;
use crate::models::{InvitedUser, LeaderboardRow, User};
use crate::repositories::fields::{self, ColumnKind, FieldUpdate, UpdatableColumn};
use sqlx::SqlitePool;

/// Fields a client may change through `POST /update_user`.
pub const UPDATABLE_COLUMNS: &[UpdatableColumn] = &[
    UpdatableColumn::new("Username", "username", ColumnKind::Text),
    UpdatableColumn::new("Refertotal", "refer_total", ColumnKind::Text),
    UpdatableColumn::new("X", "x", ColumnKind::Text),
    UpdatableColumn::new("alreadydailyclaimed", "already_daily_claimed", ColumnKind::Integer),
    UpdatableColumn::new("claimedtotal", "claimed_total", ColumnKind::Integer),
    UpdatableColumn::new("dailyclaimedtime", "daily_claimed_time", ColumnKind::Integer),
    UpdatableColumn::new("dailycombotime", "daily_combo_time", ColumnKind::Integer),
    UpdatableColumn::new("discord", "discord", ColumnKind::Text),
    UpdatableColumn::new("facebook", "facebook", ColumnKind::Text),
    UpdatableColumn::new("instagram", "instagram", ColumnKind::Text),
    UpdatableColumn::new("invitedby", "invited_by", ColumnKind::Text),
    UpdatableColumn::new("miningstarttime", "mining_start_time", ColumnKind::Text),
    UpdatableColumn::new("rate", "rate", ColumnKind::Text),
    UpdatableColumn::new("telegram", "telegram", ColumnKind::Text),
    UpdatableColumn::new("timeinminute", "time_in_minute", ColumnKind::Text),
    UpdatableColumn::new("totalcollectabledaily", "total_collectable_daily", ColumnKind::Text),
    UpdatableColumn::required("totalgot", "total_got", ColumnKind::Real),
    UpdatableColumn::new("youtube", "youtube", ColumnKind::Text),
    UpdatableColumn::new("walletid", "wallet_id", ColumnKind::Text),
    UpdatableColumn::new("referrewarded", "refer_rewarded", ColumnKind::Integer),
];

/// Get user by Telegram user ID.
pub async fn get_by_id(pool: &SqlitePool, user_id: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT
            user_id, username, refer_total, x, already_daily_claimed,
            claimed_total, daily_claimed_time, daily_combo_time, discord,
            facebook, instagram, invited_by, mining_start_time, rate,
            telegram, time_in_minute, total_collectable_daily, total_got,
            youtube, wallet_id, refer_rewarded
        FROM users
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch user by id: {}", e)))?;

    Ok(user)
}

/// Whether a user row exists.
pub async fn exists(pool: &SqlitePool, user_id: &str) -> Result<bool, ApiError> {
    let (found,): (i64,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?)")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to check user existence: {}", e)))?;

    Ok(found != 0)
}

/// Insert a user with starting mining defaults.
///
/// Returns `false` without touching the row if the user already exists.
pub async fn create_with_defaults(
    pool: &SqlitePool,
    user_id: &str,
    username: &str,
    invited_by: Option<&str>,
) -> Result<bool, ApiError> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (
            user_id, username, invited_by, total_got, mining_start_time,
            time_in_minute, rate, daily_combo_time, daily_claimed_time,
            already_daily_claimed
        )
        VALUES (?, ?, ?, 0, '0', '180', '0.3', 0, 0, 0)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(username)
    .bind(invited_by)
    .execute(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to create user: {}", e)))?;

    Ok(result.rows_affected() == 1)
}

/// Apply a partial update. Returns the number of rows changed (0 if unknown).
pub async fn update_fields(
    pool: &SqlitePool,
    user_id: &str,
    updates: Vec<FieldUpdate>,
) -> Result<u64, ApiError> {
    let mut builder = fields::update_statement("users", updates);
    builder.push(" WHERE user_id = ").push_bind(user_id.to_string());

    let result = builder
        .build()
        .execute(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to update user: {}", e)))?;

    Ok(result.rows_affected())
}

/// Atomically add `amount` to a user's balance.
///
/// Returns the new balance, or `None` if the user does not exist.
pub async fn increase_total_got(
    pool: &SqlitePool,
    user_id: &str,
    amount: f64,
) -> Result<Option<f64>, ApiError> {
    let row: Option<(f64,)> = sqlx::query_as(
        r#"
        UPDATE users
        SET total_got = total_got + ?
        WHERE user_id = ?
        RETURNING total_got
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to increase total got: {}", e)))?;

    Ok(row.map(|(total,)| total))
}

/// Referral reward marker for a user.
///
/// `None` when the user does not exist or the marker was never set.
pub async fn get_refer_rewarded(pool: &SqlitePool, user_id: &str) -> Result<Option<i64>, ApiError> {
    let row: Option<(Option<i64>,)> = sqlx::query_as(
        r#"
        SELECT refer_rewarded
        FROM users
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch refer rewarded: {}", e)))?;

    Ok(row.and_then(|(value,)| value))
}

/// Users invited by `user_id`, excluding self-referrals.
pub async fn list_invited(pool: &SqlitePool, user_id: &str) -> Result<Vec<InvitedUser>, ApiError> {
    let users = sqlx::query_as::<_, InvitedUser>(
        r#"
        SELECT username, total_got
        FROM users
        WHERE invited_by = ? AND user_id != invited_by
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to list invited users: {}", e)))?;

    Ok(users)
}

/// Highest balances first.
pub async fn top_by_total_got(pool: &SqlitePool, limit: i64) -> Result<Vec<LeaderboardRow>, ApiError> {
    let rows = sqlx::query_as::<_, LeaderboardRow>(
        r#"
        SELECT user_id, username, total_got
        FROM users
        ORDER BY total_got DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch leaderboard: {}", e)))?;

    Ok(rows)
}

/// Number of users with a strictly higher balance.
pub async fn count_with_total_got_above(pool: &SqlitePool, total_got: f64) -> Result<i64, ApiError> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM users
        WHERE total_got > ?
        "#,
    )
    .bind(total_got)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to count users above balance: {}", e)))?;

    Ok(count)
}

/// Total number of users.
pub async fn count_all(pool: &SqlitePool) -> Result<i64, ApiError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to count users: {}", e)))?;

    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::repositories::fields::FieldValue;

    async fn seed(pool: &SqlitePool, user_id: &str, invited_by: Option<&str>, total_got: f64) {
        create_with_defaults(pool, user_id, &format!("user{user_id}"), invited_by)
            .await
            .unwrap();
        update_fields(
            pool,
            user_id,
            vec![FieldUpdate {
                column: "total_got",
                value: FieldValue::Real(total_got),
            }],
        )
        .await
        .unwrap();
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_with_defaults(pool: SqlitePool) {
        let created = create_with_defaults(&pool, "100", "ann", Some("7")).await.unwrap();
        assert!(created);

        let user = get_by_id(&pool, "100").await.unwrap().unwrap();
        assert_eq!(user.username.as_deref(), Some("ann"));
        assert_eq!(user.invited_by.as_deref(), Some("7"));
        assert_eq!(user.total_got, 0.0);
        assert_eq!(user.mining_start_time.as_deref(), Some("0"));
        assert_eq!(user.time_in_minute.as_deref(), Some("180"));
        assert_eq!(user.rate.as_deref(), Some("0.3"));
        assert_eq!(user.daily_combo_time, Some(0));
        assert_eq!(user.daily_claimed_time, Some(0));
        assert_eq!(user.already_daily_claimed, Some(0));
        assert_eq!(user.wallet_id, None);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_existing_user_is_noop(pool: SqlitePool) {
        assert!(create_with_defaults(&pool, "100", "ann", None).await.unwrap());
        assert!(!create_with_defaults(&pool, "100", "bob", None).await.unwrap());
        assert!(exists(&pool, "100").await.unwrap());
        assert!(!exists(&pool, "101").await.unwrap());

        let user = get_by_id(&pool, "100").await.unwrap().unwrap();
        assert_eq!(user.username.as_deref(), Some("ann"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_update_unknown_user_affects_nothing(pool: SqlitePool) {
        let rows = update_fields(
            &pool,
            "missing",
            vec![FieldUpdate {
                column: "rate",
                value: FieldValue::Text("1.0".to_string()),
            }],
        )
        .await
        .unwrap();
        assert_eq!(rows, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_increase_total_got(pool: SqlitePool) {
        seed(&pool, "1", None, 10.0).await;

        assert_eq!(increase_total_got(&pool, "1", 2.5).await.unwrap(), Some(12.5));
        assert_eq!(increase_total_got(&pool, "1", -0.5).await.unwrap(), Some(12.0));
        assert_eq!(increase_total_got(&pool, "404", 1.0).await.unwrap(), None);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_list_invited_excludes_self_referral(pool: SqlitePool) {
        seed(&pool, "1", Some("1"), 0.0).await;
        seed(&pool, "2", Some("1"), 5.0).await;
        seed(&pool, "3", Some("1"), 7.0).await;
        seed(&pool, "4", Some("2"), 9.0).await;

        let mut invited = list_invited(&pool, "1").await.unwrap();
        invited.sort_by(|a, b| a.username.cmp(&b.username));

        assert_eq!(invited.len(), 2);
        assert_eq!(invited.first().unwrap().username.as_deref(), Some("user2"));
        assert_eq!(invited.get(1).unwrap().total_got, 7.0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_refer_rewarded(pool: SqlitePool) {
        seed(&pool, "1", None, 0.0).await;
        assert_eq!(get_refer_rewarded(&pool, "1").await.unwrap(), None);

        update_fields(
            &pool,
            "1",
            vec![FieldUpdate {
                column: "refer_rewarded",
                value: FieldValue::Integer(3),
            }],
        )
        .await
        .unwrap();

        assert_eq!(get_refer_rewarded(&pool, "1").await.unwrap(), Some(3));
        assert_eq!(get_refer_rewarded(&pool, "missing").await.unwrap(), None);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_leaderboard_queries(pool: SqlitePool) {
        seed(&pool, "1", None, 5.0).await;
        seed(&pool, "2", None, 50.0).await;
        seed(&pool, "3", None, 20.0).await;

        let top = top_by_total_got(&pool, 2).await.unwrap();
        let ids: Vec<&str> = top.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);

        assert_eq!(count_with_total_got_above(&pool, 20.0).await.unwrap(), 1);
        assert_eq!(count_with_total_got_above(&pool, 50.0).await.unwrap(), 0);
        assert_eq!(count_all(&pool).await.unwrap(), 3);
    }
}
