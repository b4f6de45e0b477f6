//! Leaderboard and account-age integration tests.

use serde_json::json;
use sqlx::SqlitePool;
use tap_test_utils::{fresh_init_data, TestTapServer, INIT_DATA_HEADER};

async fn get(server: &TestTapServer, path: &str) -> Result<(u16, serde_json::Value), anyhow::Error> {
    let response = reqwest::Client::new()
        .get(format!("{}{}", server.url(), path))
        .header(INIT_DATA_HEADER, fresh_init_data(1))
        .send()
        .await?;
    Ok((response.status().as_u16(), response.json().await?))
}

async fn seed_user(pool: &SqlitePool, id: &str, name: &str, total: f64) -> Result<(), anyhow::Error> {
    sqlx::query("INSERT INTO users (user_id, username, total_got) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(total)
        .execute(pool)
        .await?;
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ranking_empty_table(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;

    let (status, body) = get(&server, "/get_user_ranking?UserId=1").await?;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "No users found");

    let (status, body) = get(&server, "/get_user_ranking").await?;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "UserId is required");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ranking_shape(pool: SqlitePool) -> Result<(), anyhow::Error> {
    seed_user(&pool, "1", "ann", 500.0).await?;
    seed_user(&pool, "2", "bob", 900.0).await?;
    seed_user(&pool, "3", "cat", 100.0).await?;
    let server = TestTapServer::spawn(pool).await?;

    let (status, body) = get(&server, "/get_user_ranking?UserId=1").await?;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "requested_user": {"position": 2, "username": "ann", "totalgot": 500.0},
            "top_users": [
                {"rank": 1, "username": "bob", "totalgot": 900.0},
                {"rank": 2, "username": "ann", "totalgot": 500.0},
                {"rank": 3, "username": "cat", "totalgot": 100.0}
            ],
            "total_users": "0.003k"
        })
    );

    let (_, body) = get(&server, "/get_user_ranking?UserId=999").await?;
    assert_eq!(body["requested_user"], json!({"error": "User not found"}));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_leaderboard_capped_at_100(pool: SqlitePool) -> Result<(), anyhow::Error> {
    for i in 0..105 {
        seed_user(&pool, &i.to_string(), &format!("u{i}"), f64::from(i)).await?;
    }
    let server = TestTapServer::spawn(pool).await?;

    let (_, body) = get(&server, "/get_user_ranking?UserId=0").await?;
    assert_eq!(body["top_users"].as_array().map(Vec::len), Some(100));
    assert_eq!(body["requested_user"]["position"], 105);
    assert_eq!(body["total_users"], "0.105k");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_creation_month_count(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;

    // Below the first anchor: registered in 2013, so at least ten years old.
    let (status, body) = get(&server, "/get_creation_month_count?userid=12345").await?;
    assert_eq!(status, 200);
    assert_eq!(body["user_id"], 12345);
    assert_eq!(body["reward"], 7500);
    assert!(body["years"].as_f64().is_some_and(|y| y >= 10.0));

    // Years are rounded to one decimal place.
    let (_, body) = get(&server, "/get_creation_month_count?userid=6925870357").await?;
    let years = body["years"].as_f64().unwrap_or_default();
    assert!(((years * 10.0).round() - years * 10.0).abs() < 1e-9);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_creation_month_count_requires_numeric_id(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;

    for path in [
        "/get_creation_month_count",
        "/get_creation_month_count?userid=",
        "/get_creation_month_count?userid=abc",
        "/get_creation_month_count?userid=1.5",
    ] {
        let (status, body) = get(&server, path).await?;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Invalid or missing user ID");
    }

    Ok(())
}
