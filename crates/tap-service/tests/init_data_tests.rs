//! initData gate integration tests.
//!
//! Every protected route answers 403 with the same body whatever the
//! rejection reason, and runs normally once the header verifies.

use serde_json::json;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tap_service::services::telegram_client::mock::MockMembershipChecker;
use tap_test_utils::{
    fresh_init_data, init_data_issued_ago, signed_init_data, signed_init_data_with_token,
    TestTapServer, INIT_DATA_HEADER,
};

const PROTECTED_GETS: &[&str] = &[
    "/me",
    "/get_user?UserId=1",
    "/get_invitations?UserId=1",
    "/get_user_ranking?UserId=1",
    "/get_creation_month_count?userid=1",
    "/check_telegram_status?user_id=1&chat_id=@c",
];

const PROTECTED_POSTS: &[&str] = &[
    "/add_user",
    "/update_user",
    "/increase_totalgot",
    "/gamer",
    "/update_gamer",
];

async fn assert_forbidden(response: reqwest::Response) -> Result<(), anyhow::Error> {
    assert_eq!(response.status(), 403);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"error": "Invalid Telegram initData"}));
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_header_rejected_everywhere(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;
    let client = reqwest::Client::new();

    for path in PROTECTED_GETS {
        let response = client.get(format!("{}{}", server.url(), path)).send().await?;
        assert_forbidden(response).await?;
    }

    for path in PROTECTED_POSTS {
        let response = client
            .post(format!("{}{}", server.url(), path))
            .json(&json!({"UserId": "1", "Username": "x", "GamerId": 1}))
            .send()
            .await?;
        assert_forbidden(response).await?;
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rejections_are_indistinguishable(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;
    let client = reqwest::Client::new();

    let now = chrono::Utc::now().timestamp().to_string();
    let future = (chrono::Utc::now().timestamp() + 3600).to_string();
    let unsigned = format!("auth_date={}&user=%7B%22id%22%3A1%7D", now);
    let tampered = fresh_init_data(1).replace("tester1", "tester2");

    let bad_headers = vec![
        String::new(),
        "%%%".to_string(),
        unsigned,
        tampered,
        signed_init_data_with_token("1:someone-else", &[("auth_date", &now)]),
        init_data_issued_ago(1, 86_401),
        signed_init_data(&[("auth_date", &future)]),
        format!("{}&hash=ZZZZ", signed_init_data(&[("auth_date", &now)])),
    ];

    for header in bad_headers {
        let response = client
            .get(format!("{}/me", server.url()))
            .header(INIT_DATA_HEADER, header)
            .send()
            .await?;
        assert_forbidden(response).await?;
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_valid_init_data_reaches_handler(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;

    let response = reqwest::Client::new()
        .get(format!("{}/me", server.url()))
        .header(INIT_DATA_HEADER, fresh_init_data(4242))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["user"]["id"], 4242);
    assert_eq!(body["user"]["username"], "tester4242");
    assert_eq!(body["registered"], false);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_me_reports_registration(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/add_user", server.url()))
        .header(INIT_DATA_HEADER, fresh_init_data(77))
        .json(&json!({"UserId": 77, "Username": "ann"}))
        .send()
        .await?;

    let body: serde_json::Value = client
        .get(format!("{}/me", server.url()))
        .header(INIT_DATA_HEADER, fresh_init_data(77))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["registered"], true);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_max_age_is_configurable(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let overrides = HashMap::from([(
        "INIT_DATA_MAX_AGE_SECONDS".to_string(),
        "60".to_string(),
    )]);
    let server =
        TestTapServer::spawn_with(pool, overrides, Arc::new(MockMembershipChecker::member()))
            .await?;

    let response = reqwest::Client::new()
        .get(format!("{}/me", server.url()))
        .header(INIT_DATA_HEADER, init_data_issued_ago(1, 120))
        .send()
        .await?;

    assert_forbidden(response).await
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_cors_preflight_skips_gate(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let overrides = HashMap::from([(
        "CORS_ALLOWED_ORIGINS".to_string(),
        "https://tap.example".to_string(),
    )]);
    let server =
        TestTapServer::spawn_with(pool, overrides, Arc::new(MockMembershipChecker::member()))
            .await?;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/get_user", server.url()))
        .header("Origin", "https://tap.example")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", INIT_DATA_HEADER)
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://tap.example")
    );

    Ok(())
}
