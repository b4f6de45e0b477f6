//! Public endpoint integration tests.
//!
//! `/health` and `/metrics` stay reachable without initData.

use sqlx::SqlitePool;
use tap_test_utils::TestTapServer;

#[sqlx::test(migrations = "../../migrations")]
async fn test_health_endpoint_returns_200(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "healthy");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_health_endpoint_returns_json(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    assert!(
        content_type.is_some_and(|ct| ct.contains("application/json")),
        "Expected application/json content type, got {:?}",
        content_type
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_metrics_endpoint_is_public(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;

    // Generate at least one recorded request first.
    reqwest::get(format!("{}/health", server.url())).await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;
    assert_eq!(response.status(), 200);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_download_route_absent_by_default(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;

    let response = reqwest::get(format!("{}/download_db", server.url())).await?;
    assert_eq!(response.status(), 404);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unknown_route_returns_404(pool: SqlitePool) -> Result<(), anyhow::Error> {
    let server = TestTapServer::spawn(pool).await?;

    let response = reqwest::get(format!("{}/nonexistent", server.url())).await?;
    assert_eq!(response.status(), 404);

    Ok(())
}
