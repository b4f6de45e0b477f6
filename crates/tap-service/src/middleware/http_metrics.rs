//! HTTP metrics middleware.
//!
//! Applied as the outermost layer so it also sees responses produced before
//! any handler runs: initData rejections, 404/405 from routing and JSON
//! extractor failures.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Middleware that records method, normalized path, status code and
/// duration for every response.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::post,
        Json, Router,
    };
    use tower::ServiceExt;

    async fn echo(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
        Json(body)
    }

    fn test_app() -> Router {
        Router::new()
            .route("/add_user", post(echo))
            .layer(middleware::from_fn(http_metrics_middleware))
    }

    async fn status_of(request: HttpRequest<Body>) -> StatusCode {
        test_app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_passes_through_success() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/add_user")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"UserId":"1"}"#))
            .unwrap();

        assert_eq!(status_of(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_passes_through_extractor_rejection() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/add_user")
            .body(Body::from("not json"))
            .unwrap();

        assert_eq!(
            status_of(request).await,
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[tokio::test]
    async fn test_passes_through_routing_errors() {
        let not_found = HttpRequest::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(not_found).await, StatusCode::NOT_FOUND);

        let wrong_method = HttpRequest::builder()
            .method("GET")
            .uri("/add_user")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(wrong_method).await, StatusCode::METHOD_NOT_ALLOWED);
    }
}
