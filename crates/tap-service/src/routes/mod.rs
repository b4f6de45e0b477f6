//! HTTP routes for the tap service.
//!
//! Defines the Axum router and application state. Which routes require
//! initData is decided here, by the router a route is mounted on: only
//! `protected_routes` carries the initData gate.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_init_data, InitDataState};
use crate::services::ChatMembershipChecker;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use common::init_data::{InitDataVerifier, INIT_DATA_HEADER};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Request timeout applied to every route.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: SqlitePool,

    /// Service configuration.
    pub config: Config,

    /// Telegram chat membership lookups.
    pub membership: Arc<dyn ChatMembershipChecker>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/metrics` - public operational endpoints
/// - `/download_db` - public, only when a download path is configured
/// - every other route - requires valid Telegram initData
/// - CORS for the configured origins
/// - TraceLayer for request logging
/// - 30 second request timeout
/// - HTTP metrics middleware (outermost)
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let verifier = InitDataVerifier::with_policy(
        &state.config.bot_token,
        Duration::from_secs(state.config.init_data_max_age_seconds),
        Duration::from_secs(state.config.init_data_clock_skew_seconds),
    );
    let init_data_state = Arc::new(InitDataState {
        verifier: Arc::new(verifier),
    });

    // Public routes (no initData required)
    let mut public_routes = Router::new().route("/health", get(handlers::health_check));
    if state.config.db_download_path.is_some() {
        public_routes = public_routes.route("/download_db", get(handlers::download_db));
    }
    let public_routes = public_routes.with_state(state.clone());

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Protected routes (initData required)
    let protected_routes = Router::new()
        .route("/me", get(handlers::get_me))
        .route("/add_user", post(handlers::add_user))
        .route("/get_user", get(handlers::get_user))
        .route("/get_invitations", get(handlers::get_invitations))
        .route("/update_user", post(handlers::update_user))
        .route("/increase_totalgot", post(handlers::increase_totalgot))
        .route("/get_user_ranking", get(handlers::get_user_ranking))
        .route(
            "/get_creation_month_count",
            get(handlers::get_creation_month_count),
        )
        .route(
            "/check_telegram_status",
            get(handlers::check_telegram_status),
        )
        .route("/gamer", post(handlers::get_or_add_gamer))
        .route("/update_gamer", post(handlers::update_gamer))
        .route_layer(middleware::from_fn_with_state(
            init_data_state,
            require_init_data,
        ))
        .with_state(state.clone());

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. CorsLayer - answers preflight before the initData gate
    // 4. http_metrics_middleware (outermost)
    let router = public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(&state.config.cors_allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(middleware::from_fn(http_metrics_middleware))
}

/// CORS for the Mini App origins. `None` when no origin is configured.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                HeaderName::from_static(INIT_DATA_HEADER),
            ])
            .max_age(Duration::from_secs(600)),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_cors_layer_requires_an_origin() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["https://tap.example".to_string()]).is_some());
    }
}
