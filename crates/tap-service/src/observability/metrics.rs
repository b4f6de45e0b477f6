//! Metrics definitions for the tap service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `tap_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: the fixed route list, anything else is `/other`
//! - `status` (duration histogram): 3 values (success, error, timeout)
//! - `status_code` (request counter): the numeric HTTP status code
//! - `outcome`: `accepted` or an initData rejection reason

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Routes the service serves. Used as-is for the `endpoint` label.
const KNOWN_ENDPOINTS: &[&str] = &[
    "/health",
    "/metrics",
    "/download_db",
    "/me",
    "/add_user",
    "/get_user",
    "/get_invitations",
    "/update_user",
    "/increase_totalgot",
    "/get_user_ranking",
    "/get_creation_month_count",
    "/check_telegram_status",
    "/gamer",
    "/update_gamer",
];

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("tap_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metrics:
/// - `tap_http_request_duration_seconds`, labels `method`, `endpoint`, `status`
/// - `tap_http_requests_total`, labels `method`, `endpoint`, `status_code`
///
/// Captures every response, including initData rejections and framework
/// errors (415, 422, 404, 405).
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("tap_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("tap_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Map a request path onto the bounded endpoint label set.
fn normalize_endpoint(path: &str) -> &'static str {
    KNOWN_ENDPOINTS
        .iter()
        .find(|known| **known == path)
        .copied()
        .unwrap_or("/other")
}

// ============================================================================
// initData Metrics
// ============================================================================

/// Record an initData gate decision
///
/// Metric: `tap_init_data_verifications_total`
/// Labels: `outcome` (`accepted`, `missing_header`, or an `InitDataError`
/// reason)
pub fn record_init_data_verification(outcome: &'static str) {
    counter!("tap_init_data_verifications_total", "outcome" => outcome).increment(1);
}
