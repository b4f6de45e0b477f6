//! Telegram initData gate for protected routes.
//!
//! Reads the raw initData string from the `X-Telegram-Init-Data` header,
//! verifies its signature and freshness, and injects the verified
//! `InitData` into request extensions.

use crate::errors::ApiError;
use crate::observability::metrics::record_init_data_verification;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::IntoResponse,
};
use common::init_data::{InitDataVerifier, INIT_DATA_HEADER};
use std::sync::Arc;
use tracing::instrument;

/// State for the initData middleware.
#[derive(Clone)]
pub struct InitDataState {
    /// Verifier holding the derived signing key and freshness policy.
    pub verifier: Arc<InitDataVerifier>,
}

/// Middleware that admits only requests carrying valid initData.
///
/// # Response
///
/// - `OPTIONS` requests pass through untouched (CORS preflight)
/// - Returns 403 with `{"error": "Invalid Telegram initData"}` if the header
///   is missing, not UTF-8, or fails verification, whatever the cause
/// - Continues to next handler with `InitData` in extensions otherwise
#[instrument(skip_all, name = "tap.middleware.init_data")]
pub async fn require_init_data(
    State(state): State<Arc<InitDataState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let raw = req
        .headers()
        .get(INIT_DATA_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "tap.middleware.init_data", "Missing or unreadable initData header");
            record_init_data_verification("missing_header");
            ApiError::Unauthenticated
        })?;

    let init_data = state.verifier.verify_now(raw).map_err(|e| {
        tracing::debug!(target: "tap.middleware.init_data", reason = e.reason(), "initData rejected");
        record_init_data_verification(e.reason());
        ApiError::Unauthenticated
    })?;

    record_init_data_verification("accepted");
    req.extensions_mut().insert(init_data);

    Ok(next.run(req).await)
}
