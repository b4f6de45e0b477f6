//! Middleware for the tap service.
//!
//! # Components
//!
//! - `init_data` - Telegram initData gate for protected routes
//! - `http_metrics` - request/response metrics for every route

pub mod http_metrics;
pub mod init_data;

pub use http_metrics::http_metrics_middleware;
pub use init_data::{require_init_data, InitDataState};
