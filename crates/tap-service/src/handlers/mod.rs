//! HTTP handlers for the tap service.
//!
//! Handlers keep the request and response shapes the Mini App frontend
//! already speaks: ids arrive as JSON strings or numbers, query parameters
//! are named like the original columns, and errors are `{"error": ...}`.

mod account_age;
mod download;
mod gamers;
mod health;
mod me;
mod metrics;
mod ranking;
mod telegram;
mod users;

pub use account_age::get_creation_month_count;
pub use download::download_db;
pub use gamers::{get_or_add_gamer, update_gamer};
pub use health::health_check;
pub use me::{get_me, MeResponse};
pub use metrics::metrics_handler;
pub use ranking::get_user_ranking;
pub use telegram::check_telegram_status;
pub use users::{add_user, get_invitations, get_user, increase_totalgot, update_user};

use serde_json::Value;

/// Read a client-supplied identifier.
///
/// Strings are trimmed and numbers are printed as-is. Absent, null, empty,
/// zero and `false` values all count as missing.
pub(crate) fn id_from_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => {
            let zero = n.as_f64().is_some_and(|f| f == 0.0);
            (!zero).then(|| n.to_string())
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Read a client-supplied numeric identifier.
pub(crate) fn numeric_id_from_value(value: Option<&Value>) -> Option<i64> {
    id_from_value(value)?.parse().ok()
}

/// Non-empty query parameter.
pub(crate) fn non_empty(param: Option<&String>) -> Option<&str> {
    param.map(|s| s.trim()).filter(|s| !s.is_empty())
}
