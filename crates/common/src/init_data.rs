//! Telegram WebApp `initData` verification.
//!
//! A Mini App client attaches the `initData` query string it received from
//! Telegram to every request. The string carries the launching user's
//! identity and is signed by Telegram with a key derived from the bot token:
//!
//! ```text
//! signing_key    = HMAC-SHA256(key = "WebAppData", msg = bot_token)
//! check_string   = sorted "key=value" pairs (all fields except `hash`), '\n'-joined
//! hash           = hex(HMAC-SHA256(key = signing_key, msg = check_string))
//! ```
//!
//! # Security
//!
//! - Payloads are size-checked BEFORE decoding (DoS prevention)
//! - The signing key is derived once, when the verifier is built
//! - Signatures are compared with `ring::hmac::verify` (constant time)
//! - Every rejection displays the same generic message; the specific reason
//!   is only available through [`InitDataError::reason`] for server-side logs
//! - Payload contents, check strings and hashes are never logged
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::init_data::InitDataVerifier;
//!
//! let verifier = InitDataVerifier::new(&bot_token);
//! let init_data = verifier.verify(raw_header_value, chrono::Utc::now().timestamp())?;
//! let user = init_data.user();
//! ```

use ring::hmac;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Header carrying the raw `initData` string on every authenticated request.
pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

/// Maximum accepted `initData` size in bytes (8KB).
///
/// Real payloads are a few hundred bytes. Anything larger is rejected before
/// query-string decoding or HMAC computation.
pub const MAX_INIT_DATA_SIZE_BYTES: usize = 8192;

/// Default replay window: `auth_date` may be at most 24 hours old.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Default tolerance for an `auth_date` ahead of the server clock (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum configurable clock skew tolerance (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Maximum configurable replay window (30 days).
pub const MAX_REPLAY_WINDOW: Duration = Duration::from_secs(30 * 86_400);

/// Fixed key used to derive the signing key from the bot token.
const WEB_APP_DATA_KEY: &[u8] = b"WebAppData";

const HASH_FIELD: &str = "hash";
const AUTH_DATE_FIELD: &str = "auth_date";
const USER_FIELD: &str = "user";

// =============================================================================
// Error Types
// =============================================================================

/// Reasons an `initData` payload is rejected.
///
/// Display output is identical for every variant so that client-facing
/// messages never reveal which check failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitDataError {
    /// Payload could not be decoded (oversized or not valid text).
    #[error("Invalid Telegram initData")]
    MalformedPayload,

    /// Payload has no (or an empty) `hash` field.
    #[error("Invalid Telegram initData")]
    MissingSignature,

    /// Recomputed signature does not match the claimed `hash`.
    #[error("Invalid Telegram initData")]
    SignatureMismatch,

    /// `auth_date` is older than the replay window.
    #[error("Invalid Telegram initData")]
    Expired,

    /// `auth_date` is further in the future than the clock skew allows.
    #[error("Invalid Telegram initData")]
    IssuedInFuture,
}

impl InitDataError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            InitDataError::MalformedPayload => "malformed_payload",
            InitDataError::MissingSignature => "missing_signature",
            InitDataError::SignatureMismatch => "signature_mismatch",
            InitDataError::Expired => "expired",
            InitDataError::IssuedInFuture => "issued_in_future",
        }
    }
}

// =============================================================================
// Claims Types
// =============================================================================

/// Telegram user object carried in the `user` field of `initData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    /// Telegram user identifier.
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
}

/// Authenticated `initData` claims: every decoded field except `hash`.
///
/// Field values are redacted in Debug output; only the field names are shown.
#[derive(Clone, PartialEq, Eq)]
pub struct InitData {
    fields: BTreeMap<String, String>,
}

impl fmt::Debug for InitData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitData")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl InitData {
    /// Look up a single field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// All authenticated fields, ordered by key.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Signing time as Unix seconds; `0` when absent or not an integer.
    #[must_use]
    pub fn auth_date(&self) -> i64 {
        self.get(AUTH_DATE_FIELD)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// The launching user, if the payload carries a parseable `user` field.
    #[must_use]
    pub fn user(&self) -> Option<TelegramUser> {
        let raw = self.get(USER_FIELD)?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(target: "common.init_data", error = %e, "Failed to parse user field");
                None
            }
        }
    }
}

// =============================================================================
// Verifier
// =============================================================================

/// Verifies `initData` payloads against one bot token.
///
/// Stateless after construction and cheap to share behind an `Arc`.
#[derive(Clone)]
pub struct InitDataVerifier {
    signing_key: hmac::Key,
    max_age: Duration,
    clock_skew: Duration,
}

impl fmt::Debug for InitDataVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitDataVerifier")
            .field("signing_key", &"[REDACTED]")
            .field("max_age", &self.max_age)
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

impl InitDataVerifier {
    /// Build a verifier with the default 24h replay window and 5 minute skew.
    #[must_use]
    pub fn new(bot_token: &SecretString) -> Self {
        Self::with_policy(bot_token, DEFAULT_MAX_AGE, DEFAULT_CLOCK_SKEW)
    }

    /// Build a verifier with an explicit freshness policy.
    #[must_use]
    pub fn with_policy(bot_token: &SecretString, max_age: Duration, clock_skew: Duration) -> Self {
        Self {
            signing_key: derive_signing_key(bot_token),
            max_age,
            clock_skew,
        }
    }

    /// Verify `raw` as of `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` - payload exceeds `MAX_INIT_DATA_SIZE_BYTES`
    /// - `MissingSignature` - no `hash` field, or it is empty
    /// - `SignatureMismatch` - `hash` is not lowercase hex or does not match
    /// - `Expired` - `now - auth_date` exceeds the replay window
    /// - `IssuedInFuture` - `auth_date - now` exceeds the clock skew
    pub fn verify(&self, raw: &str, now: i64) -> Result<InitData, InitDataError> {
        if raw.len() > MAX_INIT_DATA_SIZE_BYTES {
            tracing::debug!(
                target: "common.init_data",
                size = raw.len(),
                max_size = MAX_INIT_DATA_SIZE_BYTES,
                "initData rejected: size exceeds maximum allowed"
            );
            return Err(InitDataError::MalformedPayload);
        }

        let mut fields = decode_fields(raw);

        let claimed_hash = match fields.remove(HASH_FIELD) {
            Some(hash) if !hash.is_empty() => hash,
            _ => {
                tracing::debug!(target: "common.init_data", "initData rejected: hash is missing");
                return Err(InitDataError::MissingSignature);
            }
        };

        let claimed_tag = decode_lowercase_hex(&claimed_hash).ok_or_else(|| {
            tracing::debug!(target: "common.init_data", "initData rejected: hash is not lowercase hex");
            InitDataError::SignatureMismatch
        })?;

        let check_string = data_check_string(&fields);
        hmac::verify(&self.signing_key, check_string.as_bytes(), &claimed_tag).map_err(|_| {
            tracing::debug!(target: "common.init_data", "initData rejected: signature mismatch");
            InitDataError::SignatureMismatch
        })?;

        let init_data = InitData { fields };
        self.check_freshness(init_data.auth_date(), now)?;

        Ok(init_data)
    }

    /// Verify `raw` against the current wall clock.
    ///
    /// # Errors
    ///
    /// See [`InitDataVerifier::verify`].
    pub fn verify_now(&self, raw: &str) -> Result<InitData, InitDataError> {
        self.verify(raw, chrono::Utc::now().timestamp())
    }

    /// Compute the lowercase hex `hash` Telegram would attach to `fields`.
    #[must_use]
    pub fn sign(&self, fields: &BTreeMap<String, String>) -> String {
        let check_string = data_check_string(fields);
        hex::encode(hmac::sign(&self.signing_key, check_string.as_bytes()).as_ref())
    }

    fn check_freshness(&self, auth_date: i64, now: i64) -> Result<(), InitDataError> {
        let max_age_secs = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        let clock_skew_secs = i64::try_from(self.clock_skew.as_secs()).unwrap_or(i64::MAX);

        let age = now.saturating_sub(auth_date);
        if age > max_age_secs {
            tracing::debug!(
                target: "common.init_data",
                auth_date = auth_date,
                now = now,
                max_age_secs = max_age_secs,
                "initData rejected: auth_date outside replay window"
            );
            return Err(InitDataError::Expired);
        }

        if age.saturating_neg() > clock_skew_secs {
            tracing::debug!(
                target: "common.init_data",
                auth_date = auth_date,
                now = now,
                clock_skew_secs = clock_skew_secs,
                "initData rejected: auth_date too far in the future"
            );
            return Err(InitDataError::IssuedInFuture);
        }

        Ok(())
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Verify `raw` with the default policy.
///
/// Convenience form of [`InitDataVerifier::verify`] for one-off checks; it
/// re-derives the signing key on every call, so long-lived callers should
/// hold an `InitDataVerifier` instead.
///
/// # Errors
///
/// See [`InitDataVerifier::verify`].
pub fn verify_init_data(
    raw: &str,
    bot_token: &SecretString,
    now: i64,
) -> Result<InitData, InitDataError> {
    InitDataVerifier::new(bot_token).verify(raw, now)
}

/// Compute the `hash` for `fields` signed with `bot_token`.
#[must_use]
pub fn sign(bot_token: &SecretString, fields: &BTreeMap<String, String>) -> String {
    InitDataVerifier::new(bot_token).sign(fields)
}

/// Build the data-check string: `key=value` lines sorted by key, joined by
/// `\n` with no trailing newline.
#[must_use]
pub fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn derive_signing_key(bot_token: &SecretString) -> hmac::Key {
    let derivation_key = hmac::Key::new(hmac::HMAC_SHA256, WEB_APP_DATA_KEY);
    let secret_key = hmac::sign(&derivation_key, bot_token.expose_secret().as_bytes());
    hmac::Key::new(hmac::HMAC_SHA256, secret_key.as_ref())
}

/// Decode a query string; blank values are kept and the last duplicate wins.
fn decode_fields(raw: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

fn decode_lowercase_hex(value: &str) -> Option<Vec<u8>> {
    if !value
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    hex::decode(value).ok()
}
