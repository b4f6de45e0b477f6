//! Telegram Bot API client for channel membership checks.
//!
//! # Security
//!
//! - The bot token is part of the request path; request URLs and reqwest
//!   errors carrying them are never logged
//! - Timeouts prevent hanging connections
//! - Failures are logged server-side with a generic message returned

use crate::errors::ApiError;
use common::secret::{ExposeSecret, SecretString};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Default timeout for Bot API requests in seconds.
const TELEGRAM_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Chat member statuses that count as being in the chat.
const MEMBER_STATUSES: &[&str] = &["member", "administrator", "creator"];

/// `getChatMember` response envelope.
#[derive(Debug, Deserialize)]
struct GetChatMemberResponse {
    #[serde(default)]
    ok: bool,
    result: Option<ChatMember>,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: Option<String>,
}

/// Checks whether a user belongs to a Telegram chat.
#[async_trait::async_trait]
pub trait ChatMembershipChecker: Send + Sync {
    /// `true` when the user is a member, administrator or creator of the chat.
    async fn is_member(&self, chat_id: &str, user_id: &str) -> Result<bool, ApiError>;
}

/// HTTP client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Bot API base URL, e.g. `https://api.telegram.org`.
    base_url: String,

    bot_token: SecretString,
}

impl TelegramClient {
    /// Create a new Bot API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: String, bot_token: SecretString) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TELEGRAM_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "tap.services.telegram_client", error = %e, "Failed to build HTTP client");
                ApiError::Internal
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
        })
    }

    /// Query `getChatMember` and interpret the member status.
    ///
    /// # Errors
    ///
    /// `ApiError::ServiceUnavailable` if the Bot API is unreachable, answers
    /// with a non-success status, or returns an unreadable body.
    #[instrument(skip(self), name = "tap.services.telegram_client.get_chat_member")]
    pub async fn get_chat_member_status(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<bool, ApiError> {
        let url = format!(
            "{}/bot{}/getChatMember",
            self.base_url,
            self.bot_token.expose_secret()
        );

        let response = self
            .client
            .get(&url)
            .query(&[("chat_id", chat_id), ("user_id", user_id)])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "tap.services.telegram_client", error = %e.without_url(), "Bot API request failed");
                ApiError::ServiceUnavailable("Bot API request failed".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "tap.services.telegram_client", status = %status, "Bot API returned error status");
            return Err(ApiError::ServiceUnavailable(format!(
                "Bot API returned {}",
                status.as_u16()
            )));
        }

        let body: GetChatMemberResponse = response.json().await.map_err(|e| {
            warn!(target: "tap.services.telegram_client", error = %e.without_url(), "Failed to parse Bot API response");
            ApiError::ServiceUnavailable("Unreadable Bot API response".to_string())
        })?;

        let is_member = is_member_response(&body);
        debug!(target: "tap.services.telegram_client", is_member, "Membership resolved");
        Ok(is_member)
    }
}

#[async_trait::async_trait]
impl ChatMembershipChecker for TelegramClient {
    async fn is_member(&self, chat_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.get_chat_member_status(chat_id, user_id).await
    }
}

fn is_member_response(body: &GetChatMemberResponse) -> bool {
    body.ok
        && body
            .result
            .as_ref()
            .and_then(|member| member.status.as_deref())
            .is_some_and(|status| MEMBER_STATUSES.contains(&status))
}

/// Mock membership checker module for testing.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock membership checker with a fixed answer.
    pub struct MockMembershipChecker {
        is_member: bool,
        return_error: bool,
        call_count: AtomicUsize,
    }

    impl MockMembershipChecker {
        /// Create a mock that reports every user as a member.
        pub fn member() -> Self {
            Self {
                is_member: true,
                return_error: false,
                call_count: AtomicUsize::new(0),
            }
        }

        /// Create a mock that reports every user as absent.
        pub fn not_member() -> Self {
            Self {
                is_member: false,
                return_error: false,
                call_count: AtomicUsize::new(0),
            }
        }

        /// Create a mock whose Bot API is unreachable.
        pub fn failing() -> Self {
            Self {
                is_member: false,
                return_error: true,
                call_count: AtomicUsize::new(0),
            }
        }

        /// Get the number of calls made.
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ChatMembershipChecker for MockMembershipChecker {
        async fn is_member(&self, _chat_id: &str, _user_id: &str) -> Result<bool, ApiError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            if self.return_error {
                return Err(ApiError::ServiceUnavailable(
                    "Mock Bot API error".to_string(),
                ));
            }

            Ok(self.is_member)
        }
    }
}
