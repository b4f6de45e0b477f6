//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for the Telegram bot token and any
//! other credential the service holds. `SecretString` implements `Debug`
//! with redaction, so a struct that derives `Debug` and holds one cannot leak
//! the value through `{:?}` or tracing fields.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct BotCredentials {
//!     bot_name: String,
//!     token: SecretString,
//! }
//!
//! let creds = BotCredentials {
//!     bot_name: "tap_bot".to_string(),
//!     token: SecretString::from("123456:ABC"),
//! };
//!
//! // Token is redacted
//! println!("{:?}", creds);
//!
//! // Reading the value is always explicit
//! let token: &str = creds.token.expose_secret();
//! ```

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
