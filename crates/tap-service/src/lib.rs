//! Tap Service Library
//!
//! Backend for a Telegram Mini App "tap-to-earn" game:
//!
//! - Telegram initData verification on every protected request
//! - User registration, mining state, referrals and balances
//! - Leaderboard and account-age rewards
//! - Channel membership checks through the Bot API
//! - Mini-game (gamer) state
//!
//! # Architecture
//!
//! Handler -> Service -> Repository:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - initData gate and HTTP metrics
//! - `models` - Database rows and API payloads
//! - `observability` - Prometheus metrics
//! - `repositories` - SQLite access
//! - `routes` - Axum router setup
//! - `services` - Ranking, creation date estimate, Bot API client

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
