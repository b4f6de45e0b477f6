//! Common utilities and types shared across the tap backend crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for Telegram WebApp initData verification
pub mod init_data;
