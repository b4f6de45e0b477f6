//! # Tap Test Utilities
//!
//! Shared test utilities for the tap service.
//!
//! This crate provides:
//! - Server test harness (`TestTapServer` for E2E tests)
//! - Signed initData fixtures (`init_data_fixtures`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tap_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: SqlitePool) -> Result<()> {
//!     let server = TestTapServer::spawn(pool).await?;
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/get_user?UserId=42", server.url()))
//!         .header(INIT_DATA_HEADER, fresh_init_data(42))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 404);
//!     Ok(())
//! }
//! ```

pub mod init_data_fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use common::init_data::INIT_DATA_HEADER;
pub use init_data_fixtures::*;
pub use server_harness::*;
