//! Repository layer for database access.
//!
//! SQLite through sqlx. Every function takes the pool explicitly and maps
//! driver errors to `ApiError::Database`.

pub mod fields;
pub mod gamers;
pub mod users;
