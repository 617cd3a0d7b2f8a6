//! # Reelshelf Server
//!
//! JSON API and command line for the Reelshelf movie lending service.
//!
//! The server is built on Axum and uses:
//! - PostgreSQL for persistent storage, or an in-memory store when no
//!   database is configured
//! - Signed, expiring tokens for bearer authentication and mailed links
//! - Role bitmasks for authorization

pub mod infra;
pub mod movies;
pub mod routes;
pub mod users;

pub use infra::app_state::AppState;
