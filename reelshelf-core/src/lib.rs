//! # Reelshelf Core
//!
//! Business logic of the Reelshelf lending service.
//!
//! - [`auth`]: Argon2id password hashing and signed, expiring account tokens
//! - [`rbac`]: bitmask capability checks and the built-in role set
//! - [`ledger`]: borrow/return transitions over a user and a movie
//! - [`catalog`]: movie validation, locked edits and catalog search matching
//! - [`database`]: repository ports with PostgreSQL and in-memory adapters
//! - [`application`]: account, catalog and lending services
//!
//! ## Feature Flags
//!
//! - `database` (default): PostgreSQL adapters and embedded migrations
//! - `postgres-tests`: integration tests that need a live `DATABASE_URL`
//!
//! ## Example
//!
//! ```
//! use reelshelf_core::auth::{ConfirmClaim, TokenCodec};
//! use reelshelf_model::UserID;
//! use std::time::Duration;
//!
//! let codec = TokenCodec::new("hard to guess string").unwrap();
//! let id = UserID::new();
//! let token = codec
//!     .issue(&ConfirmClaim { confirm: id }, Duration::from_secs(3600))
//!     .unwrap();
//! let claim: ConfirmClaim = codec.verify(&token).unwrap();
//! assert_eq!(claim.confirm, id);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod application;
pub mod auth;
pub mod catalog;
pub mod database;
pub mod error;
pub mod ledger;
pub mod rbac;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{Result, ShelfError};
pub use rbac::Principal;
