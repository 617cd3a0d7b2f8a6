//! Core data model definitions shared across Reelshelf crates.
//!
//! These are plain records: persistence lives in `reelshelf-core`, and the
//! HTTP shapes live in `reelshelf-server`.

pub mod ids;
pub mod loan;
pub mod movie;
pub mod page;
pub mod permissions;
pub mod role;
pub mod user;

pub use ids::{MovieID, RoleID, UserID};
pub use loan::Loan;
pub use movie::{DEFAULT_STOCK, LIST_SEPARATOR, Movie, MovieUpdate, NewMovie};
pub use page::{Page, PageRequest};
pub use permissions::Permissions;
pub use role::{Role, roles};
pub use user::{DEFAULT_AVATAR_URL, DEFAULT_BORROW_QUOTA, User};
