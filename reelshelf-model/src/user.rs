use chrono::{DateTime, Utc};

use crate::ids::{RoleID, UserID};

/// Avatar assigned to accounts that never uploaded one.
pub const DEFAULT_AVATAR_URL: &str =
    "https://ws1.sinaimg.cn/large/647dc635jw1fb6f78kot1j20b40b4mx1.jpg";

/// Number of simultaneous loans a fresh account may hold.
pub const DEFAULT_BORROW_QUOTA: i32 = 7;

/// A registered account.
///
/// `remaining_quota` is owned by the lending ledger: profile updates never
/// write it, only borrow/return transactions do.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserID,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role_id: Option<RoleID>,
    pub confirmed: bool,
    pub remaining_quota: i32,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build an unconfirmed account with the default avatar.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role_id: Option<RoleID>,
        quota: i32,
    ) -> Self {
        Self {
            id: UserID::new(),
            email: email.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            role_id,
            confirmed: false,
            remaining_quota: quota,
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn can_borrow(&self) -> bool {
        self.remaining_quota > 0
    }
}
