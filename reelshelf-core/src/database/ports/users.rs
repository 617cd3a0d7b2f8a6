use async_trait::async_trait;

use reelshelf_model::{User, UserID};

use crate::error::Result;

// Account records. The borrow quota is written by the loans port only.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert a new account; a duplicate email or username is a `Conflict`.
    async fn create_user(&self, user: &User) -> Result<()>;
    async fn get_user_by_id(&self, id: UserID) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Persist profile fields (email, username, password hash, role,
    /// confirmation, avatar). `remaining_quota` is left untouched.
    async fn update_user(&self, user: &User) -> Result<()>;
}
