use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use reelshelf_core::Principal;
use reelshelf_model::{Permissions, Role, User};

use crate::infra::errors::{AppError, AppResult};

/// Account as returned to its owner.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub confirmed: bool,
    pub role: Option<String>,
    pub permissions: Vec<&'static str>,
    pub remaining_quota: i32,
    pub avatar_url: String,
    pub member_since: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user: &User, role: Option<&Role>) -> Self {
        let permissions = role
            .map(|role| role.permissions)
            .unwrap_or(Permissions::NONE);
        Self {
            id: user.id.to_uuid(),
            username: user.username.clone(),
            email: user.email.clone(),
            confirmed: user.confirmed,
            role: role.map(|role| role.name.clone()),
            permissions: permissions.names(),
            remaining_quota: user.remaining_quota,
            avatar_url: user.avatar_url.clone(),
            member_since: user.created_at,
        }
    }

    pub fn from_principal(principal: &Principal) -> AppResult<Self> {
        let user = current_user(principal)?;
        Ok(Self::new(user, principal.role()))
    }
}

/// The authenticated account behind `principal`.
pub fn current_user(principal: &Principal) -> AppResult<&User> {
    principal
        .user()
        .ok_or_else(|| AppError::unauthorized("Authentication required"))
}
