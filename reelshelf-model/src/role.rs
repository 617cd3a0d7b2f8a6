use crate::{ids::RoleID, permissions::Permissions};

/// Well-known role names seeded at startup.
pub mod roles {
    pub const USER: &str = "User";
    pub const MODERATOR: &str = "Moderator";
    pub const ADMINISTRATOR: &str = "Administrator";
}

/// A named bundle of capabilities assigned to users.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Role {
    pub id: RoleID,
    /// Unique role name (e.g. "User", "Administrator")
    pub name: String,
    /// Whether newly registered accounts receive this role
    pub is_default: bool,
    pub permissions: Permissions,
}

impl Role {
    /// `true` iff the role grants every requested capability.
    pub fn can(&self, requested: Permissions) -> bool {
        self.permissions.contains(requested)
    }
}
