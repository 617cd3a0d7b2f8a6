use async_trait::async_trait;

use reelshelf_model::{Role, RoleID};

use crate::{error::Result, rbac::RoleSeed};

#[async_trait]
pub trait RolesRepository: Send + Sync {
    /// Upsert every seed by name in one transaction and return the stored
    /// roles. Stale default flags are cleared first so exactly one role is
    /// default afterwards. Roles not named by a seed are kept.
    async fn reconcile_roles(&self, seeds: &[RoleSeed]) -> Result<Vec<Role>>;
    async fn get_role(&self, id: RoleID) -> Result<Option<Role>>;
    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>>;
    async fn get_default_role(&self) -> Result<Option<Role>>;
    async fn list_roles(&self) -> Result<Vec<Role>>;
}
