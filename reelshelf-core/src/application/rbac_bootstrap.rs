use std::{fmt, sync::Arc};

use tracing::info;

use reelshelf_model::Role;

use crate::{
    database::ports::RolesRepository,
    error::Result,
    rbac::{RoleSeed, default_role_seeds},
};

/// Seeds the built-in roles. Safe to run on every startup.
pub struct RbacBootstrapService {
    repo: Arc<dyn RolesRepository>,
}

impl fmt::Debug for RbacBootstrapService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbacBootstrapService")
            .field("repo", &"Arc<dyn RolesRepository>")
            .finish()
    }
}

impl RbacBootstrapService {
    pub fn new(repo: Arc<dyn RolesRepository>) -> Self {
        Self { repo }
    }

    pub async fn ensure_defaults(&self) -> Result<Vec<Role>> {
        self.reconcile(&default_role_seeds()).await
    }

    pub async fn reconcile(&self, seeds: &[RoleSeed]) -> Result<Vec<Role>> {
        let roles = self.repo.reconcile_roles(seeds).await?;
        for role in &roles {
            info!(
                role = %role.name,
                permissions = ?role.permissions,
                default = role.is_default,
                "Role in place"
            );
        }
        Ok(roles)
    }
}
