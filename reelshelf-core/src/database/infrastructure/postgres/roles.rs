use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use reelshelf_model::{Role, RoleID};

use super::{map_write_error, rows::RoleRow};
use crate::{
    database::ports::RolesRepository,
    error::Result,
    rbac::{RoleSeed, validate_seeds},
};

/// PostgreSQL-backed implementation of the `RolesRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresRolesRepository {
    pool: PgPool,
}

impl PostgresRolesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RolesRepository for PostgresRolesRepository {
    async fn reconcile_roles(&self, seeds: &[RoleSeed]) -> Result<Vec<Role>> {
        validate_seeds(seeds)?;

        let mut tx = self.pool().begin().await?;

        // Serialize concurrent reconcilers; readers are not blocked.
        sqlx::query("LOCK TABLE roles IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        // The single-default index is not deferrable, so clear stale
        // defaults before any upsert can set the new one.
        sqlx::query("UPDATE roles SET is_default = FALSE WHERE is_default")
            .execute(&mut *tx)
            .await?;

        let mut reconciled = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let row = sqlx::query_as::<_, RoleRow>(
                r#"
                INSERT INTO roles (id, name, is_default, permissions)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (name) DO UPDATE
                SET is_default = EXCLUDED.is_default,
                    permissions = EXCLUDED.permissions
                RETURNING id, name, is_default, permissions
                "#,
            )
            .bind(RoleID::new().to_uuid())
            .bind(&seed.name)
            .bind(seed.is_default)
            .bind(seed.permissions.bits())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "Failed to upsert role"))?;
            reconciled.push(Role::from(row));
        }

        tx.commit().await?;

        info!(count = reconciled.len(), "Reconciled roles");
        Ok(reconciled)
    }

    async fn get_role(&self, id: RoleID) -> Result<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, is_default, permissions FROM roles WHERE id = $1",
        )
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Role::from))
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, is_default, permissions FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Role::from))
    }

    async fn get_default_role(&self) -> Result<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, is_default, permissions FROM roles WHERE is_default",
        )
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Role::from))
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, is_default, permissions FROM roles ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Role::from).collect())
    }
}
