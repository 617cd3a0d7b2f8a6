use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use reelshelf_model::{User, UserID};

use super::{
    map_write_error,
    rows::{USER_COLUMNS, UserRow},
};
use crate::{
    database::ports::UsersRepository,
    error::{Result, ShelfError},
};

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, username, password_hash, role_id,
                confirmed, remaining_quota, avatar_url, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.to_uuid())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role_id.map(|id| id.to_uuid()))
        .bind(user.confirmed)
        .bind(user.remaining_quota)
        .bind(&user.avatar_url)
        .bind(user.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_write_error(e, "Failed to create user"))?;

        info!("Created user: {} ({})", user.username, user.id);
        Ok(())
    }

    async fn get_user_by_id(&self, id: UserID) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_one_by("email", email).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.fetch_one_by("username", username).await
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, username = $3, password_hash = $4, role_id = $5,
                confirmed = $6, avatar_url = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id.to_uuid())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role_id.map(|id| id.to_uuid()))
        .bind(user.confirmed)
        .bind(&user.avatar_url)
        .execute(self.pool())
        .await
        .map_err(|e| map_write_error(e, "Failed to update user"))?;

        if result.rows_affected() == 0 {
            return Err(ShelfError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }
}
