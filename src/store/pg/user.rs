use async_trait::async_trait;

use super::{PgStore, conflict_on_unique};
use crate::error::AppError;
use crate::model::{Role, User};
use crate::store::{NewUser, ProfileChanges, UserStore};

const USER_COLUMNS: &str = "id, username, email, password_hash, roles, created_at";

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, new: NewUser) -> Result<User, AppError> {
        let roles: Vec<String> = new.roles.iter().map(|r| r.as_str().to_string()).collect();

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, roles, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&roles)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username or email already taken"))
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "username or email already taken"))?
        .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn set_roles(&self, id: i64, roles: &[Role]) -> Result<User, AppError> {
        let raw: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();

        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET roles = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&raw)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))
    }
}
