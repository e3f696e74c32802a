use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::{Role, User};
use crate::store::{NewUser, ProfileChanges, Store, UserStore};
use crate::utils::{hash_password, verify_password};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl User {
    pub async fn register(store: &dyn Store, req: RegisterRequest) -> Result<User, AppError> {
        let mut problems = Vec::new();
        if req.username.trim().is_empty() {
            problems.push("username: must not be blank");
        } else if !req
            .username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_')
        {
            // 用户名只允许字母、数字和下划线
            problems.push("username: only letters, digits and underscore allowed");
        }
        if !req.email.contains('@') {
            problems.push("email: not a valid address");
        }
        if req.password.len() < 6 {
            problems.push("password: must be at least 6 characters");
        }
        if !problems.is_empty() {
            return Err(AppError::validation(problems.join("; ")));
        }

        let password_hash = hash_password(&req.password)
            .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))?;

        // 用户名/邮箱唯一性由存储层裁决，重复时是 Conflict
        store
            .insert_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                roles: vec![Role::User],
            })
            .await
    }

    pub async fn login(store: &dyn Store, req: LoginRequest) -> Result<User, AppError> {
        let user = store
            .find_user_by_username(&req.username)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        let ok = verify_password(&req.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))?;
        if !ok {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    pub async fn update_profile(
        store: &dyn Store,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let password_hash = match req.password {
            Some(password) if password.len() < 6 => {
                return Err(AppError::validation(
                    "password: must be at least 6 characters",
                ));
            }
            Some(password) => Some(
                hash_password(&password)
                    .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))?,
            ),
            None => None,
        };

        store
            .update_profile(
                user_id,
                ProfileChanges {
                    username: req.username,
                    email: req.email,
                    password_hash,
                },
            )
            .await
    }
}
