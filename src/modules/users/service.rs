use anyhow::anyhow;
use tracing::{info, instrument};

use coursebook_core::{AppError, hash_password, verify_password};
use coursebook_db::Store;
use coursebook_models::{ChangePasswordDto, UpdateUserDto, User, UserId};

use crate::middleware::auth::AuthUser;
use crate::policy;

pub struct UserService;

impl UserService {
    #[instrument(skip(store))]
    pub async fn get_users(store: &dyn Store) -> Result<Vec<User>, AppError> {
        Ok(store.list_users().await?)
    }

    #[instrument(skip(store))]
    pub async fn get_user(store: &dyn Store, id: UserId) -> Result<User, AppError> {
        store
            .find_user_by_id(id)
            .await?
            .map(|stored| stored.user)
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(store))]
    pub async fn update_user(
        store: &dyn Store,
        auth_user: &AuthUser,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        policy::require_self(auth_user, id, "update")?;

        let changes = dto.into_changes().map_err(AppError::unprocessable)?;
        let existing = Self::get_user(store, id).await?;

        if changes.email != existing.email
            && store.find_user_by_email(&changes.email).await?.is_some()
        {
            return Err(AppError::conflict("Email already registered"));
        }

        store
            .update_user(id, changes)
            .await
            .map_err(|e| e.with_not_found("User not found"))
    }

    #[instrument(skip(store))]
    pub async fn delete_user(
        store: &dyn Store,
        auth_user: &AuthUser,
        id: UserId,
    ) -> Result<(), AppError> {
        policy::require_self(auth_user, id, "delete")?;

        store
            .delete_user(id)
            .await
            .map_err(|e| e.with_not_found("User not found"))?;

        info!(user_id = %id, "Account deleted");
        Ok(())
    }

    /// The stored verifier is replaced only after the current password
    /// verifies.
    #[instrument(skip(store, dto))]
    pub async fn change_password(
        store: &dyn Store,
        auth_user: &AuthUser,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let stored = store
            .find_user_by_id(auth_user.id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if !verify_password(&dto.old_password, &stored.password_hash)? {
            return Err(AppError::bad_request(anyhow!("Current password is incorrect")));
        }

        let password_hash = hash_password(&dto.new_password)?;
        store
            .update_password_hash(auth_user.id, &password_hash)
            .await?;

        info!(user_id = %auth_user.id, "Password changed");
        Ok(())
    }
}
