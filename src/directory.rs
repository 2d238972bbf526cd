//! The user directory: account lifecycle on top of a [`UserRepository`].

use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::error::AppError;
use crate::models::user::User;
use crate::store::UserRepository;

#[derive(Clone)]
pub struct UserDirectory {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl UserDirectory {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    /// Registers a new account.
    ///
    /// The lookup before the insert is only a fast path: two concurrent registrations can
    /// both pass it, and the repository's own uniqueness check decides the winner. Either way
    /// the loser sees `AppError::Conflict`.
    pub async fn create(&self, email: &str, plain_password: &str) -> Result<User, AppError> {
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(email_taken_on_register());
        }

        let password_hash = self
            .hasher
            .hash_blocking(plain_password.to_string())
            .await?;

        let user = self
            .repo
            .insert(email, &password_hash)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => email_taken_on_register(),
                other => other,
            })?;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.repo.find_by_email(email).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        self.repo.find_by_id(id).await
    }

    /// Checks a login attempt: unknown email is `NotFound`, a wrong password `Unauthorized`.
    pub async fn authenticate(&self, email: &str, plain_password: &str) -> Result<User, AppError> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User does not exist".into()))?;

        let matches = self
            .hasher
            .verify_blocking(plain_password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            log::warn!("Failed login attempt for user {}", user.id);
            return Err(AppError::Unauthorized("Incorrect password".into()));
        }

        Ok(user)
    }

    /// Fails when any account already holds `new_email`, the caller's own included.
    pub async fn change_email(&self, user: &User, new_email: &str) -> Result<User, AppError> {
        if self.repo.find_by_email(new_email).await?.is_some() {
            return Err(email_taken_on_change());
        }

        self.repo
            .update_email(user.id, new_email)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => email_taken_on_change(),
                other => other,
            })
    }

    /// Re-verifies `old_password` against the stored hash before storing `new_password`.
    pub async fn change_password(
        &self,
        user: &User,
        old_password: &str,
        new_password: &str,
    ) -> Result<User, AppError> {
        let matches = self
            .hasher
            .verify_blocking(old_password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            return Err(AppError::BadRequest("Incorrect password".into()));
        }

        let password_hash = self.hasher.hash_blocking(new_password.to_string()).await?;
        let updated = self.repo.update_password_hash(user.id, &password_hash).await?;
        log::info!("Password changed for user {}", updated.id);
        Ok(updated)
    }
}

fn email_taken_on_register() -> AppError {
    AppError::Conflict("Account with this email already exists".into())
}

fn email_taken_on_change() -> AppError {
    AppError::BadRequest("Email already registered".into())
}
