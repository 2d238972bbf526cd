use actix_web::web;
use bcrypt::{hash, verify};

use crate::error::AppError;

/// bcrypt only reads this many bytes of input; anything after them would be ignored.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// One-way, salted password hashing with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Every call draws a fresh salt, so equal inputs produce different hashes.
    ///
    /// Passwords longer than [`MAX_PASSWORD_BYTES`] are refused rather than truncated.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::ValidationError(format!(
                "Password must be at most {} bytes long",
                MAX_PASSWORD_BYTES
            )));
        }
        hash(password, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// `Ok(false)` on mismatch; only a malformed stored hash is an error.
    ///
    /// An over-long candidate can never have been hashed, so it never matches.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        verify(password, hashed_password)
            .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
    }

    /// Runs [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = *self;
        web::block(move || hasher.hash(&password)).await?
    }

    /// Runs [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(
        &self,
        password: String,
        hashed_password: String,
    ) -> Result<bool, AppError> {
        let hasher = *self;
        web::block(move || hasher.verify(&password, &hashed_password)).await?
    }
}
