//! Argon2id password hashing and verification.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use harbinger_core::error::{AppError, ErrorKind};
use harbinger_core::result::AppResult;

/// Handles password hashing and verification using Argon2id.
///
/// Hashing is CPU-bound, so the async entry points run it on the blocking
/// pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Digest verified against when the login name is unknown, so that a
    /// miss costs the same as a wrong password.
    dummy_digest: Arc<str>,
}

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> AppResult<Self> {
        let dummy_digest = hash_blocking("harbinger-dummy-password")?;
        Ok(Self {
            dummy_digest: Arc::from(dummy_digest),
        })
    }

    /// Hashes a plaintext password with a random salt.
    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Password hashing task panicked", e)
            })?
    }

    /// Verifies a plaintext password against a stored digest.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub async fn verify(&self, password: &str, digest: &str) -> AppResult<bool> {
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &digest))
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Internal,
                    "Password verification task panicked",
                    e,
                )
            })?
    }

    /// Burns one verification against the dummy digest. Always `false`.
    pub async fn verify_dummy(&self, password: &str) -> AppResult<bool> {
        let digest = Arc::clone(&self.dummy_digest);
        self.verify(password, &digest).await.map(|_| false)
    }
}

fn hash_blocking(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_blocking(password: &str, digest: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::internal(format!(
            "Password verification failed: {e}"
        ))),
    }
}
