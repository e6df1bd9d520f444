//! Credential codec: one-way password verifiers.
//!
//! Verifiers are bcrypt strings produced with [`bcrypt::DEFAULT_COST`]. Each
//! call to [`hash_password`] draws a fresh salt, so hashing the same password
//! twice yields different verifiers that both verify.
//!
//! bcrypt only reads the first [`MAX_PASSWORD_BYTES`] bytes of its input, so
//! longer passwords are refused instead of being silently truncated.

use std::sync::LazyLock;

use anyhow::anyhow;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub const MAX_PASSWORD_BYTES: usize = 72;

static DUMMY_VERIFIER: LazyLock<Option<String>> =
    LazyLock::new(|| hash("coursebook-unknown-account", DEFAULT_COST).ok());

pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::unprocessable(anyhow!(
            "password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` for a non-matching password. Errors only when the
/// stored verifier itself is malformed.
pub fn verify_password(password: &str, verifier: &str) -> Result<bool, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }

    verify(password, verifier)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

/// Runs a full-cost verification against a fixed verifier and discards the
/// result. Used when no account matched, so both login failures cost the same.
pub fn verify_dummy_password(password: &str) {
    if let Some(verifier) = DUMMY_VERIFIER.as_deref() {
        let _ = verify(password, verifier);
    }
}
