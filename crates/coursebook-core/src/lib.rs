//! # Coursebook Core
//!
//! Foundational types shared by every Coursebook crate:
//!
//! - [`errors`]: [`AppError`] and its HTTP rendering
//! - [`password`]: bcrypt credential hashing and verification

pub mod errors;
pub mod password;

pub use errors::{AppError, ErrorResponse};
pub use password::{MAX_PASSWORD_BYTES, hash_password, verify_dummy_password, verify_password};
