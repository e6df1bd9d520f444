//! # Coursebook Auth
//!
//! Session token claims and HS256 JWT issuance/verification.
//!
//! - [`claims`]: [`Claims`] carried by every session token
//! - [`jwt`]: [`create_session_token`] and [`verify_token`]

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_session_token, create_session_token_at, verify_token};
