//! Session token claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use coursebook_core::AppError;
use coursebook_models::{Role, UserId};

/// Claims embedded in every session token.
///
/// A token whose `role` is outside the closed [`Role`] set fails to decode,
/// so a verified token always yields a known role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Account id (subject claim)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration timestamp (Unix seconds)
    pub exp: i64,
    /// Issued-at timestamp (Unix seconds)
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))
    }
}
