use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use coursebook_auth::{Claims, verify_token};
use coursebook_core::AppError;
use coursebook_models::{Role, UserId};

use crate::state::AppState;

/// The verified caller of a request.
///
/// Produced only by successful token verification, so every field is known
/// to be well formed: handlers never inspect raw claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Pulls the bearer token out of an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Result<&str, AppError> {
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::unauthorized("Invalid authorization header format"));
    }
    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = bearer_token(auth_header)?;
        let claims = verify_token(token, &state.jwt_config)?;

        AuthUser::try_from(claims)
    }
}
