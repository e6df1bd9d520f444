//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the process-wide secret from
//! [`JwtConfig`]. They are stateless: a token stays valid until its `exp`
//! even if the account changes or is deleted.
//!
//! # Example
//!
//! ```ignore
//! use coursebook_auth::{create_session_token, verify_token};
//! use coursebook_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_session_token(user.id, &user.email, user.role, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use coursebook_config::JwtConfig;
use coursebook_core::AppError;
use coursebook_models::{Role, UserId};

use crate::claims::Claims;

const INVALID_TOKEN: &str = "Invalid or expired token";

/// Issues a token for the given identity, valid for the configured lifetime
/// starting now.
pub fn create_session_token(
    user_id: UserId,
    email: &str,
    role: Role,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    create_session_token_at(user_id, email, role, Utc::now(), jwt_config)
}

/// Issues a token as if it had been created at `issued_at`.
pub fn create_session_token_at(
    user_id: UserId,
    email: &str,
    role: Role,
    issued_at: DateTime<Utc>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let iat = issued_at.timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp: iat + jwt_config.token_ttl_secs,
        iat,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature, structure and expiry, returning the claims.
///
/// A token is accepted only while the current time is strictly before its
/// `exp`. Every failure yields the same unauthorized error.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(INVALID_TOKEN))?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(AppError::unauthorized(INVALID_TOKEN));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig::new("test_secret_key_for_testing_purposes")
    }

    #[test]
    fn test_token_round_trip() {
        let config = get_test_jwt_config();
        let token = create_session_token(UserId(7), "ins@example.com", Role::Instructor, &config)
            .unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "ins@example.com");
        assert_eq!(claims.role, Role::Instructor);
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = get_test_jwt_config();
        let issued_at = Utc::now() - Duration::hours(25);
        let token =
            create_session_token_at(UserId(7), "ins@example.com", Role::Instructor, issued_at, &config)
                .unwrap();

        let err = verify_token(&token, &config).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_token_just_inside_lifetime_accepted() {
        let config = get_test_jwt_config();
        let issued_at = Utc::now() - Duration::hours(23);
        let token =
            create_session_token_at(UserId(3), "s@example.com", Role::Student, issued_at, &config)
                .unwrap();

        assert!(verify_token(&token, &config).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_session_token(
            UserId(1),
            "a@example.com",
            Role::Student,
            &get_test_jwt_config(),
        )
        .unwrap();

        let other = JwtConfig::new("a_completely_different_secret");
        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.error.to_string(), "Invalid or expired token");
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = get_test_jwt_config();
        assert!(verify_token("invalid.token.here", &config).is_err());
        assert!(verify_token("", &config).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let config = get_test_jwt_config();
        let student_token =
            create_session_token(UserId(5), "s@example.com", Role::Student, &config).unwrap();
        let instructor_token =
            create_session_token(UserId(5), "s@example.com", Role::Instructor, &config).unwrap();

        // Splice the instructor payload onto the student signature.
        let parts: Vec<&str> = student_token.split('.').collect();
        let forged_payload = instructor_token.split('.').nth(1).unwrap();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(verify_token(&forged, &config).is_err());
    }
}
