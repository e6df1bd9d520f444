//! Registration and login DTOs.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::{InvalidRole, NewUser, User, validate_password_bytes, validate_role};

#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Grace Hopper")]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    #[schema(example = "grace@example.com")]
    pub email: String,
    #[validate(
        length(min = 6, message = "password must be at least 6 characters"),
        custom(function = "validate_password_bytes")
    )]
    #[schema(example = "password123")]
    pub password: String,
    #[validate(custom(function = "validate_role"))]
    #[schema(example = "student")]
    pub role: String,
}

impl RegisterRequest {
    /// Builds the insert payload from an already computed verifier.
    pub fn into_new_user(self, password_hash: String) -> Result<NewUser, InvalidRole> {
        Ok(NewUser {
            role: self.role.parse()?,
            name: self.name,
            email: self.email,
            password_hash,
        })
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    #[schema(example = "grace@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Returned by both registration and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds.
    #[schema(example = 86400)]
    pub expires_in: i64,
    pub user: User,
}

impl AuthResponse {
    pub fn bearer(access_token: String, expires_in: i64, user: User) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::Role;

    fn request(role: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(request("student", "secret1").validate().is_ok());
        assert!(request("instructor", "short").validate().is_err());
        assert!(request("admin", "secret1").validate().is_err());
    }

    #[test]
    fn test_register_password_limited_to_72_bytes() {
        assert!(request("student", &"a".repeat(72)).validate().is_ok());
        assert!(request("student", &"a".repeat(80)).validate().is_err());
        // 24 three-byte characters: 72 bytes; one more tips it over
        assert!(request("student", &"€".repeat(24)).validate().is_ok());
        assert!(request("student", &"€".repeat(25)).validate().is_err());
    }

    #[test]
    fn test_into_new_user_keeps_verifier() {
        let new_user = request("instructor", "secret1")
            .into_new_user("$2b$12$hash".to_string())
            .unwrap();
        assert_eq!(new_user.role, Role::Instructor);
        assert_eq!(new_user.password_hash, "$2b$12$hash");
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", request("student", "topsecret"));
        assert!(!debug.contains("topsecret"));
    }
}
