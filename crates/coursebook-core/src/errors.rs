//! Application error type with HTTP response conversion.
//!
//! Every fallible operation in the API returns [`AppError`], which pairs an
//! HTTP status with the underlying [`anyhow::Error`]. The status decides the
//! stable error category reported to clients:
//!
//! | Status | Category |
//! |--------|----------|
//! | 400, 422 | `validation_error` |
//! | 401 | `authentication_error` |
//! | 403 | `forbidden` |
//! | 404 | `not_found` |
//! | 409 | `conflict` |
//! | 5xx | `internal_error` |
//!
//! Server errors are logged with their full chain and rendered with a generic
//! message so storage or hashing details never reach the client.

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable description of the failure.
    pub error: String,
    /// Stable failure category (e.g. `forbidden`, `conflict`).
    pub code: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, anyhow!(message.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow!(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, anyhow!(message.into()))
    }

    /// Stable category string derived from the status code.
    pub fn code(&self) -> &'static str {
        match self.status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => "validation_error",
            StatusCode::UNAUTHORIZED => "authentication_error",
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::CONFLICT => "conflict",
            status if status.is_server_error() => "internal_error",
            _ => "error",
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        if self.status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = ?self.error, "Request failed");
        }

        let body = ErrorResponse {
            error: self.public_message(),
            code: self.code().to_string(),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::unprocessable(anyhow!("{}", format_validation_errors(&errors)))
    }
}

/// Flattens field errors into a single comma separated message.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 1))]
        hours: i32,
    }

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_codes_follow_status() {
        assert_eq!(AppError::forbidden("no").code(), "forbidden");
        assert_eq!(AppError::unauthorized("no").code(), "authentication_error");
        assert_eq!(AppError::conflict("dup").code(), "conflict");
        assert_eq!(AppError::not_found(anyhow!("gone")).code(), "not_found");
        assert_eq!(AppError::bad_request(anyhow!("bad")).code(), "validation_error");
        assert_eq!(AppError::unprocessable(anyhow!("bad")).code(), "validation_error");
        assert_eq!(AppError::internal_error("boom").code(), "internal_error");
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let (status, body) = body_json(AppError::forbidden("Access denied")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Access denied");
        assert_eq!(body["code"], "forbidden");
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let error = AppError::database(anyhow!("connection refused on 10.0.0.3:5432"));
        let (status, body) = body_json(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "internal_error");
    }

    #[test]
    fn test_validation_errors_convert_to_unprocessable() {
        let sample = Sample {
            name: String::new(),
            hours: 0,
        };
        let error: AppError = sample.validate().unwrap_err().into();
        assert_eq!(error.status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = error.error.to_string();
        assert!(message.contains("name is required"));
        assert!(message.contains("hours is invalid"));
    }
}
