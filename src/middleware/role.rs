//! Role-gated extractors.
//!
//! Extractors run before the request body is read, so a caller with the
//! wrong role is rejected before any payload validation happens.

use axum::{extract::FromRequestParts, http::request::Parts};

use coursebook_core::AppError;
use coursebook_models::Role;

use crate::metrics::track_access_denied;
use crate::middleware::auth::AuthUser;
use crate::policy;
use crate::state::AppState;

/// An authenticated caller whose token carries the instructor role.
#[derive(Debug, Clone)]
pub struct RequireInstructor(pub AuthUser);

impl FromRequestParts<AppState> for RequireInstructor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        policy::require_role(&auth_user, Role::Instructor, "manage courses")
            .inspect_err(|_| track_access_denied("instructor_only"))?;
        Ok(RequireInstructor(auth_user))
    }
}
