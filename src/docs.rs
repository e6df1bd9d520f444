use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use coursebook_core::ErrorResponse;
use coursebook_models::{
    AuthResponse, ChangePasswordDto, Course, CourseId, CreateCourseDto, LoginRequest,
    RegisterRequest, Role, UpdateCourseDto, UpdateUserDto, User, UserId, UserSummary,
};

use crate::modules::health::controller::HealthResponse;
use crate::modules::users::controller::MessageResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_profile,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::change_password,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_my_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::toggle_course_active,
    ),
    components(
        schemas(
            UserId,
            CourseId,
            Role,
            User,
            UserSummary,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UpdateUserDto,
            ChangePasswordDto,
            Course,
            CreateCourseDto,
            UpdateCourseDto,
            MessageResponse,
            HealthResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and profile"),
        (name = "Users", description = "Account management"),
        (name = "Courses", description = "Course management for instructors and students"),
        (name = "Health", description = "Liveness and store connectivity")
    ),
    info(
        title = "Coursebook API",
        version = "0.1.0",
        description = "Course management REST API with instructor and student roles, built with Rust and Axum."
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/profile",
            "/api/users",
            "/api/users/{id}",
            "/api/users/change-password",
            "/api/courses",
            "/api/courses/my-courses",
            "/api/courses/{id}",
            "/api/courses/{id}/toggle-active",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
