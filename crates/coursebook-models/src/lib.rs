//! # Coursebook Models
//!
//! Domain entities and request/response DTOs shared by the store and the
//! HTTP layer.
//!
//! - [`ids`]: `UserId` and `CourseId` newtypes
//! - [`users`]: roles, accounts and account DTOs
//! - [`courses`]: courses and course DTOs
//! - [`auth`]: registration and login DTOs

pub mod auth;
pub mod courses;
pub mod ids;
pub mod users;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use courses::{Course, CourseChanges, CreateCourseDto, NewCourse, UpdateCourseDto};
pub use ids::{CourseId, UserId};
pub use users::{
    ChangePasswordDto, InvalidRole, NewUser, Role, UpdateUserDto, User, UserChanges, UserSummary,
    UserWithPassword,
};
