use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{CourseId, UserId};
use crate::users::UserSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub description: String,
    pub duration_hours: i32,
    pub instructor_id: UserId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owner details, present on lookups that join the instructor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<UserSummary>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Systems Programming")]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    #[schema(example = "Memory, ownership and concurrency")]
    pub description: String,
    #[validate(range(min = 1, message = "duration_hours must be greater than 0"))]
    #[schema(example = 40)]
    pub duration_hours: i32,
    /// Must be the id of the calling instructor.
    pub instructor_id: UserId,
}

/// Replacement fields for an existing course.
///
/// `instructor_id` is accepted for compatibility but ignored: ownership is
/// fixed at creation.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(range(min = 1, message = "duration_hours must be greater than 0"))]
    pub duration_hours: i32,
    #[serde(default)]
    pub instructor_id: Option<UserId>,
}

/// Insert payload handed to the store.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub description: String,
    pub duration_hours: i32,
    pub instructor_id: UserId,
    pub active: bool,
}

impl From<CreateCourseDto> for NewCourse {
    fn from(dto: CreateCourseDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            duration_hours: dto.duration_hours,
            instructor_id: dto.instructor_id,
            active: true,
        }
    }
}

/// Partial course update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_hours: Option<i32>,
    pub active: Option<bool>,
}

impl From<UpdateCourseDto> for CourseChanges {
    fn from(dto: UpdateCourseDto) -> Self {
        Self {
            name: Some(dto.name),
            description: Some(dto.description),
            duration_hours: Some(dto.duration_hours),
            active: None,
        }
    }
}

impl CourseChanges {
    /// Changes only the active flag.
    pub fn set_active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }
}
