use async_trait::async_trait;

use coursebook_models::{
    Course, CourseChanges, CourseId, NewCourse, NewUser, User, UserChanges, UserId,
    UserWithPassword,
};

use crate::error::StoreError;

/// Persistence collaborator for accounts and courses.
///
/// Lookups return `Ok(None)` when the row does not exist so callers can tell
/// absence apart from a storage failure. Updates and deletes of a missing row
/// return [`StoreError::NotFound`]. Every list is ordered newest first.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str)
    -> Result<Option<UserWithPassword>, StoreError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserWithPassword>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, StoreError>;

    /// Removes the account and every course it owns.
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;

    async fn update_password_hash(&self, id: UserId, password_hash: &str)
    -> Result<(), StoreError>;

    async fn create_course(&self, course: NewCourse) -> Result<Course, StoreError>;

    /// Course joined with its owner's summary.
    async fn find_course_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError>;

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;

    async fn list_courses_by_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<Course>, StoreError>;

    async fn list_active_courses(&self) -> Result<Vec<Course>, StoreError>;

    /// Never changes `instructor_id`.
    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, StoreError>;

    async fn delete_course(&self, id: CourseId) -> Result<(), StoreError>;

    /// True iff the course exists and is owned by `instructor_id`, read from
    /// current persisted state.
    async fn verify_ownership(
        &self,
        course_id: CourseId,
        instructor_id: UserId,
    ) -> Result<bool, StoreError>;
}
