use anyhow::anyhow;
use tracing::{info, instrument};

use coursebook_core::AppError;
use coursebook_db::Store;
use coursebook_models::{
    Course, CourseChanges, CourseId, CreateCourseDto, NewCourse, Role, UpdateCourseDto,
};

use crate::metrics;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, CourseScope};

pub struct CourseService;

impl CourseService {
    /// Creates an active course owned by the calling instructor.
    ///
    /// The referenced instructor is re-read from the store; the token alone
    /// is not enough if the account was deleted or its role changed.
    #[instrument(skip(store, dto), fields(instructor_id = %dto.instructor_id))]
    pub async fn create_course(
        store: &dyn Store,
        auth_user: &AuthUser,
        dto: CreateCourseDto,
    ) -> Result<Course, AppError> {
        policy::authorize_course_creation(auth_user, dto.instructor_id)?;

        let instructor = store
            .find_user_by_id(dto.instructor_id)
            .await?
            .map(|stored| stored.user);
        policy::require_instructor_account(instructor.as_ref())?;

        let course = store.create_course(NewCourse::from(dto)).await?;
        metrics::track_course_created();
        info!(course_id = %course.id, "Course created");

        Ok(course)
    }

    #[instrument(skip(store))]
    pub async fn get_courses(
        store: &dyn Store,
        auth_user: &AuthUser,
    ) -> Result<Vec<Course>, AppError> {
        let courses = match policy::course_scope(auth_user) {
            CourseScope::OwnedBy(instructor_id) => {
                store.list_courses_by_instructor(instructor_id).await?
            }
            CourseScope::ActiveOnly => store.list_active_courses().await?,
        };
        Ok(courses)
    }

    #[instrument(skip(store))]
    pub async fn get_my_courses(
        store: &dyn Store,
        auth_user: &AuthUser,
    ) -> Result<Vec<Course>, AppError> {
        policy::require_role(auth_user, Role::Instructor, "view their courses")?;
        Ok(store.list_courses_by_instructor(auth_user.id).await?)
    }

    #[instrument(skip(store))]
    pub async fn get_course(
        store: &dyn Store,
        auth_user: &AuthUser,
        id: CourseId,
    ) -> Result<Course, AppError> {
        let course = Self::find_course(store, id).await?;
        policy::authorize_course_view(auth_user, &course)?;
        Ok(course)
    }

    /// Replaces name, description and duration. Owner and active flag are
    /// kept as stored.
    #[instrument(skip(store, dto))]
    pub async fn update_course(
        store: &dyn Store,
        auth_user: &AuthUser,
        id: CourseId,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        policy::require_course_owner(store, auth_user, id, "update courses").await?;
        Self::apply(store, id, CourseChanges::from(dto)).await
    }

    #[instrument(skip(store))]
    pub async fn delete_course(
        store: &dyn Store,
        auth_user: &AuthUser,
        id: CourseId,
    ) -> Result<(), AppError> {
        policy::require_course_owner(store, auth_user, id, "delete courses").await?;

        store
            .delete_course(id)
            .await
            .map_err(|e| e.with_not_found("Course not found"))?;

        info!(course_id = %id, "Course deleted");
        Ok(())
    }

    #[instrument(skip(store))]
    pub async fn toggle_active(
        store: &dyn Store,
        auth_user: &AuthUser,
        id: CourseId,
    ) -> Result<Course, AppError> {
        policy::require_course_owner(store, auth_user, id, "update courses").await?;

        let current = Self::find_course(store, id).await?;
        let course = Self::apply(store, id, CourseChanges::set_active(!current.active)).await?;

        info!(course_id = %id, active = course.active, "Course visibility changed");
        Ok(course)
    }

    async fn find_course(store: &dyn Store, id: CourseId) -> Result<Course, AppError> {
        store
            .find_course_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))
    }

    async fn apply(
        store: &dyn Store,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, AppError> {
        store
            .update_course(id, changes)
            .await
            .map_err(|e| e.with_not_found("Course not found"))
    }
}
