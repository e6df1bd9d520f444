//! Access policy for accounts and courses.
//!
//! Every rule combines the verified [`AuthUser`] with resource state. The
//! pure checks take already loaded data; [`require_course_owner`] re-reads
//! ownership from the store so a client-supplied `instructor_id` is never
//! trusted.
//!
//! | Operation | Rule |
//! |-----------|------|
//! | update/delete account | caller is the account |
//! | create course | instructor, creating for themselves, referenced account is an instructor |
//! | update/delete/toggle course | instructor who currently owns the course |
//! | list courses | instructors see their own, students see active ones |
//! | view course | owner instructor, or any student while active |

use anyhow::anyhow;

use coursebook_core::AppError;
use coursebook_db::Store;
use coursebook_models::{Course, CourseId, Role, User, UserId};

use crate::middleware::auth::AuthUser;

/// Which courses a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseScope {
    OwnedBy(UserId),
    ActiveOnly,
}

pub fn require_role(user: &AuthUser, role: Role, action: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::forbidden(format!(
            "Access denied. Only {}s can {}",
            role, action
        )));
    }
    Ok(())
}

pub fn require_self(user: &AuthUser, target: UserId, action: &str) -> Result<(), AppError> {
    if user.id != target {
        return Err(AppError::forbidden(format!(
            "Access denied. You can only {} your own account",
            action
        )));
    }
    Ok(())
}

/// Role and self-attribution checks for course creation.
pub fn authorize_course_creation(
    user: &AuthUser,
    requested_instructor: UserId,
) -> Result<(), AppError> {
    require_role(user, Role::Instructor, "create courses")?;
    if requested_instructor != user.id {
        return Err(AppError::forbidden(
            "Access denied. You can only create courses for yourself",
        ));
    }
    Ok(())
}

/// The account referenced as a course owner must exist and be an instructor.
pub fn require_instructor_account(account: Option<&User>) -> Result<(), AppError> {
    match account {
        None => Err(AppError::not_found(anyhow!("Instructor not found"))),
        Some(user) if user.role != Role::Instructor => Err(AppError::forbidden(
            "The referenced account is not an instructor",
        )),
        Some(_) => Ok(()),
    }
}

pub fn course_scope(user: &AuthUser) -> CourseScope {
    match user.role {
        Role::Instructor => CourseScope::OwnedBy(user.id),
        Role::Student => CourseScope::ActiveOnly,
    }
}

pub fn authorize_course_view(user: &AuthUser, course: &Course) -> Result<(), AppError> {
    match user.role {
        Role::Instructor if course.instructor_id != user.id => Err(AppError::forbidden(
            "Access denied. You can only view your own courses",
        )),
        Role::Student if !course.active => Err(AppError::forbidden("Course not available")),
        Role::Instructor | Role::Student => Ok(()),
    }
}

/// Instructor role plus a fresh ownership read.
///
/// A missing course is reported as not found; an existing course owned by
/// someone else is forbidden.
pub async fn require_course_owner(
    store: &dyn Store,
    user: &AuthUser,
    course_id: CourseId,
    action: &str,
) -> Result<(), AppError> {
    require_role(user, Role::Instructor, action)?;

    if store.verify_ownership(course_id, user.id).await? {
        return Ok(());
    }

    match store.find_course_by_id(course_id).await? {
        None => Err(AppError::not_found(anyhow!("Course not found"))),
        Some(_) => Err(AppError::forbidden(
            "Access denied. You can only modify your own courses",
        )),
    }
}
