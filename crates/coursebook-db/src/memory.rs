use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use coursebook_models::{
    Course, CourseChanges, CourseId, NewCourse, NewUser, User, UserChanges, UserId, UserSummary,
    UserWithPassword,
};

use crate::error::StoreError;
use crate::store::Store;

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserWithPassword>,
    courses: BTreeMap<CourseId, Course>,
    last_user_id: i64,
    last_course_id: i64,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.user.email == email && Some(u.user.id) != except)
    }

    fn with_instructor(&self, course: &Course) -> Course {
        let mut course = course.clone();
        course.instructor = self
            .users
            .get(&course.instructor_id)
            .map(|u| UserSummary::from(&u.user));
        course
    }

    fn courses_where(&self, keep: impl Fn(&Course) -> bool) -> Vec<Course> {
        let mut courses: Vec<Course> = self
            .courses
            .values()
            .filter(|c| keep(c))
            .map(|c| self.with_instructor(c))
            .collect();
        courses.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        courses
    }
}

/// In-process store with the same semantics as the PostgreSQL one.
///
/// Every mutation runs under a single write lock, so the email uniqueness
/// check and the insert are atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write();
        if state.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        state.last_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: UserId(state.last_user_id),
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(
            created.id,
            UserWithPassword {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let state = self.state.read();
        Ok(state.users.values().find(|u| u.user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserWithPassword>, StoreError> {
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let state = self.state.read();
        let mut users: Vec<User> = state.users.values().map(|u| u.user.clone()).collect();
        users.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(users)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, StoreError> {
        let mut state = self.state.write();
        if !state.users.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if state.email_taken(&changes.email, Some(id)) {
            return Err(StoreError::DuplicateEmail);
        }

        let stored = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.user.name = changes.name;
        stored.user.email = changes.email;
        stored.user.role = changes.role;
        stored.user.updated_at = Utc::now();
        Ok(stored.user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut state = self.state.write();
        state.users.remove(&id).ok_or(StoreError::NotFound)?;
        state.courses.retain(|_, c| c.instructor_id != id);
        Ok(())
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let stored = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.password_hash = password_hash.to_string();
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn create_course(&self, course: NewCourse) -> Result<Course, StoreError> {
        let mut state = self.state.write();
        if !state.users.contains_key(&course.instructor_id) {
            return Err(StoreError::NotFound);
        }

        state.last_course_id += 1;
        let now = Utc::now();
        let created = Course {
            id: CourseId(state.last_course_id),
            name: course.name,
            description: course.description,
            duration_hours: course.duration_hours,
            instructor_id: course.instructor_id,
            active: course.active,
            created_at: now,
            updated_at: now,
            instructor: None,
        };
        state.courses.insert(created.id, created.clone());
        Ok(state.with_instructor(&created))
    }

    async fn find_course_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let state = self.state.read();
        Ok(state.courses.get(&id).map(|c| state.with_instructor(c)))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.state.read().courses_where(|_| true))
    }

    async fn list_courses_by_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<Course>, StoreError> {
        Ok(self
            .state
            .read()
            .courses_where(|c| c.instructor_id == instructor_id))
    }

    async fn list_active_courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.state.read().courses_where(|c| c.active))
    }

    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, StoreError> {
        let mut state = self.state.write();
        let course = state.courses.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = changes.name {
            course.name = name;
        }
        if let Some(description) = changes.description {
            course.description = description;
        }
        if let Some(duration_hours) = changes.duration_hours {
            course.duration_hours = duration_hours;
        }
        if let Some(active) = changes.active {
            course.active = active;
        }
        course.updated_at = Utc::now();

        let updated = course.clone();
        Ok(state.with_instructor(&updated))
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), StoreError> {
        self.state
            .write()
            .courses
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn verify_ownership(
        &self,
        course_id: CourseId,
        instructor_id: UserId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .state
            .read()
            .courses
            .get(&course_id)
            .is_some_and(|c| c.instructor_id == instructor_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursebook_models::Role;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$2b$12$placeholder".to_string(),
            role,
        }
    }

    fn new_course(instructor_id: UserId, name: &str) -> NewCourse {
        NewCourse {
            name: name.to_string(),
            description: "A course".to_string(),
            duration_hours: 10,
            instructor_id,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("dup@example.com", Role::Student))
            .await
            .unwrap();
        let err = store
            .create_user(new_user("dup@example.com", Role::Instructor))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("case@example.com", Role::Student))
            .await
            .unwrap();
        assert!(
            store
                .create_user(new_user("Case@example.com", Role::Student))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_lookups_report_absence_as_none() {
        let store = MemoryStore::new();
        assert!(store.find_user_by_id(UserId(99)).await.unwrap().is_none());
        assert!(store.find_course_by_id(CourseId(99)).await.unwrap().is_none());
        assert!(matches!(
            store.delete_course(CourseId(99)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_lists_are_newest_first_and_embed_owner() {
        let store = MemoryStore::new();
        let owner = store
            .create_user(new_user("owner@example.com", Role::Instructor))
            .await
            .unwrap();
        let first = store.create_course(new_course(owner.id, "First")).await.unwrap();
        let second = store.create_course(new_course(owner.id, "Second")).await.unwrap();

        let courses = store.list_courses().await.unwrap();
        assert_eq!(
            courses.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert_eq!(courses[0].instructor.as_ref().unwrap().email, "owner@example.com");
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_active_when_unset() {
        let store = MemoryStore::new();
        let owner = store
            .create_user(new_user("keep@example.com", Role::Instructor))
            .await
            .unwrap();
        let course = store.create_course(new_course(owner.id, "Before")).await.unwrap();

        let updated = store
            .update_course(
                course.id,
                CourseChanges {
                    name: Some("After".to_string()),
                    description: Some("Changed".to_string()),
                    duration_hours: Some(20),
                    active: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "After");
        assert_eq!(updated.instructor_id, owner.id);
        assert!(updated.active);

        let toggled = store
            .update_course(course.id, CourseChanges::set_active(false))
            .await
            .unwrap();
        assert!(!toggled.active);
        assert_eq!(toggled.name, "After");
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_courses() {
        let store = MemoryStore::new();
        let owner = store
            .create_user(new_user("cascade@example.com", Role::Instructor))
            .await
            .unwrap();
        let course = store.create_course(new_course(owner.id, "Gone")).await.unwrap();

        store.delete_user(owner.id).await.unwrap();

        assert!(store.find_course_by_id(course.id).await.unwrap().is_none());
        assert!(!store.verify_ownership(course.id, owner.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_ownership() {
        let store = MemoryStore::new();
        let owner = store
            .create_user(new_user("a@example.com", Role::Instructor))
            .await
            .unwrap();
        let other = store
            .create_user(new_user("b@example.com", Role::Instructor))
            .await
            .unwrap();
        let course = store.create_course(new_course(owner.id, "Mine")).await.unwrap();

        assert!(store.verify_ownership(course.id, owner.id).await.unwrap());
        assert!(!store.verify_ownership(course.id, other.id).await.unwrap());
        assert!(!store.verify_ownership(CourseId(404), owner.id).await.unwrap());
    }
}
