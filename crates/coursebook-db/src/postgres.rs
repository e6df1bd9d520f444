use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use coursebook_models::{
    Course, CourseChanges, CourseId, NewCourse, NewUser, Role, User, UserChanges, UserId,
    UserSummary, UserWithPassword,
};

use crate::error::StoreError;
use crate::store::Store;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

const COURSE_COLUMNS: &str = r#"c.id, c.name, c.description, c.duration_hours, c.instructor_id,
    c.active, c.created_at, c.updated_at,
    i.name AS instructor_name, i.email AS instructor_email, i.role AS instructor_role"#;

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user_with_password(self) -> Result<UserWithPassword, StoreError> {
        let role = parse_role(&self.role)?;
        Ok(UserWithPassword {
            user: User {
                id: UserId(self.id),
                name: self.name,
                email: self.email,
                role,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            password_hash: self.password_hash,
        })
    }

    fn into_user(self) -> Result<User, StoreError> {
        self.into_user_with_password().map(|u| u.user)
    }
}

#[derive(FromRow)]
struct CourseRow {
    id: i64,
    name: String,
    description: String,
    duration_hours: i32,
    instructor_id: i64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    instructor_name: Option<String>,
    instructor_email: Option<String>,
    instructor_role: Option<String>,
}

impl TryFrom<CourseRow> for Course {
    type Error = StoreError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let instructor = match (row.instructor_name, row.instructor_email, row.instructor_role) {
            (Some(name), Some(email), Some(role)) => Some(UserSummary {
                id: UserId(row.instructor_id),
                name,
                email,
                role: parse_role(&role)?,
            }),
            _ => None,
        };

        Ok(Course {
            id: CourseId(row.id),
            name: row.name,
            description: row.description,
            duration_hours: row.duration_hours,
            instructor_id: UserId(row.instructor_id),
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            instructor,
        })
    }
}

fn parse_role(raw: &str) -> Result<Role, StoreError> {
    raw.parse()
        .map_err(|e| StoreError::Corrupt(format!("users.role: {}", e)))
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::NotFound;
        }
    }
    StoreError::Database(err)
}

fn into_courses(rows: Vec<CourseRow>) -> Result<Vec<Course>, StoreError> {
    rows.into_iter().map(Course::try_from).collect()
}

/// PostgreSQL-backed store.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch_courses(
        &self,
        filter: &str,
        instructor_id: Option<UserId>,
    ) -> Result<Vec<Course>, StoreError> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses c LEFT JOIN users i ON i.id = c.instructor_id \
             {filter} ORDER BY c.created_at DESC, c.id DESC"
        );
        let mut query = sqlx::query_as::<_, CourseRow>(&sql);
        if let Some(instructor_id) = instructor_id {
            query = query.bind(instructor_id.0);
        }
        let rows = query.fetch_all(&self.pool).await?;
        into_courses(rows)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        row.into_user()
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(UserRow::into_user_with_password)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserWithPassword>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .map(UserRow::into_user_with_password)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    #[instrument(skip(self, changes))]
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, role = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.0)
            .bind(&changes.name)
            .bind(&changes.email)
            .bind(changes.role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(StoreError::NotFound)?
            .into_user()
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.0)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, course), fields(instructor_id = %course.instructor_id))]
    async fn create_course(&self, course: NewCourse) -> Result<Course, StoreError> {
        let sql = format!(
            "WITH c AS ( \
                INSERT INTO courses (name, description, duration_hours, instructor_id, active) \
                VALUES ($1, $2, $3, $4, $5) RETURNING * \
             ) SELECT {COURSE_COLUMNS} FROM c LEFT JOIN users i ON i.id = c.instructor_id"
        );
        let row = sqlx::query_as::<_, CourseRow>(&sql)
            .bind(&course.name)
            .bind(&course.description)
            .bind(course.duration_hours)
            .bind(course.instructor_id.0)
            .bind(course.active)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        Course::try_from(row)
    }

    #[instrument(skip(self))]
    async fn find_course_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses c LEFT JOIN users i ON i.id = c.instructor_id \
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, CourseRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .map(Course::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        self.fetch_courses("", None).await
    }

    #[instrument(skip(self))]
    async fn list_courses_by_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<Course>, StoreError> {
        self.fetch_courses("WHERE c.instructor_id = $1", Some(instructor_id))
            .await
    }

    #[instrument(skip(self))]
    async fn list_active_courses(&self) -> Result<Vec<Course>, StoreError> {
        self.fetch_courses("WHERE c.active = TRUE", None).await
    }

    #[instrument(skip(self, changes))]
    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, StoreError> {
        let sql = format!(
            "WITH c AS ( \
                UPDATE courses SET name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                duration_hours = COALESCE($4, duration_hours), \
                active = COALESCE($5, active), updated_at = NOW() \
                WHERE id = $1 RETURNING * \
             ) SELECT {COURSE_COLUMNS} FROM c LEFT JOIN users i ON i.id = c.instructor_id"
        );
        let row = sqlx::query_as::<_, CourseRow>(&sql)
            .bind(id.0)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(changes.duration_hours)
            .bind(changes.active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        Course::try_from(row)
    }

    #[instrument(skip(self))]
    async fn delete_course(&self, id: CourseId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn verify_ownership(
        &self,
        course_id: CourseId,
        instructor_id: UserId,
    ) -> Result<bool, StoreError> {
        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1 AND instructor_id = $2)",
        )
        .bind(course_id.0)
        .bind(instructor_id.0)
        .fetch_one(&self.pool)
        .await?;

        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_duplicate_email_rejected(pool: PgPool) {
        let store = PgStore::new(pool);
        store
            .create_user(new_user("dup@example.com", Role::Student))
            .await
            .unwrap();

        let err = store
            .create_user(new_user("dup@example.com", Role::Instructor))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        let other = store
            .create_user(new_user("other@example.com", Role::Student))
            .await
            .unwrap();
        let err = store
            .update_user(
                other.id,
                UserChanges {
                    name: other.name.clone(),
                    email: "dup@example.com".to_string(),
                    role: other.role,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_user_round_trip_keeps_verifier(pool: PgPool) {
        let store = PgStore::new(pool);
        let created = store
            .create_user(new_user("round@example.com", Role::Instructor))
            .await
            .unwrap();

        let found = store
            .find_user_by_email("round@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user, created);
        assert_eq!(found.password_hash, "$2b$12$placeholder");

        store
            .update_password_hash(created.id, "$2b$12$replaced")
            .await
            .unwrap();
        let found = store.find_user_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "$2b$12$replaced");

        assert!(
            store
                .find_user_by_email("Round@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_lookups_report_absence_as_none(pool: PgPool) {
        let store = PgStore::new(pool);
        assert!(store.find_user_by_id(UserId(99)).await.unwrap().is_none());
        assert!(store.find_course_by_id(CourseId(99)).await.unwrap().is_none());
        assert!(matches!(
            store.delete_course(CourseId(99)).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete_user(UserId(99)).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store
                .update_course(CourseId(99), CourseChanges::set_active(false))
                .await,
            Err(StoreError::NotFound)
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_course_for_missing_instructor_is_not_found(pool: PgPool) {
        let store = PgStore::new(pool);
        let err = store
            .create_course(new_course(UserId(404), "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_lists_are_newest_first_and_embed_owner(pool: PgPool) {
        let store = PgStore::new(pool);
        let owner = store
            .create_user(new_user("owner@example.com", Role::Instructor))
            .await
            .unwrap();
        let other = store
            .create_user(new_user("other@example.com", Role::Instructor))
            .await
            .unwrap();
        let first = store.create_course(new_course(owner.id, "First")).await.unwrap();
        let second = store.create_course(new_course(owner.id, "Second")).await.unwrap();
        let theirs = store.create_course(new_course(other.id, "Theirs")).await.unwrap();
        store
            .update_course(second.id, CourseChanges::set_active(false))
            .await
            .unwrap();

        let all = store.list_courses().await.unwrap();
        assert_eq!(
            all.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![theirs.id, second.id, first.id]
        );
        assert_eq!(all[1].instructor.as_ref().unwrap().email, "owner@example.com");

        let owned = store.list_courses_by_instructor(owner.id).await.unwrap();
        assert_eq!(
            owned.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );

        let active = store.list_active_courses().await.unwrap();
        assert_eq!(
            active.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![theirs.id, first.id]
        );

        let users = store.list_users().await.unwrap();
        assert_eq!(
            users.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![other.id, owner.id]
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_update_keeps_owner_and_active_when_unset(pool: PgPool) {
        let store = PgStore::new(pool);
        let owner = store
            .create_user(new_user("keep@example.com", Role::Instructor))
            .await
            .unwrap();
        let course = store.create_course(new_course(owner.id, "Before")).await.unwrap();
        store
            .update_course(course.id, CourseChanges::set_active(false))
            .await
            .unwrap();

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
        assert_eq!(updated.duration_hours, 20);
        assert_eq!(updated.instructor_id, owner.id);
        assert!(!updated.active);
        assert_eq!(updated.instructor.as_ref().unwrap().id, owner.id);

        let toggled = store
            .update_course(course.id, CourseChanges::set_active(true))
            .await
            .unwrap();
        assert!(toggled.active);
        assert_eq!(toggled.name, "After");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_delete_user_cascades_to_courses(pool: PgPool) {
        let store = PgStore::new(pool);
        let owner = store
            .create_user(new_user("cascade@example.com", Role::Instructor))
            .await
            .unwrap();
        let course = store.create_course(new_course(owner.id, "Gone")).await.unwrap();

        store.delete_user(owner.id).await.unwrap();

        assert!(store.find_course_by_id(course.id).await.unwrap().is_none());
        assert!(!store.verify_ownership(course.id, owner.id).await.unwrap());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_verify_ownership(pool: PgPool) {
        let store = PgStore::new(pool);
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
        store.ping().await.unwrap();
    }
}
