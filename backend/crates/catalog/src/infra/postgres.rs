//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{CourseId, EnrollmentId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Course, Enrollment};
use crate::domain::repository::{CourseRepository, EnrollmentRepository};
use crate::error::CatalogResult;

/// PostgreSQL-backed catalog repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Course Repository Implementation
// ============================================================================

impl CourseRepository for PgCatalogRepository {
    async fn create(&self, course: &Course) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO courses (
                course_id,
                title,
                description,
                level,
                price_cents,
                instructor_id,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(course.course_id.as_uuid())
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.level)
        .bind(course.price_cents)
        .bind(course.instructor_id.as_uuid())
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, course_id: &CourseId) -> CatalogResult<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT
                course_id,
                title,
                description,
                level,
                price_cents,
                instructor_id,
                created_at,
                updated_at
            FROM courses
            WHERE course_id = $1
            "#,
        )
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_course()))
    }

    async fn list(&self) -> CatalogResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT
                course_id,
                title,
                description,
                level,
                price_cents,
                instructor_id,
                created_at,
                updated_at
            FROM courses
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_course()).collect())
    }

    async fn update(&self, course: &Course) -> CatalogResult<()> {
        sqlx::query(
            r#"
            UPDATE courses SET
                title = $2,
                description = $3,
                level = $4,
                price_cents = $5,
                updated_at = $6
            WHERE course_id = $1
            "#,
        )
        .bind(course.course_id.as_uuid())
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.level)
        .bind(course.price_cents)
        .bind(course.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, course_id: &CourseId) -> CatalogResult<()> {
        sqlx::query("DELETE FROM courses WHERE course_id = $1")
            .bind(course_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Enrollment Repository Implementation
// ============================================================================

impl EnrollmentRepository for PgCatalogRepository {
    async fn create(&self, enrollment: &Enrollment) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (
                enrollment_id,
                course_id,
                student_id,
                progress,
                enrolled_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(enrollment.enrollment_id.as_uuid())
        .bind(enrollment.course_id.as_uuid())
        .bind(enrollment.student_id.as_uuid())
        .bind(enrollment.progress)
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists(&self, course_id: &CourseId, student_id: &UserId) -> CatalogResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE course_id = $1 AND student_id = $2)",
        )
        .bind(course_id.as_uuid())
        .bind(student_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_student(&self, student_id: &UserId) -> CatalogResult<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT
                enrollment_id,
                course_id,
                student_id,
                progress,
                enrolled_at
            FROM enrollments
            WHERE student_id = $1
            ORDER BY enrolled_at DESC
            "#,
        )
        .bind(student_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_enrollment()).collect())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct CourseRow {
    course_id: Uuid,
    title: String,
    description: String,
    level: Option<String>,
    price_cents: Option<i64>,
    instructor_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CourseRow {
    fn into_course(self) -> Course {
        Course {
            course_id: CourseId::from_uuid(self.course_id),
            title: self.title,
            description: self.description,
            level: self.level,
            price_cents: self.price_cents,
            instructor_id: UserId::from_uuid(self.instructor_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    enrollment_id: Uuid,
    course_id: Uuid,
    student_id: Uuid,
    progress: i32,
    enrolled_at: DateTime<Utc>,
}

impl EnrollmentRow {
    fn into_enrollment(self) -> Enrollment {
        Enrollment {
            enrollment_id: EnrollmentId::from_uuid(self.enrollment_id),
            course_id: CourseId::from_uuid(self.course_id),
            student_id: UserId::from_uuid(self.student_id),
            progress: self.progress,
            enrolled_at: self.enrolled_at,
        }
    }
}
