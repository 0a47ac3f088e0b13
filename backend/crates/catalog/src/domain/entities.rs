//! Catalog Entities
//!
//! Conventional persistence-backed records. Identity is established
//! elsewhere; these entities only carry the owning user ids that the
//! handlers compare against the request principal.

use chrono::{DateTime, Utc};
use kernel::id::{CourseId, EnrollmentId, UserId};

/// Course entity
#[derive(Debug, Clone)]
pub struct Course {
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    /// Beginner, Intermediate, Advanced
    pub level: Option<String>,
    pub price_cents: Option<i64>,
    /// Owning instructor; only this user may mutate the course
    pub instructor_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        level: Option<String>,
        price_cents: Option<i64>,
        instructor_id: UserId,
    ) -> Self {
        let now = Utc::now();

        Self {
            course_id: CourseId::new(),
            title: title.into(),
            description: description.into(),
            level,
            price_cents,
            instructor_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.instructor_id == user_id
    }

    pub fn apply_update(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        level: Option<String>,
        price_cents: Option<i64>,
    ) {
        self.title = title.into();
        self.description = description.into();
        self.level = level;
        self.price_cents = price_cents;
        self.updated_at = Utc::now();
    }
}

/// Enrollment entity
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    pub student_id: UserId,
    /// Completion percentage, 0..=100
    pub progress: i32,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(course_id: CourseId, student_id: UserId) -> Self {
        Self {
            enrollment_id: EnrollmentId::new(),
            course_id,
            student_id,
            progress: 0,
            enrolled_at: Utc::now(),
        }
    }
}
