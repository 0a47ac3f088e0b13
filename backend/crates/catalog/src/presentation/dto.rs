//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Course, Enrollment};

// ============================================================================
// Courses
// ============================================================================

/// Create/update course request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: String,
    pub description: String,
    pub level: Option<String>,
    pub price_cents: Option<i64>,
}

/// Course response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub level: Option<String>,
    pub price_cents: Option<i64>,
    pub instructor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.course_id.into_uuid(),
            title: course.title,
            description: course.description,
            level: course.level,
            price_cents: course.price_cents,
            instructor_id: course.instructor_id.into_uuid(),
            created_at: course.created_at,
        }
    }
}

// ============================================================================
// Enrollments
// ============================================================================

/// Enroll request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: Uuid,
}

/// Enrollment response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub progress: i32,
    pub enrolled_at: DateTime<Utc>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.enrollment_id.into_uuid(),
            course_id: enrollment.course_id.into_uuid(),
            progress: enrollment.progress,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}
