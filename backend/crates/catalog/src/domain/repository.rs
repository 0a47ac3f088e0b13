//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{CourseId, UserId};

use crate::domain::entities::{Course, Enrollment};
use crate::error::CatalogResult;

/// Course repository trait
#[trait_variant::make(CourseRepository: Send)]
pub trait LocalCourseRepository {
    /// Persist a new course
    async fn create(&self, course: &Course) -> CatalogResult<()>;

    /// Find course by ID
    async fn find_by_id(&self, course_id: &CourseId) -> CatalogResult<Option<Course>>;

    /// List all courses, newest first
    async fn list(&self) -> CatalogResult<Vec<Course>>;

    /// Update a course
    async fn update(&self, course: &Course) -> CatalogResult<()>;

    /// Delete a course
    async fn delete(&self, course_id: &CourseId) -> CatalogResult<()>;
}

/// Enrollment repository trait
#[trait_variant::make(EnrollmentRepository: Send)]
pub trait LocalEnrollmentRepository {
    /// Persist a new enrollment
    async fn create(&self, enrollment: &Enrollment) -> CatalogResult<()>;

    /// Check whether a student is already enrolled
    async fn exists(&self, course_id: &CourseId, student_id: &UserId) -> CatalogResult<bool>;

    /// List a student's enrollments, newest first
    async fn find_by_student(&self, student_id: &UserId) -> CatalogResult<Vec<Enrollment>>;
}
