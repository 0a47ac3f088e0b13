//! HTTP Handlers
//!
//! Role gates are declared per-route in the router; ownership beyond role is
//! enforced here by re-fetching the resource and comparing its owner id with
//! the request principal before mutating.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use identity::Principal;
use kernel::id::CourseId;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Course, Enrollment};
use crate::domain::repository::{CourseRepository, EnrollmentRepository};
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::dto::{
    CourseRequest, CourseResponse, EnrollRequest, EnrollmentResponse,
};

/// Shared state for catalog handlers
#[derive(Clone)]
pub struct CatalogAppState<R>
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
}

// ============================================================================
// Courses (public reads)
// ============================================================================

/// GET /api/courses
pub async fn list_courses<R>(
    State(state): State<CatalogAppState<R>>,
) -> CatalogResult<Json<Vec<CourseResponse>>>
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let courses = state.repo.list().await?;

    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// GET /api/courses/{id}
pub async fn get_course<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<Uuid>,
) -> CatalogResult<Json<CourseResponse>>
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let course = state
        .repo
        .find_by_id(&CourseId::from_uuid(id))
        .await?
        .ok_or(CatalogError::CourseNotFound)?;

    Ok(Json(course.into()))
}

// ============================================================================
// Courses (instructor-gated writes)
// ============================================================================

/// POST /api/courses (TEACHER)
pub async fn create_course<R>(
    State(state): State<CatalogAppState<R>>,
    principal: Principal,
    Json(req): Json<CourseRequest>,
) -> CatalogResult<(StatusCode, Json<CourseResponse>)>
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    validate_course_request(&req)?;

    let course = Course::new(
        req.title,
        req.description,
        req.level,
        req.price_cents,
        principal.user_id,
    );

    CourseRepository::create(state.repo.as_ref(), &course).await?;

    tracing::info!(
        course_id = %course.course_id,
        instructor_id = %principal.user_id,
        "Course created"
    );

    Ok((StatusCode::CREATED, Json(course.into())))
}

/// PUT /api/courses/{id} (TEACHER, owner only)
pub async fn update_course<R>(
    State(state): State<CatalogAppState<R>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(req): Json<CourseRequest>,
) -> CatalogResult<Json<CourseResponse>>
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    validate_course_request(&req)?;

    let mut course = state
        .repo
        .find_by_id(&CourseId::from_uuid(id))
        .await?
        .ok_or(CatalogError::CourseNotFound)?;

    // Re-fetched owner, not client input, decides the ownership check
    if !course.is_owned_by(&principal.user_id) {
        return Err(CatalogError::NotCourseOwner);
    }

    course.apply_update(req.title, req.description, req.level, req.price_cents);
    state.repo.update(&course).await?;

    Ok(Json(course.into()))
}

/// DELETE /api/courses/{id} (TEACHER, owner only)
pub async fn delete_course<R>(
    State(state): State<CatalogAppState<R>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> CatalogResult<StatusCode>
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let course_id = CourseId::from_uuid(id);

    let course = state
        .repo
        .find_by_id(&course_id)
        .await?
        .ok_or(CatalogError::CourseNotFound)?;

    if !course.is_owned_by(&principal.user_id) {
        return Err(CatalogError::NotCourseOwner);
    }

    CourseRepository::delete(state.repo.as_ref(), &course_id).await?;

    tracing::info!(course_id = %course_id, "Course deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Enrollments (student-gated)
// ============================================================================

/// POST /api/enrollments (STUDENT)
pub async fn enroll<R>(
    State(state): State<CatalogAppState<R>>,
    principal: Principal,
    Json(req): Json<EnrollRequest>,
) -> CatalogResult<(StatusCode, Json<EnrollmentResponse>)>
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let course_id = CourseId::from_uuid(req.course_id);

    state
        .repo
        .find_by_id(&course_id)
        .await?
        .ok_or(CatalogError::CourseNotFound)?;

    if state.repo.exists(&course_id, &principal.user_id).await? {
        return Err(CatalogError::AlreadyEnrolled);
    }

    let enrollment = Enrollment::new(course_id, principal.user_id);
    EnrollmentRepository::create(state.repo.as_ref(), &enrollment).await?;

    tracing::info!(
        course_id = %course_id,
        student_id = %principal.user_id,
        "Student enrolled"
    );

    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

/// GET /api/enrollments/mine (STUDENT)
pub async fn my_enrollments<R>(
    State(state): State<CatalogAppState<R>>,
    principal: Principal,
) -> CatalogResult<Json<Vec<EnrollmentResponse>>>
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let enrollments = state.repo.find_by_student(&principal.user_id).await?;

    Ok(Json(
        enrollments.into_iter().map(EnrollmentResponse::from).collect(),
    ))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn validate_course_request(req: &CourseRequest) -> CatalogResult<()> {
    if req.title.trim().is_empty() {
        return Err(CatalogError::Validation("Title is required".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(CatalogError::Validation(
            "Description is required".to_string(),
        ));
    }
    if req.price_cents.is_some_and(|price| price < 0) {
        return Err(CatalogError::Validation(
            "Price cannot be negative".to_string(),
        ));
    }

    Ok(())
}
