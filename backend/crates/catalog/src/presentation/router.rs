//! Catalog Router
//!
//! Route table, with the required role declared per route:
//! - `GET  /courses`, `GET /courses/{id}`: public
//! - `POST /courses`, `PUT/DELETE /courses/{id}`: TEACHER
//! - `POST /enrollments`, `GET /enrollments/mine`: STUDENT

use axum::handler::Handler;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use identity::domain::value_object::role_name::RoleName;
use identity::presentation::middleware::{RequiredRole, require_role};

use crate::domain::repository::{CourseRepository, EnrollmentRepository};
use crate::infra::postgres::PgCatalogRepository;
use crate::presentation::handlers::{self, CatalogAppState};

/// Create the catalog router with the PostgreSQL repository
pub fn catalog_router(repo: PgCatalogRepository) -> Router {
    catalog_router_generic(repo)
}

/// Create a generic catalog router for any repository implementation
pub fn catalog_router_generic<R>(repo: R) -> Router
where
    R: CourseRepository + EnrollmentRepository + Clone + Send + Sync + 'static,
{
    let state = CatalogAppState {
        repo: Arc::new(repo),
    };

    let teacher = RequiredRole(RoleName::Teacher);
    let student = RequiredRole(RoleName::Student);

    let enrollments = Router::new()
        .route("/enrollments", post(handlers::enroll::<R>))
        .route("/enrollments/mine", get(handlers::my_enrollments::<R>))
        .layer(from_fn_with_state(student, require_role));

    Router::new()
        .route(
            "/courses",
            get(handlers::list_courses::<R>).post(
                handlers::create_course::<R>.layer(from_fn_with_state(teacher, require_role)),
            ),
        )
        .route(
            "/courses/{id}",
            get(handlers::get_course::<R>)
                .put(
                    handlers::update_course::<R>
                        .layer(from_fn_with_state(teacher, require_role)),
                )
                .delete(
                    handlers::delete_course::<R>
                        .layer(from_fn_with_state(teacher, require_role)),
                ),
        )
        .merge(enrollments)
        .with_state(state)
}
