pub mod health;

#[cfg(test)]
mod tests;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::handlers::{applications, companies, interviews, jobs, profiles, uploads};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Identity
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/token/refresh", post(auth::refresh))
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/auth/users/:id", delete(auth::delete_user))
        .route(
            "/api/auth/profiles",
            get(profiles::list_profiles).post(profiles::create_profile),
        )
        .route(
            "/api/auth/profiles/:id",
            get(profiles::get_profile)
                .put(profiles::update_profile)
                .patch(profiles::patch_profile)
                .delete(profiles::delete_profile),
        )
        // Job board
        .route(
            "/api/jobs/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/api/jobs/companies/:id",
            get(companies::get_company)
                .put(companies::update_company)
                .patch(companies::patch_company)
                .delete(companies::delete_company),
        )
        .route(
            "/api/jobs/jobs",
            get(jobs::list_jobs).post(jobs::create_job),
        )
        .route(
            "/api/jobs/jobs/:id",
            get(jobs::get_job)
                .put(jobs::update_job)
                .patch(jobs::patch_job)
                .delete(jobs::delete_job),
        )
        .route(
            "/api/jobs/jobs/:id/applications",
            get(jobs::job_applications),
        )
        .route(
            "/api/jobs/applications",
            get(applications::list_applications).post(applications::create_application),
        )
        .route(
            "/api/jobs/applications/:id",
            get(applications::get_application)
                .put(applications::update_application)
                .patch(applications::patch_application)
                .delete(applications::delete_application),
        )
        .route(
            "/api/jobs/interviews",
            get(interviews::list_interviews).post(interviews::create_interview),
        )
        .route(
            "/api/jobs/interviews/:id",
            get(interviews::get_interview)
                .put(interviews::update_interview)
                .patch(interviews::patch_interview)
                .delete(interviews::delete_interview),
        )
        // Blob uploads
        .route(
            "/api/uploads/:bucket",
            post(uploads::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
