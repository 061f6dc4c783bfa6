pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{career, matching, resumes, users};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users API
        .route("/users/register", post(users::handlers::handle_register))
        .route("/users/signin", post(users::handlers::handle_signin))
        .route("/users/logout", post(users::handlers::handle_logout))
        .route("/users/profile", get(users::handlers::handle_profile))
        // Resumes API
        .route(
            "/resumes/upload",
            post(resumes::handlers::handle_upload_resume),
        )
        .route(
            "/resumes/upload-pdf",
            post(resumes::handlers::handle_upload_resume_pdf),
        )
        .route("/resumes", get(resumes::handlers::handle_list_resumes))
        .route(
            "/resumes/:resume_id",
            get(resumes::handlers::handle_get_resume)
                .put(resumes::handlers::handle_update_resume)
                .delete(resumes::handlers::handle_delete_resume),
        )
        .route(
            "/resumes/:resume_id/dashboard",
            get(resumes::handlers::handle_resume_dashboard),
        )
        // Matching API
        .route(
            "/matching/skill-gap",
            post(matching::handlers::handle_skill_gap),
        )
        .route(
            "/matching/match-job",
            post(matching::handlers::handle_match_job),
        )
        // Career API
        .route(
            "/career/roadmap",
            get(career::handlers::handle_career_roadmap),
        )
        .with_state(state)
}
