//! Axum route handlers for the Matching API.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use sqlx::types::Json as Jsonb;

use crate::auth::AuthSession;
use crate::errors::AppError;
use crate::matching::skill_gap::{compute_skill_gap, skill_list_from_json, GapReport};
use crate::models::resume::{flatten_skills, SkillGroup};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillGapRequest {
    /// Kept as raw JSON so a non-array payload maps to the engine's
    /// invalid-input error instead of a generic body rejection.
    pub target_skills: Value,
}

#[derive(Debug, Deserialize)]
pub struct MatchJobRequest {
    pub resume_text: String,
    pub job_description: String,
}

/// POST /matching/skill-gap
///
/// Compares the caller's stored skills (latest resume, flattened across
/// categories) against the supplied target list.
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<SkillGapRequest>,
) -> Result<Json<GapReport>, AppError> {
    let target_skills = skill_list_from_json(&request.target_skills, "target_skills")?;

    let stored: Option<(Jsonb<Vec<SkillGroup>>,)> = sqlx::query_as(
        "SELECT skills FROM resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(session.user.id)
    .fetch_optional(&state.db)
    .await?;

    let Some((Jsonb(skill_groups),)) = stored else {
        return Err(AppError::NotFound("User resume not found.".to_string()));
    };

    let candidate_skills = flatten_skills(&skill_groups);

    Ok(Json(compute_skill_gap(&candidate_skills, &target_skills)))
}

/// POST /matching/match-job
///
/// Forwards resume text and a job description to the ML match service and
/// returns its response verbatim.
pub async fn handle_match_job(
    State(state): State<AppState>,
    _session: AuthSession,
    Json(request): Json<MatchJobRequest>,
) -> Result<Json<Value>, AppError> {
    if request.resume_text.trim().is_empty() || request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text and job_description are required".to_string(),
        ));
    }

    let result = state
        .ml
        .match_job(&request.resume_text, &request.job_description)
        .await?;

    Ok(Json(result))
}
