//! Axum route handler for the Career Path API.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::auth::AuthSession;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RoadmapResponse {
    pub message: String,
    pub roadmap: Value,
}

/// GET /career/roadmap
///
/// Sends the caller's latest stored skills and experience to the
/// career-path service and returns the generated roadmap verbatim.
pub async fn handle_career_roadmap(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<RoadmapResponse>, AppError> {
    let resume = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(session.user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User resume not found.".to_string()))?;

    let skills = serde_json::to_value(&resume.skills).map_err(anyhow::Error::new)?;
    let experience = serde_json::to_value(&resume.experience).map_err(anyhow::Error::new)?;

    let roadmap = state.ml.career_roadmap(&skills, &experience).await?;

    Ok(Json(RoadmapResponse {
        message: "Roadmap has been generated successfully".to_string(),
        roadmap,
    }))
}
