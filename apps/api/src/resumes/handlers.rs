//! Axum route handlers for the Resumes API.
//!
//! Ingest pipeline: raw text (or extracted PDF text) → NLP parse →
//! archive the source document to S3 → persist the structured row.

use aws_sdk_s3::primitives::ByteStream;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::errors::AppError;
use crate::models::resume::{
    Contact, Education, Experience, Project, ResumeRow, SkillGroup,
};
use crate::resumes::dashboard::{format_for_dashboard, DashboardSummary};
use crate::state::AppState;

use sqlx::types::Json as Jsonb;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadResumeRequest {
    pub file_content: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub message: String,
    pub resume: ResumeRow,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub contact: Option<Contact>,
    pub experience: Option<Vec<Experience>>,
    pub education: Option<Vec<Education>>,
    pub skills: Option<Vec<SkillGroup>>,
    pub projects: Option<Vec<Project>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /resumes/upload
///
/// Accepts raw resume text, runs it through the NLP parse service, and
/// stores the structured result.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<UploadResumeRequest>,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    if request.file_content.trim().is_empty() {
        return Err(AppError::Validation(
            "file_content is required".to_string(),
        ));
    }

    let resume = ingest_resume(&state, session.user.id, &request.file_content, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(ResumeResponse {
            message: "Resume uploaded and parsed successfully!".to_string(),
            resume,
        }),
    ))
}

/// POST /resumes/upload-pdf
///
/// Accepts a multipart PDF in the `file` field, extracts its text, then
/// runs the same ingest pipeline, archiving the original bytes.
pub async fn handle_upload_resume_pdf(
    State(state): State<AppState>,
    session: AuthSession,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    let mut file_bytes: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        if name.as_deref() == Some("file") {
            file_bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read file: {e}")))?,
            );
        }
    }

    let file_bytes = file_bytes
        .ok_or_else(|| AppError::Validation("a 'file' field is required".to_string()))?;
    if file_bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let text = pdf_extract::extract_text_from_mem(&file_bytes).map_err(|e| {
        AppError::UnprocessableEntity(format!("could not extract text from PDF: {e}"))
    })?;
    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "PDF contains no extractable text".to_string(),
        ));
    }

    let resume = ingest_resume(
        &state,
        session.user.id,
        &text,
        Some((file_bytes, "application/pdf", "pdf")),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResumeResponse {
            message: "Resume uploaded and parsed successfully!".to_string(),
            resume,
        }),
    ))
}

/// GET /resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    let resumes = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(session.user.id)
    .fetch_all(&state.db)
    .await?;

    if resumes.is_empty() {
        return Err(AppError::NotFound(
            "No resumes found for this user.".to_string(),
        ));
    }

    Ok(Json(resumes))
}

/// GET /resumes/:resume_id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    session: AuthSession,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = fetch_owned_resume(&state, session.user.id, resume_id).await?;
    Ok(Json(resume))
}

/// PUT /resumes/:resume_id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    session: AuthSession,
    Path(resume_id): Path<Uuid>,
    Json(request): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeResponse>, AppError> {
    let resume = sqlx::query_as::<_, ResumeRow>(
        r#"
        UPDATE resumes SET
            title = COALESCE($3, title),
            summary = COALESCE($4, summary),
            contact = COALESCE($5, contact),
            experience = COALESCE($6, experience),
            education = COALESCE($7, education),
            skills = COALESCE($8, skills),
            projects = COALESCE($9, projects),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(session.user.id)
    .bind(request.title)
    .bind(request.summary)
    .bind(request.contact.map(Jsonb))
    .bind(request.experience.map(Jsonb))
    .bind(request.education.map(Jsonb))
    .bind(request.skills.map(Jsonb))
    .bind(request.projects.map(Jsonb))
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Resume not found.".to_string()))?;

    Ok(Json(ResumeResponse {
        message: "Resume updated successfully.".to_string(),
        resume,
    }))
}

/// DELETE /resumes/:resume_id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    session: AuthSession,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted: Option<(Uuid,)> =
        sqlx::query_as("DELETE FROM resumes WHERE id = $1 AND user_id = $2 RETURNING id")
            .bind(resume_id)
            .bind(session.user.id)
            .fetch_optional(&state.db)
            .await?;

    if deleted.is_none() {
        return Err(AppError::NotFound("Resume not found.".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Resume deleted successfully.".to_string(),
    }))
}

/// GET /resumes/:resume_id/dashboard
pub async fn handle_resume_dashboard(
    State(state): State<AppState>,
    session: AuthSession,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<DashboardSummary>, AppError> {
    let resume = fetch_owned_resume(&state, session.user.id, resume_id).await?;
    Ok(Json(format_for_dashboard(
        &resume.skills.0,
        &resume.projects.0,
    )))
}

// ────────────────────────────────────────────────────────────────────────────
// Ingest pipeline
// ────────────────────────────────────────────────────────────────────────────

async fn ingest_resume(
    state: &AppState,
    user_id: Uuid,
    resume_text: &str,
    original_file: Option<(Bytes, &'static str, &'static str)>,
) -> Result<ResumeRow, AppError> {
    let parsed = state.ml.parse_resume(resume_text).await?;

    let resume_id = Uuid::new_v4();

    // Archive the source document before the row exists, so a failed upload
    // leaves nothing half-persisted.
    let (bytes, content_type, extension) = match original_file {
        Some(file) => file,
        None => (Bytes::from(resume_text.to_owned()), "text/plain", "txt"),
    };
    let s3_key = format!("resumes/{user_id}/{resume_id}.{extension}");
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(bytes.to_vec()))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("S3 upload failed: {e}")))?;

    info!(
        "Archived resume source to s3://{}/{}",
        state.config.s3_bucket, s3_key
    );

    let title = parsed
        .title
        .clone()
        .unwrap_or_else(|| "Untitled Resume".to_string());

    let resume = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, user_id, title, summary, contact, experience, education,
             skills, projects, s3_file_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(resume_id)
    .bind(user_id)
    .bind(&title)
    .bind(&parsed.summary)
    .bind(parsed.contact.as_ref().map(Jsonb))
    .bind(Jsonb(&parsed.experience))
    .bind(Jsonb(&parsed.education))
    .bind(Jsonb(&parsed.skills))
    .bind(Jsonb(&parsed.projects))
    .bind(&s3_key)
    .fetch_one(&state.db)
    .await?;

    info!("Stored resume {resume_id} for user {user_id}");

    Ok(resume)
}

async fn fetch_owned_resume(
    state: &AppState,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<ResumeRow, AppError> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found.".to_string()))
}
