/// ML Gateway — the single point of entry for all external ML/NLP calls.
///
/// ARCHITECTURAL RULE: No other module may call the analysis services
/// directly. Resume parsing, job matching, and roadmap generation all go
/// through this module.
///
/// The services are opaque collaborators: they accept text and return
/// pre-structured JSON, which is passed back to callers verbatim (resume
/// parsing is the one place the response is deserialized, because the rows
/// we persist are typed).
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::resume::ParsedResume;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("service unavailable after {retries} retries")]
    Unavailable { retries: u32 },
}

/// Seam between handlers and the external analysis services.
///
/// Carried in `AppState` as `Arc<dyn MlService>` so tests can swap in a
/// stub without standing up the real services.
#[async_trait]
pub trait MlService: Send + Sync {
    /// Parses raw resume text into a structured document (NLP service).
    async fn parse_resume(&self, resume_text: &str) -> Result<ParsedResume, AppError>;

    /// Scores a resume against a job description (ML service). The response
    /// is returned verbatim.
    async fn match_job(&self, resume_text: &str, job_description: &str)
        -> Result<Value, AppError>;

    /// Generates a career roadmap from stored skills and experience
    /// (career-path service). The response is returned verbatim.
    async fn career_roadmap(&self, skills: &Value, experience: &Value)
        -> Result<Value, AppError>;
}

/// HTTP implementation backed by the three analysis microservices.
pub struct HttpMlService {
    client: Client,
    parse_url: String,
    match_url: String,
    roadmap_url: String,
}

impl HttpMlService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            parse_url: join_url(&config.nlp_service_url, "parse"),
            match_url: join_url(&config.ml_service_url, "resume/match-job"),
            roadmap_url: join_url(&config.career_path_url, "generate-roadmap"),
        }
    }

    /// POSTs a JSON payload, returning the response body as JSON.
    /// Retries on 429 and 5xx with exponential backoff.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, MlError> {
        let mut last_error: Option<MlError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "ML call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(url).json(body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(MlError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("ML service returned {}: {}", status, body);
                last_error = Some(MlError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(MlError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let value: Value = response.json().await?;
            debug!("ML call to {url} succeeded");
            return Ok(value);
        }

        Err(last_error.unwrap_or(MlError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl MlService for HttpMlService {
    async fn parse_resume(&self, resume_text: &str) -> Result<ParsedResume, AppError> {
        let payload = json!({ "resume_text": resume_text });
        self.post_json(&self.parse_url, &payload)
            .await
            .and_then(|value| serde_json::from_value(value).map_err(MlError::Parse))
            .map_err(|e| AppError::Ml(format!("Resume parsing failed: {e}")))
    }

    async fn match_job(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<Value, AppError> {
        let payload = json!({
            "resume_text": resume_text,
            "job_description": job_description,
        });
        self.post_json(&self.match_url, &payload)
            .await
            .map_err(|e| AppError::Ml(format!("Job matching failed: {e}")))
    }

    async fn career_roadmap(
        &self,
        skills: &Value,
        experience: &Value,
    ) -> Result<Value, AppError> {
        let payload = json!({
            "user_data": {
                "skills": skills,
                "experience": experience,
            }
        });
        self.post_json(&self.roadmap_url, &payload)
            .await
            .map_err(|e| AppError::Ml(format!("Career path generation failed: {e}")))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_handles_trailing_slash() {
        assert_eq!(
            join_url("http://localhost:5000/", "parse"),
            "http://localhost:5000/parse"
        );
        assert_eq!(
            join_url("http://localhost:8001", "resume/match-job"),
            "http://localhost:8001/resume/match-job"
        );
    }

    #[test]
    fn test_service_endpoints_from_config_defaults() {
        let config = Config {
            database_url: String::new(),
            redis_url: String::new(),
            s3_bucket: String::new(),
            s3_endpoint: String::new(),
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            ml_service_url: "http://localhost:8001".to_string(),
            nlp_service_url: "http://localhost:5000".to_string(),
            career_path_url: "http://localhost:8002".to_string(),
            port: 3000,
            rust_log: "info".to_string(),
        };
        let service = HttpMlService::new(&config);
        assert_eq!(service.parse_url, "http://localhost:5000/parse");
        assert_eq!(service.match_url, "http://localhost:8001/resume/match-job");
        assert_eq!(service.roadmap_url, "http://localhost:8002/generate-roadmap");
    }
}
