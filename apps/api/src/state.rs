use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::ml_client::MlService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis client backing the session-token store.
    pub redis: RedisClient,
    pub s3: S3Client,
    /// Gateway to the external ML/NLP services. Trait object so tests can
    /// swap in a stub without standing up the real services.
    pub ml: Arc<dyn MlService>,
    pub config: Config,
}
