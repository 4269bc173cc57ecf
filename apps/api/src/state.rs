use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::MatchingEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// Used for CV and offer extraction. Explanations go through `engine`.
    pub llm: LlmClient,
    /// Embedder (Redis-cached) and explainer, built once in `main`.
    pub engine: Arc<MatchingEngine>,
    pub config: Config,
}
