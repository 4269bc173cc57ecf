use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::CvDocument;
use crate::scoring::profile::CandidateProfile;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CvRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub file_name: String,
    pub s3_key: String,
    #[serde(skip_serializing)]
    pub raw_text: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile: Json<CandidateProfile>,
    /// "generated" or "fallback".
    pub extraction_source: String,
    #[serde(skip_serializing)]
    pub embedding: Option<Vec<f32>>,
    #[serde(skip_serializing)]
    pub embedding_model: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CvRow {
    /// Matching input. A vector stored under another embedding model is ignored.
    pub fn to_document(&self, embedding_model: &str) -> CvDocument {
        CvDocument {
            profile: self.profile.0.clone(),
            embedding: stored_embedding(&self.embedding, &self.embedding_model, embedding_model),
        }
    }
}

pub(crate) fn stored_embedding(
    embedding: &Option<Vec<f32>>,
    stored_model: &Option<String>,
    current_model: &str,
) -> Option<Vec<f32>> {
    match (embedding, stored_model.as_deref()) {
        (Some(vector), Some(model)) if model == current_model && !vector.is_empty() => {
            Some(vector.clone())
        }
        _ => None,
    }
}
