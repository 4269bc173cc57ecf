use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::OfferDocument;
use crate::models::cv::stored_embedding;
use crate::scoring::profile::JobRequirement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Open,
    Closed,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Open => "open",
            OfferStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(OfferStatus::Open),
            "closed" => Ok(OfferStatus::Closed),
            other => Err(format!("unknown offer status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OfferRow {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub description: String,
    pub missions: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub requirement: Json<JobRequirement>,
    pub extraction_source: String,
    pub status: String,
    #[serde(skip_serializing)]
    pub embedding: Option<Vec<f32>>,
    #[serde(skip_serializing)]
    pub embedding_model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OfferRow {
    pub fn is_open(&self) -> bool {
        self.status == OfferStatus::Open.as_str()
    }

    pub fn to_document(&self, embedding_model: &str) -> OfferDocument {
        OfferDocument {
            title: self.title.clone(),
            description: self.description.clone(),
            missions: self.missions.clone(),
            requirement: self.requirement.0.clone(),
            embedding: stored_embedding(&self.embedding, &self.embedding_model, embedding_model),
        }
    }
}
