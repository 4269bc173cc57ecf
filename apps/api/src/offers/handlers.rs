use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{parse_offer, OfferDraft, ParsedOffer};
use crate::matching::text::OfferText;
use crate::models::offer::{OfferRow, OfferStatus};
use crate::offers::store::{
    delete_offer, get_offer, insert_offer, list_offers, update_offer, OfferFields, OfferFilter,
    StoredEmbedding,
};
use crate::scoring::profile::MAX_EDUCATION_LEVEL;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 50;

#[derive(Deserialize)]
pub struct CreateOfferRequest {
    pub recruiter_id: Uuid,
    #[serde(flatten)]
    pub draft: OfferDraft,
}

#[derive(Serialize)]
pub struct CreateOfferResponse {
    #[serde(flatten)]
    pub offer: OfferRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_warning: Option<String>,
}

#[derive(Deserialize)]
pub struct ListOffersQuery {
    /// Defaults to `open`.
    pub status: Option<OfferStatus>,
    pub location: Option<String>,
    pub recruiter_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct OfferListResponse {
    pub offers: Vec<OfferRow>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOfferRequest {
    pub recruiter_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub missions: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub status: Option<OfferStatus>,
    pub required_skills: Option<Vec<String>>,
    pub required_experience_years: Option<u32>,
    pub required_education_level: Option<u8>,
    pub required_languages: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct RecruiterQuery {
    pub recruiter_id: Uuid,
}

/// POST /api/v1/offers
pub async fn handle_create_offer(
    State(state): State<AppState>,
    Json(req): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<CreateOfferResponse>), AppError> {
    validate_draft(&req.draft)?;

    let parsed = parse_offer(&req.draft, &state.llm).await;
    let extraction_warning = parsed.reason().map(str::to_string);
    let extraction_source = if parsed.is_fallback() {
        "fallback"
    } else {
        "generated"
    };
    let fields = fields_from_parsed(parsed.into_value());

    let embedding = embed_fields(&state, &fields).await;
    let offer = insert_offer(
        &state.db,
        Uuid::new_v4(),
        req.recruiter_id,
        &fields,
        extraction_source,
        embedding.as_deref().map(|vector| StoredEmbedding {
            vector,
            model: state.engine.embedding_model(),
        }),
    )
    .await?;

    info!(
        "Offer {} '{}' created by recruiter {}",
        offer.id, offer.title, offer.recruiter_id
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateOfferResponse {
            offer,
            extraction_warning,
        }),
    ))
}

/// GET /api/v1/offers?status=&location=&recruiter_id=&page=&limit=
pub async fn handle_list_offers(
    State(state): State<AppState>,
    Query(params): Query<ListOffersQuery>,
) -> Result<Json<OfferListResponse>, AppError> {
    let (page, limit) = page_window(params.page, params.limit)?;
    let filter = OfferFilter {
        status: Some(params.status.unwrap_or(OfferStatus::Open)),
        location: params
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
        recruiter_id: params.recruiter_id,
    };

    let offset = i64::from(page - 1) * i64::from(limit);
    let (offers, total) = list_offers(&state.db, &filter, i64::from(limit), offset).await?;

    Ok(Json(OfferListResponse {
        offers,
        page,
        limit,
        total,
    }))
}

/// GET /api/v1/offers/:id
pub async fn handle_get_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OfferRow>, AppError> {
    Ok(Json(find_offer(&state, id).await?))
}

/// PATCH /api/v1/offers/:id
pub async fn handle_update_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOfferRequest>,
) -> Result<Json<OfferRow>, AppError> {
    let offer = find_offer(&state, id).await?;
    ensure_owner(&offer, req.recruiter_id)?;

    let mut fields = fields_from_row(&offer)?;
    let text_changed = req.apply(&mut fields);
    validate_fields(&fields)?;

    let embedding = if text_changed {
        embed_fields(&state, &fields).await
    } else {
        None
    };

    let updated = update_offer(
        &state.db,
        id,
        &fields,
        embedding.as_deref().map(|vector| StoredEmbedding {
            vector,
            model: state.engine.embedding_model(),
        }),
    )
    .await?;

    info!("Offer {id} updated (status {})", updated.status);
    Ok(Json(updated))
}

/// DELETE /api/v1/offers/:id?recruiter_id=
pub async fn handle_delete_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<RecruiterQuery>,
) -> Result<StatusCode, AppError> {
    let offer = find_offer(&state, id).await?;
    ensure_owner(&offer, params.recruiter_id)?;

    delete_offer(&state.db, id).await?;
    info!("Offer {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_offer(state: &AppState, id: Uuid) -> Result<OfferRow, AppError> {
    get_offer(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Offer {id} not found")))
}

pub(crate) fn ensure_owner(offer: &OfferRow, recruiter_id: Uuid) -> Result<(), AppError> {
    if offer.recruiter_id == recruiter_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "This offer belongs to another recruiter".to_string(),
        ))
    }
}

async fn embed_fields(state: &AppState, fields: &OfferFields) -> Option<Vec<f32>> {
    let text = OfferText {
        title: &fields.title,
        description: &fields.description,
        missions: fields.missions.as_deref(),
        required_skills: &fields.requirement.required_skills,
        required_languages: &fields.requirement.required_languages,
    };
    match state.engine.embed_offer(text).await {
        Ok(vector) => Some(vector),
        Err(e) => {
            warn!("Offer stored without embedding: {e}");
            None
        }
    }
}

impl UpdateOfferRequest {
    /// Applies the present fields. Returns true when the embedded text changed.
    fn apply(&self, fields: &mut OfferFields) -> bool {
        let mut text_changed = false;

        if let Some(title) = &self.title {
            text_changed |= replace(&mut fields.title, title.trim().to_string());
        }
        if let Some(description) = &self.description {
            text_changed |= replace(&mut fields.description, description.trim().to_string());
        }
        if let Some(missions) = &self.missions {
            text_changed |= replace(&mut fields.missions, Some(missions.trim().to_string()));
        }
        if let Some(skills) = &self.required_skills {
            text_changed |= replace(&mut fields.requirement.required_skills, skills.clone());
        }
        if let Some(languages) = &self.required_languages {
            text_changed |= replace(&mut fields.requirement.required_languages, languages.clone());
        }

        if let Some(location) = &self.location {
            fields.location = Some(location.trim().to_string());
        }
        if let Some(contract) = &self.contract_type {
            fields.contract_type = Some(contract.trim().to_string());
        }
        if self.salary_min.is_some() {
            fields.salary_min = self.salary_min;
        }
        if self.salary_max.is_some() {
            fields.salary_max = self.salary_max;
        }
        if let Some(years) = self.required_experience_years {
            fields.requirement.required_experience_years = years;
        }
        if let Some(level) = self.required_education_level {
            fields.requirement.required_education_level = level.min(MAX_EDUCATION_LEVEL);
        }
        if let Some(status) = self.status {
            fields.status = status;
        }

        text_changed
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn fields_from_parsed(parsed: ParsedOffer) -> OfferFields {
    OfferFields {
        title: parsed.title,
        description: parsed.description,
        missions: parsed.missions,
        location: parsed.location,
        contract_type: parsed.contract_type,
        salary_min: parsed.salary_min,
        salary_max: parsed.salary_max,
        requirement: parsed.requirement,
        status: OfferStatus::Open,
    }
}

fn fields_from_row(row: &OfferRow) -> Result<OfferFields, AppError> {
    let status = row
        .status
        .parse::<OfferStatus>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(OfferFields {
        title: row.title.clone(),
        description: row.description.clone(),
        missions: row.missions.clone(),
        location: row.location.clone(),
        contract_type: row.contract_type.clone(),
        salary_min: row.salary_min,
        salary_max: row.salary_max,
        requirement: row.requirement.0.clone(),
        status,
    })
}

fn validate_draft(draft: &OfferDraft) -> Result<(), AppError> {
    if draft.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if draft.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }
    validate_salary(draft.salary_min, draft.salary_max)
}

fn validate_fields(fields: &OfferFields) -> Result<(), AppError> {
    if fields.title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if fields.description.is_empty() {
        return Err(AppError::Validation("description cannot be empty".to_string()));
    }
    validate_salary(fields.salary_min, fields.salary_max)
}

fn validate_salary(min: Option<f64>, max: Option<f64>) -> Result<(), AppError> {
    for value in [min, max].into_iter().flatten() {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::Validation(
                "salaries must be non-negative numbers".to_string(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(AppError::Validation(
                "salary_min cannot exceed salary_max".to_string(),
            ));
        }
    }
    Ok(())
}

/// Resolves `page` (1-based) and `limit` (1..=50).
fn page_window(page: Option<u32>, limit: Option<u32>) -> Result<(u32, u32), AppError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if page == 0 {
        return Err(AppError::Validation("page starts at 1".to_string()));
    }
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok((page, limit))
}
