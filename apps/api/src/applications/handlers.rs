use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::applications::store::{
    application_exists, get_application, insert_application, list_for_candidate, list_for_offer,
    update_status, NewApplication,
};
use crate::cvs::store::get_cv;
use crate::errors::AppError;
use crate::matching::MatchOptions;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::offers::handlers::{ensure_owner, find_offer};
use crate::state::AppState;

const DUPLICATE_APPLICATION: &str = "An application for this offer already exists";

#[derive(Deserialize)]
pub struct CreateApplicationRequest {
    pub candidate_id: Uuid,
    pub offer_id: Uuid,
    pub cv_id: Uuid,
}

#[derive(Deserialize)]
pub struct ListApplicationsQuery {
    pub candidate_id: Option<Uuid>,
    pub offer_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub recruiter_id: Uuid,
    pub status: ApplicationStatus,
}

/// POST /api/v1/applications
/// Scores the CV against the offer and records the application as pending.
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let cv = get_cv(&state.db, req.cv_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {} not found", req.cv_id)))?;
    if cv.candidate_id != req.candidate_id {
        return Err(AppError::Forbidden(
            "This CV belongs to another candidate".to_string(),
        ));
    }

    let offer = find_offer(&state, req.offer_id).await?;
    if !offer.is_open() {
        return Err(AppError::Validation(
            "This offer is closed to applications".to_string(),
        ));
    }

    if application_exists(&state.db, req.candidate_id, req.offer_id).await? {
        return Err(AppError::Conflict(DUPLICATE_APPLICATION.to_string()));
    }

    let model = state.engine.embedding_model();
    let report = state
        .engine
        .run(
            &cv.to_document(model),
            &offer.to_document(model),
            MatchOptions {
                generate_explanations: true,
            },
        )
        .await;

    let explanation = report.explanations.as_ref().map(|e| e.one_line());
    let match_details = serde_json::to_value(&report).map_err(anyhow::Error::from)?;

    let application = insert_application(
        &state.db,
        NewApplication {
            id: Uuid::new_v4(),
            candidate_id: req.candidate_id,
            offer_id: req.offer_id,
            cv_id: req.cv_id,
            score: report.result.final_score,
            explanation: explanation.as_deref(),
            match_details: &match_details,
        },
    )
    .await
    // two concurrent submissions both pass the EXISTS check
    .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_APPLICATION))?;

    info!(
        "Application {} created: candidate {} → offer {} (score {})",
        application.id, application.candidate_id, application.offer_id, report.result.final_score
    );

    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications?candidate_id= | ?offer_id=
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let applications = match (params.candidate_id, params.offer_id) {
        (Some(candidate_id), None) => list_for_candidate(&state.db, candidate_id).await?,
        (None, Some(offer_id)) => list_for_offer(&state.db, offer_id).await?,
        _ => {
            return Err(AppError::Validation(
                "exactly one of candidate_id or offer_id is required".to_string(),
            ))
        }
    };
    Ok(Json(applications))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationRow>, AppError> {
    Ok(Json(find_application(&state, id).await?))
}

/// PATCH /api/v1/applications/:id/status
/// Only the recruiter who owns the offer may move an application.
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = find_application(&state, id).await?;
    let offer = find_offer(&state, application.offer_id).await?;
    ensure_owner(&offer, req.recruiter_id)?;

    let updated = update_status(&state.db, id, req.status).await?;
    info!("Application {id} moved to {}", req.status);
    Ok(Json(updated))
}

async fn find_application(state: &AppState, id: Uuid) -> Result<ApplicationRow, AppError> {
    get_application(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_request_rejects_unknown_status() {
        let ok: Result<UpdateStatusRequest, _> = serde_json::from_str(
            r#"{"recruiter_id": "00000000-0000-0000-0000-000000000001", "status": "accepted"}"#,
        );
        assert_eq!(ok.unwrap().status, ApplicationStatus::Accepted);

        let bad: Result<UpdateStatusRequest, _> = serde_json::from_str(
            r#"{"recruiter_id": "00000000-0000-0000-0000-000000000001", "status": "hired"}"#,
        );
        assert!(bad.is_err());
    }
}
