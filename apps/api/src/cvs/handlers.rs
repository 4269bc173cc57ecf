use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cvs::storage::{cv_object_key, delete_pdf, put_pdf};
use crate::cvs::store::{delete_cv, get_cv, insert_cv, list_cvs_for_candidate, NewCv};
use crate::errors::AppError;
use crate::extraction::{extract_pdf_text, looks_like_pdf, parse_cv};
use crate::models::cv::CvRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CandidateQuery {
    pub candidate_id: Uuid,
}

#[derive(Serialize)]
pub struct CvUploadResponse {
    #[serde(flatten)]
    pub cv: CvRow,
    /// Set when the LLM could not parse the resume and the profile is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_warning: Option<String>,
    pub embedded: bool,
}

/// Parts of the upload form once read.
struct UploadForm {
    candidate_id: Uuid,
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /api/v1/cvs/upload
/// Multipart fields: `candidate_id`, `file` (PDF).
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CvUploadResponse>), AppError> {
    let form = read_upload_form(multipart).await?;
    validate_pdf_upload(
        &form.file_name,
        form.content_type.as_deref(),
        &form.data,
        state.config.max_upload_bytes,
    )?;

    let raw_text = extract_pdf_text(form.data.clone()).await?;
    let parsed = parse_cv(&raw_text, &state.llm).await;
    let extraction_warning = parsed.reason().map(str::to_string);
    let extraction_source = if parsed.is_fallback() {
        "fallback"
    } else {
        "generated"
    };
    let parsed = parsed.into_value();

    let embedding = match state.engine.embed_cv(&parsed.profile).await {
        Ok(vector) => Some(vector),
        Err(e) => {
            warn!("CV stored without embedding: {e}");
            None
        }
    };

    let cv_id = Uuid::new_v4();
    let s3_key = cv_object_key(form.candidate_id, cv_id);
    put_pdf(&state.s3, &state.config.s3_bucket, &s3_key, form.data).await?;

    let inserted = insert_cv(
        &state.db,
        NewCv {
            id: cv_id,
            candidate_id: form.candidate_id,
            file_name: &form.file_name,
            s3_key: &s3_key,
            raw_text: &raw_text,
            name: parsed.name.as_deref(),
            email: parsed.email.as_deref(),
            phone: parsed.phone.as_deref(),
            profile: &parsed.profile,
            extraction_source,
            embedding: embedding.as_deref(),
            embedding_model: embedding.as_ref().map(|_| state.engine.embedding_model()),
        },
    )
    .await;

    let cv = match inserted {
        Ok(cv) => cv,
        Err(e) => {
            delete_pdf(&state.s3, &state.config.s3_bucket, &s3_key).await;
            return Err(e.into());
        }
    };

    info!(
        "CV {} uploaded for candidate {} ({} skills)",
        cv.id,
        cv.candidate_id,
        cv.profile.skills.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(CvUploadResponse {
            cv,
            extraction_warning,
            embedded: embedding.is_some(),
        }),
    ))
}

/// GET /api/v1/cvs?candidate_id=
pub async fn handle_list_cvs(
    State(state): State<AppState>,
    Query(params): Query<CandidateQuery>,
) -> Result<Json<Vec<CvRow>>, AppError> {
    Ok(Json(list_cvs_for_candidate(&state.db, params.candidate_id).await?))
}

/// GET /api/v1/cvs/:id
pub async fn handle_get_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CvRow>, AppError> {
    let cv = get_cv(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {id} not found")))?;
    Ok(Json(cv))
}

/// DELETE /api/v1/cvs/:id?candidate_id=
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<CandidateQuery>,
) -> Result<StatusCode, AppError> {
    let cv = get_cv(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {id} not found")))?;

    if cv.candidate_id != params.candidate_id {
        return Err(AppError::Forbidden(
            "This CV belongs to another candidate".to_string(),
        ));
    }

    delete_cv(&state.db, id).await?;
    delete_pdf(&state.s3, &state.config.s3_bucket, &cv.s3_key).await;

    info!("CV {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut candidate_id = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("candidate_id") => {
                let raw = field.text().await?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation("candidate_id must be a UUID".to_string()))?;
                candidate_id = Some(id);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("cv.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                file = Some((file_name, content_type, data));
            }
            _ => {}
        }
    }

    let candidate_id = candidate_id
        .ok_or_else(|| AppError::Validation("missing field 'candidate_id'".to_string()))?;
    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("missing field 'file'".to_string()))?;

    Ok(UploadForm {
        candidate_id,
        file_name,
        content_type,
        data,
    })
}

fn validate_pdf_upload(
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
    max_bytes: usize,
) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }
    if data.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "file is {} bytes, the limit is {max_bytes}",
            data.len()
        )));
    }

    let pdf_name = file_name.to_ascii_lowercase().ends_with(".pdf");
    let pdf_type = content_type.is_some_and(|t| t.eq_ignore_ascii_case("application/pdf"));
    if !(pdf_name || pdf_type) || !looks_like_pdf(data) {
        return Err(AppError::Validation(
            "only PDF files are accepted".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF: &[u8] = b"%PDF-1.4\n%fake";

    #[test]
    fn test_accepts_pdf_by_name_or_type() {
        assert!(validate_pdf_upload("resume.PDF", None, PDF, 1024).is_ok());
        assert!(validate_pdf_upload("upload", Some("application/pdf"), PDF, 1024).is_ok());
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = validate_pdf_upload("resume.docx", Some("application/msword"), PDF, 1024)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // right name, wrong content
        let err = validate_pdf_upload("resume.pdf", None, b"PK\x03\x04", 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(matches!(
            validate_pdf_upload("a.pdf", None, b"", 1024),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_pdf_upload("a.pdf", None, PDF, 4),
            Err(AppError::PayloadTooLarge(_))
        ));
    }
}
