use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::cv::CvRow;
use crate::scoring::profile::CandidateProfile;

pub struct NewCv<'a> {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub file_name: &'a str,
    pub s3_key: &'a str,
    pub raw_text: &'a str,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub profile: &'a CandidateProfile,
    pub extraction_source: &'a str,
    pub embedding: Option<&'a [f32]>,
    pub embedding_model: Option<&'a str>,
}

pub async fn insert_cv(pool: &PgPool, cv: NewCv<'_>) -> Result<CvRow, sqlx::Error> {
    sqlx::query_as::<_, CvRow>(
        r#"
        INSERT INTO cvs
            (id, candidate_id, file_name, s3_key, raw_text, name, email, phone,
             profile, extraction_source, embedding, embedding_model)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(cv.id)
    .bind(cv.candidate_id)
    .bind(cv.file_name)
    .bind(cv.s3_key)
    .bind(cv.raw_text)
    .bind(cv.name)
    .bind(cv.email)
    .bind(cv.phone)
    .bind(Json(cv.profile))
    .bind(cv.extraction_source)
    .bind(cv.embedding)
    .bind(cv.embedding_model)
    .fetch_one(pool)
    .await
}

pub async fn get_cv(pool: &PgPool, id: Uuid) -> Result<Option<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>("SELECT * FROM cvs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_cvs_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>(
        "SELECT * FROM cvs WHERE candidate_id = $1 ORDER BY created_at DESC",
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

/// Every stored CV, newest first. Feeds candidate ranking.
pub async fn list_all_cvs(pool: &PgPool) -> Result<Vec<CvRow>, sqlx::Error> {
    sqlx::query_as::<_, CvRow>("SELECT * FROM cvs ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn delete_cv(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    Ok(sqlx::query("DELETE FROM cvs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected())
}
