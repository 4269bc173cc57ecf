use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::offer::{OfferRow, OfferStatus};
use crate::scoring::profile::JobRequirement;

/// Editable content of an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferFields {
    pub title: String,
    pub description: String,
    pub missions: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub requirement: JobRequirement,
    pub status: OfferStatus,
}

/// Embedding of an offer together with the model that produced it.
pub struct StoredEmbedding<'a> {
    pub vector: &'a [f32],
    pub model: &'a str,
}

#[derive(Debug, Default)]
pub struct OfferFilter {
    pub status: Option<OfferStatus>,
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    pub recruiter_id: Option<Uuid>,
}

pub async fn insert_offer(
    pool: &PgPool,
    id: Uuid,
    recruiter_id: Uuid,
    fields: &OfferFields,
    extraction_source: &str,
    embedding: Option<StoredEmbedding<'_>>,
) -> Result<OfferRow, sqlx::Error> {
    sqlx::query_as::<_, OfferRow>(
        r#"
        INSERT INTO job_offers
            (id, recruiter_id, title, description, missions, location, contract_type,
             salary_min, salary_max, requirement, extraction_source, status,
             embedding, embedding_model)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(recruiter_id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.missions)
    .bind(&fields.location)
    .bind(&fields.contract_type)
    .bind(fields.salary_min)
    .bind(fields.salary_max)
    .bind(Json(&fields.requirement))
    .bind(extraction_source)
    .bind(fields.status.as_str())
    .bind(embedding.as_ref().map(|e| e.vector))
    .bind(embedding.as_ref().map(|e| e.model))
    .fetch_one(pool)
    .await
}

/// Writes every editable field. The stored embedding is replaced only when
/// `embedding` is given.
pub async fn update_offer(
    pool: &PgPool,
    id: Uuid,
    fields: &OfferFields,
    embedding: Option<StoredEmbedding<'_>>,
) -> Result<OfferRow, sqlx::Error> {
    sqlx::query_as::<_, OfferRow>(
        r#"
        UPDATE job_offers SET
            title = $2,
            description = $3,
            missions = $4,
            location = $5,
            contract_type = $6,
            salary_min = $7,
            salary_max = $8,
            requirement = $9,
            status = $10,
            embedding = CASE WHEN $11 THEN $12 ELSE embedding END,
            embedding_model = CASE WHEN $11 THEN $13 ELSE embedding_model END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.missions)
    .bind(&fields.location)
    .bind(&fields.contract_type)
    .bind(fields.salary_min)
    .bind(fields.salary_max)
    .bind(Json(&fields.requirement))
    .bind(fields.status.as_str())
    .bind(embedding.is_some())
    .bind(embedding.as_ref().map(|e| e.vector))
    .bind(embedding.as_ref().map(|e| e.model))
    .fetch_one(pool)
    .await
}

pub async fn get_offer(pool: &PgPool, id: Uuid) -> Result<Option<OfferRow>, sqlx::Error> {
    sqlx::query_as::<_, OfferRow>("SELECT * FROM job_offers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// One page of offers matching `filter`, newest first, plus the total count.
pub async fn list_offers(
    pool: &PgPool,
    filter: &OfferFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<OfferRow>, i64), sqlx::Error> {
    let status = filter.status.map(|s| s.as_str());
    let location = filter
        .location
        .as_deref()
        .map(|l| format!("%{}%", escape_like(l)));

    let offers = sqlx::query_as::<_, OfferRow>(
        r#"
        SELECT * FROM job_offers
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::text IS NULL OR location ILIKE $2)
          AND ($3::uuid IS NULL OR recruiter_id = $3)
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(status)
    .bind(&location)
    .bind(filter.recruiter_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM job_offers
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::text IS NULL OR location ILIKE $2)
          AND ($3::uuid IS NULL OR recruiter_id = $3)
        "#,
    )
    .bind(status)
    .bind(&location)
    .bind(filter.recruiter_id)
    .fetch_one(pool)
    .await?;

    Ok((offers, total))
}

/// Every open offer. Feeds offer ranking.
pub async fn list_open_offers(pool: &PgPool) -> Result<Vec<OfferRow>, sqlx::Error> {
    sqlx::query_as::<_, OfferRow>(
        "SELECT * FROM job_offers WHERE status = $1 ORDER BY created_at DESC",
    )
    .bind(OfferStatus::Open.as_str())
    .fetch_all(pool)
    .await
}

pub async fn delete_offer(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    Ok(sqlx::query("DELETE FROM job_offers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected())
}

/// Escapes LIKE wildcards so user input only matches literally.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Paris"), "Paris");
        assert_eq!(escape_like("100%_remote"), "100\\%\\_remote");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
