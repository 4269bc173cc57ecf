use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::application::{ApplicationRow, ApplicationStatus};

pub struct NewApplication<'a> {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub offer_id: Uuid,
    pub cv_id: Uuid,
    pub score: f64,
    pub explanation: Option<&'a str>,
    pub match_details: &'a Value,
}

pub async fn insert_application(
    pool: &PgPool,
    app: NewApplication<'_>,
) -> Result<ApplicationRow, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications
            (id, candidate_id, offer_id, cv_id, status, score, explanation, match_details)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(app.id)
    .bind(app.candidate_id)
    .bind(app.offer_id)
    .bind(app.cv_id)
    .bind(ApplicationStatus::Pending.as_str())
    .bind(app.score)
    .bind(app.explanation)
    .bind(app.match_details)
    .fetch_one(pool)
    .await
}

pub async fn application_exists(
    pool: &PgPool,
    candidate_id: Uuid,
    offer_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM applications WHERE candidate_id = $1 AND offer_id = $2)",
    )
    .bind(candidate_id)
    .bind(offer_id)
    .fetch_one(pool)
    .await
}

pub async fn get_application(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE candidate_id = $1 ORDER BY created_at DESC",
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

/// Applications to an offer, best score first.
pub async fn list_for_offer(
    pool: &PgPool,
    offer_id: Uuid,
) -> Result<Vec<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT * FROM applications
        WHERE offer_id = $1
        ORDER BY score DESC NULLS LAST, created_at DESC
        "#,
    )
    .bind(offer_id)
    .fetch_all(pool)
    .await
}

pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<ApplicationRow, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_one(pool)
    .await
}
