use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cvs::store::{get_cv, list_all_cvs};
use crate::errors::AppError;
use crate::matching::engine::{
    top_k_or, RankedMatch, DEFAULT_TOP_K_CANDIDATES, DEFAULT_TOP_K_OFFERS, MAX_TOP_K,
};
use crate::matching::{CvDocument, MatchOptions, MatchingReport, OfferDocument};
use crate::models::cv::CvRow;
use crate::offers::handlers::find_offer;
use crate::offers::store::list_open_offers;
use crate::scoring::profile::{CandidateProfile, JobRequirement};
use crate::state::AppState;

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct ScoreRequest {
    pub cv_id: Uuid,
    pub offer_id: Uuid,
    #[serde(default = "default_true")]
    pub generate_explanations: bool,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub cv_id: Uuid,
    pub offer_id: Uuid,
    #[serde(flatten)]
    pub report: MatchingReport,
}

#[derive(Deserialize)]
pub struct SearchOffersRequest {
    pub cv_id: Uuid,
    pub top_k: Option<usize>,
    #[serde(default = "default_true")]
    pub generate_explanations: bool,
}

#[derive(Deserialize)]
pub struct SearchCandidatesQuery {
    pub top_k: Option<usize>,
    #[serde(default = "default_true")]
    pub generate_explanations: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferRef {
    pub offer_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateRef {
    pub cv_id: Uuid,
    pub candidate_id: Uuid,
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct OfferSearchResponse {
    pub cv_id: Uuid,
    pub total_results: usize,
    pub matches: Vec<RankedMatch<OfferRef>>,
}

#[derive(Serialize)]
pub struct CandidateSearchResponse {
    pub offer_id: Uuid,
    pub total_results: usize,
    pub matches: Vec<RankedMatch<CandidateRef>>,
}

/// Ad-hoc offer for `/matching/test`.
#[derive(Deserialize)]
pub struct TestOffer {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub missions: Option<String>,
    #[serde(flatten)]
    pub requirement: JobRequirement,
}

#[derive(Deserialize)]
pub struct TestMatchRequest {
    #[serde(default)]
    pub cv: CandidateProfile,
    #[serde(default)]
    pub offer: Option<TestOffer>,
    #[serde(default)]
    pub generate_explanations: bool,
}

/// POST /api/v1/matching/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let cv = find_cv(&state, req.cv_id).await?;
    let offer = find_offer(&state, req.offer_id).await?;
    let model = state.engine.embedding_model();

    let report = state
        .engine
        .run(
            &cv.to_document(model),
            &offer.to_document(model),
            MatchOptions {
                generate_explanations: req.generate_explanations,
            },
        )
        .await;

    Ok(Json(ScoreResponse {
        cv_id: cv.id,
        offer_id: offer.id,
        report,
    }))
}

/// POST /api/v1/matching/search-offers
/// Ranks every open offer for one CV.
pub async fn handle_search_offers(
    State(state): State<AppState>,
    Json(req): Json<SearchOffersRequest>,
) -> Result<Json<OfferSearchResponse>, AppError> {
    let top_k = resolve_top_k(req.top_k, DEFAULT_TOP_K_OFFERS)?;
    let cv = find_cv(&state, req.cv_id).await?;
    let model = state.engine.embedding_model();

    let offers: Vec<(OfferRef, OfferDocument)> = list_open_offers(&state.db)
        .await?
        .into_iter()
        .map(|row| {
            let doc = row.to_document(model);
            (
                OfferRef {
                    offer_id: row.id,
                    title: row.title,
                },
                doc,
            )
        })
        .collect();

    let ranking = state
        .engine
        .rank_offers_for_cv(
            &cv.to_document(model),
            &offers,
            top_k,
            MatchOptions {
                generate_explanations: req.generate_explanations,
            },
        )
        .await;

    Ok(Json(OfferSearchResponse {
        cv_id: cv.id,
        total_results: ranking.total_results,
        matches: ranking.matches,
    }))
}

/// POST /api/v1/matching/search-candidates/:offer_id?top_k=&generate_explanations=
/// Ranks every stored CV for one offer.
pub async fn handle_search_candidates(
    State(state): State<AppState>,
    Path(offer_id): Path<Uuid>,
    Query(params): Query<SearchCandidatesQuery>,
) -> Result<Json<CandidateSearchResponse>, AppError> {
    let top_k = resolve_top_k(params.top_k, DEFAULT_TOP_K_CANDIDATES)?;
    let offer = find_offer(&state, offer_id).await?;
    let model = state.engine.embedding_model();

    let cvs: Vec<(CandidateRef, CvDocument)> = list_all_cvs(&state.db)
        .await?
        .into_iter()
        .map(|row| {
            let doc = row.to_document(model);
            (
                CandidateRef {
                    cv_id: row.id,
                    candidate_id: row.candidate_id,
                    name: row.name,
                },
                doc,
            )
        })
        .collect();

    let ranking = state
        .engine
        .rank_cvs_for_offer(
            &offer.to_document(model),
            &cvs,
            top_k,
            MatchOptions {
                generate_explanations: params.generate_explanations,
            },
        )
        .await;

    Ok(Json(CandidateSearchResponse {
        offer_id: offer.id,
        total_results: ranking.total_results,
        matches: ranking.matches,
    }))
}

/// POST /api/v1/matching/test
/// Scores an ad-hoc profile against an ad-hoc offer; nothing is stored.
pub async fn handle_test_match(
    State(state): State<AppState>,
    Json(req): Json<TestMatchRequest>,
) -> Result<Json<MatchingReport>, AppError> {
    let offer = req.offer.unwrap_or_else(sample_offer);
    let cv = CvDocument {
        profile: req.cv,
        embedding: None,
    };
    let offer = OfferDocument {
        title: offer.title,
        description: offer.description,
        missions: offer.missions,
        requirement: offer.requirement,
        embedding: None,
    };

    let report = state
        .engine
        .run(
            &cv,
            &offer,
            MatchOptions {
                generate_explanations: req.generate_explanations,
            },
        )
        .await;
    Ok(Json(report))
}

async fn find_cv(state: &AppState, id: Uuid) -> Result<CvRow, AppError> {
    get_cv(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {id} not found")))
}

fn resolve_top_k(requested: Option<usize>, default: usize) -> Result<usize, AppError> {
    top_k_or(requested, default).ok_or_else(|| {
        AppError::Validation(format!("top_k must be between 1 and {MAX_TOP_K}"))
    })
}

/// Used by `/matching/test` when no offer is supplied.
fn sample_offer() -> TestOffer {
    TestOffer {
        title: "Python Backend Developer".to_string(),
        description: "Build and maintain REST APIs with Python and Django.".to_string(),
        missions: None,
        requirement: JobRequirement {
            required_skills: vec![
                "Python".to_string(),
                "Django".to_string(),
                "PostgreSQL".to_string(),
            ],
            required_experience_years: 2,
            required_education_level: 3,
            required_languages: vec!["English".to_string()],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_request_defaults_to_explanations() {
        let req: ScoreRequest = serde_json::from_str(
            r#"{"cv_id": "00000000-0000-0000-0000-000000000001",
                "offer_id": "00000000-0000-0000-0000-000000000002"}"#,
        )
        .unwrap();
        assert!(req.generate_explanations);
    }

    #[test]
    fn test_resolve_top_k() {
        assert_eq!(resolve_top_k(None, DEFAULT_TOP_K_OFFERS).unwrap(), 5);
        assert_eq!(resolve_top_k(None, DEFAULT_TOP_K_CANDIDATES).unwrap(), 10);
        assert!(matches!(
            resolve_top_k(Some(50), 5),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_test_offer_accepts_flat_requirement() {
        let req: TestMatchRequest = serde_json::from_str(
            r#"{
                "cv": {"skills": ["Rust"]},
                "offer": {"title": "Rust dev", "required_skills": ["Rust"], "required_experience_years": 1}
            }"#,
        )
        .unwrap();
        let offer = req.offer.unwrap();
        assert_eq!(offer.title, "Rust dev");
        assert_eq!(offer.requirement.required_skills, vec!["Rust"]);
        assert_eq!(offer.requirement.required_experience_years, 1);
        assert!(!req.generate_explanations);
    }

    #[test]
    fn test_test_request_tolerates_loose_types() {
        let req: TestMatchRequest = serde_json::from_str(
            r#"{
                "cv": {"skills": ["Rust", null], "languages": [{"language": "English", "level": "C1"}]},
                "offer": {"title": "Rust dev", "required_experience_years": "3", "required_languages": ["English"]}
            }"#,
        )
        .unwrap();
        assert_eq!(req.cv.skills, vec!["Rust"]);
        assert_eq!(req.cv.languages, vec!["English (C1)"]);
        assert_eq!(req.offer.unwrap().requirement.required_experience_years, 3);
    }

    #[test]
    fn test_ranked_match_serializes_flat() {
        let report = MatchingReport {
            result: crate::scoring::compute_match(
                &CandidateProfile::default(),
                &JobRequirement::default(),
                1.0,
            ),
            semantic: crate::matching::engine::Similarity::Computed { value: 1.0 },
            explanations: None,
        };
        let ranked = RankedMatch {
            subject: OfferRef {
                offer_id: Uuid::nil(),
                title: "Dev".to_string(),
            },
            report,
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["title"], "Dev");
        assert_eq!(json["final_score"], 100.0);
        assert_eq!(json["semantic"]["status"], "computed");
    }
}
