//! Matching engine — embeds both sides, scores them and optionally explains
//! the result.
//!
//! The engine owns no global state: the embedder and explainer are injected at
//! startup and shared through `AppState` as `Arc<MatchingEngine>`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::embeddings::{cosine_similarity, Embedder, EmbeddingError};
use crate::explanation::{generate_explanations, Explainer, ExplanationContext, Explanations};
use crate::matching::text::{build_cv_text, build_offer_text, OfferText};
use crate::scoring::profile::{CandidateProfile, JobRequirement};
use crate::scoring::{compute_match, MatchResult};

pub const DEFAULT_TOP_K_OFFERS: usize = 5;
pub const DEFAULT_TOP_K_CANDIDATES: usize = 10;
pub const MAX_TOP_K: usize = 20;
pub const UNTITLED_POSITION: &str = "Untitled position";

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// A candidate side of a match, with its stored embedding if one exists.
#[derive(Debug, Clone, Default)]
pub struct CvDocument {
    pub profile: CandidateProfile,
    pub embedding: Option<Vec<f32>>,
}

/// An offer side of a match, with its stored embedding if one exists.
#[derive(Debug, Clone, Default)]
pub struct OfferDocument {
    pub title: String,
    pub description: String,
    pub missions: Option<String>,
    pub requirement: JobRequirement,
    pub embedding: Option<Vec<f32>>,
}

impl OfferDocument {
    pub fn text(&self) -> OfferText<'_> {
        OfferText {
            title: &self.title,
            description: &self.description,
            missions: self.missions.as_deref(),
            required_skills: &self.requirement.required_skills,
            required_languages: &self.requirement.required_languages,
        }
    }

    fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            UNTITLED_POSITION
        } else {
            title
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MatchOptions {
    pub generate_explanations: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            generate_explanations: true,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outputs
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of the embedding step. An unavailable similarity scores as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Similarity {
    Computed { value: f64 },
    Unavailable { reason: String },
}

impl Similarity {
    pub fn value(&self) -> f64 {
        match self {
            Similarity::Computed { value } => *value,
            Similarity::Unavailable { .. } => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingReport {
    #[serde(flatten)]
    pub result: MatchResult,
    pub semantic: Similarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanations: Option<Explanations>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch<K> {
    /// Identifies the ranked side; flattened into the match object.
    #[serde(flatten)]
    pub subject: K,
    #[serde(flatten)]
    pub report: MatchingReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ranking<K> {
    pub total_results: usize,
    pub matches: Vec<RankedMatch<K>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Embedding of one side, or the reason it could not be produced.
type Resolved = Result<Vec<f32>, String>;

pub struct MatchingEngine {
    embedder: Arc<dyn Embedder>,
    explainer: Arc<dyn Explainer>,
}

impl MatchingEngine {
    pub fn new(embedder: Arc<dyn Embedder>, explainer: Arc<dyn Explainer>) -> Self {
        Self {
            embedder,
            explainer,
        }
    }

    pub fn embedding_model(&self) -> &str {
        self.embedder.model()
    }

    pub async fn embed_cv(&self, profile: &CandidateProfile) -> Result<Vec<f32>, EmbeddingError> {
        self.embedder.embed(&build_cv_text(profile)).await
    }

    pub async fn embed_offer(&self, offer: OfferText<'_>) -> Result<Vec<f32>, EmbeddingError> {
        self.embedder.embed(&build_offer_text(offer)).await
    }

    /// Scores one CV against one offer.
    pub async fn run(
        &self,
        cv: &CvDocument,
        offer: &OfferDocument,
        options: MatchOptions,
    ) -> MatchingReport {
        let cv_vec = self.resolve_cv(cv).await;
        let offer_vec = self.resolve_offer(offer).await;
        let report = score(cv, offer, &cv_vec, &offer_vec);

        info!(
            "Match computed: score={} recommendation={}",
            report.result.final_score, report.result.recommendation
        );

        self.with_explanations(report, offer.display_title(), options)
            .await
    }

    /// Scores one CV against every offer and keeps the best `top_k`.
    pub async fn rank_offers_for_cv<K: Clone>(
        &self,
        cv: &CvDocument,
        offers: &[(K, OfferDocument)],
        top_k: usize,
        options: MatchOptions,
    ) -> Ranking<K> {
        let cv_vec = self.resolve_cv(cv).await;

        let mut scored = Vec::with_capacity(offers.len());
        for (id, offer) in offers {
            let offer_vec = self.resolve_offer(offer).await;
            scored.push((id.clone(), offer, score(cv, offer, &cv_vec, &offer_vec)));
        }

        self.finish_ranking(scored, top_k, options).await
    }

    /// Scores every CV against one offer and keeps the best `top_k`.
    pub async fn rank_cvs_for_offer<K: Clone>(
        &self,
        offer: &OfferDocument,
        cvs: &[(K, CvDocument)],
        top_k: usize,
        options: MatchOptions,
    ) -> Ranking<K> {
        let offer_vec = self.resolve_offer(offer).await;

        let mut scored = Vec::with_capacity(cvs.len());
        for (id, cv) in cvs {
            let cv_vec = self.resolve_cv(cv).await;
            scored.push((id.clone(), offer, score(cv, offer, &cv_vec, &offer_vec)));
        }

        self.finish_ranking(scored, top_k, options).await
    }

    /// Sorts by score, truncates, then explains only the survivors.
    async fn finish_ranking<K>(
        &self,
        mut scored: Vec<(K, &OfferDocument, MatchingReport)>,
        top_k: usize,
        options: MatchOptions,
    ) -> Ranking<K> {
        let total_results = scored.len();
        scored.sort_by(|a, b| b.2.result.final_score.total_cmp(&a.2.result.final_score));
        scored.truncate(top_k);

        let mut matches = Vec::with_capacity(scored.len());
        for (subject, offer, report) in scored {
            let report = self
                .with_explanations(report, offer.display_title(), options)
                .await;
            matches.push(RankedMatch { subject, report });
        }

        info!(
            "Ranking done: {} scored, {} returned",
            total_results,
            matches.len()
        );

        Ranking {
            total_results,
            matches,
        }
    }

    async fn with_explanations(
        &self,
        mut report: MatchingReport,
        job_title: &str,
        options: MatchOptions,
    ) -> MatchingReport {
        if options.generate_explanations {
            let ctx = ExplanationContext::new(&report.result, job_title);
            let explanations = generate_explanations(self.explainer.as_ref(), &ctx).await;
            report.explanations = Some(explanations);
        }
        report
    }

    async fn resolve_cv(&self, cv: &CvDocument) -> Resolved {
        match &cv.embedding {
            Some(stored) if !stored.is_empty() => Ok(stored.clone()),
            _ => self.embed_cv(&cv.profile).await.map_err(|e| {
                warn!("CV embedding failed: {e}");
                e.to_string()
            }),
        }
    }

    async fn resolve_offer(&self, offer: &OfferDocument) -> Resolved {
        match &offer.embedding {
            Some(stored) if !stored.is_empty() => Ok(stored.clone()),
            _ => self.embed_offer(offer.text()).await.map_err(|e| {
                warn!("Offer embedding failed: {e}");
                e.to_string()
            }),
        }
    }
}

/// Clamps a requested result count to `1..=MAX_TOP_K`.
pub fn top_k_or(requested: Option<usize>, default: usize) -> Option<usize> {
    match requested {
        None => Some(default),
        Some(k) if (1..=MAX_TOP_K).contains(&k) => Some(k),
        Some(_) => None,
    }
}

fn similarity(cv_vec: &Resolved, offer_vec: &Resolved) -> Similarity {
    match (cv_vec, offer_vec) {
        (Ok(a), Ok(b)) => Similarity::Computed {
            value: cosine_similarity(a, b),
        },
        (Err(reason), _) => Similarity::Unavailable {
            reason: format!("cv embedding: {reason}"),
        },
        (_, Err(reason)) => Similarity::Unavailable {
            reason: format!("offer embedding: {reason}"),
        },
    }
}

fn score(
    cv: &CvDocument,
    offer: &OfferDocument,
    cv_vec: &Resolved,
    offer_vec: &Resolved,
) -> MatchingReport {
    let semantic = similarity(cv_vec, offer_vec);
    let result = compute_match(&cv.profile, &offer.requirement, semantic.value());
    MatchingReport {
        result,
        semantic,
        explanations: None,
    }
}
