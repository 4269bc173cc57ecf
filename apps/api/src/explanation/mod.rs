//! Explanations — turns a `MatchResult` into prose for two audiences.
//!
//! The recruiter gets a verdict with strengths and weaknesses; the candidate
//! gets encouragement and concrete advice. Each view is generated on its own
//! through an `Explainer` and falls back to a canned text if generation fails,
//! so a match always carries both explanations.
//!
//! `MatchingEngine` holds an `Arc<dyn Explainer>`, `LlmExplainer` by default.

pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::explanation::prompts::{
    render_candidate_prompt, render_recruiter_prompt, CANDIDATE_ROLE, RECRUITER_ROLE,
};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{CallOptions, Generated, LlmClient, LlmError};
use crate::scoring::{MatchResult, Recommendation, ScoreBreakdown};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Hire,
    Interview,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruiterExplanation {
    pub verdict: Verdict,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateExplanation {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub valued_skills: Vec<String>,
    #[serde(default)]
    pub improvement_areas: Vec<String>,
    #[serde(default)]
    pub advice: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanations {
    pub for_recruiter: Generated<RecruiterExplanation>,
    pub for_candidate: Generated<CandidateExplanation>,
}

impl Explanations {
    /// Compact form stored alongside an application.
    pub fn one_line(&self) -> String {
        format!(
            "Recruiter: {} | Candidate: {}",
            self.for_recruiter.value().summary,
            self.for_candidate.value().message
        )
    }
}

/// The facts an explanation is allowed to talk about.
#[derive(Debug, Clone, Copy)]
pub struct ExplanationContext<'a> {
    pub final_score: f64,
    pub recommendation: Recommendation,
    pub details: &'a ScoreBreakdown,
    pub job_title: &'a str,
}

impl<'a> ExplanationContext<'a> {
    pub fn new(result: &'a MatchResult, job_title: &'a str) -> Self {
        Self {
            final_score: result.final_score,
            recommendation: result.recommendation,
            details: &result.details,
            job_title,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExplanationError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The model answered with valid JSON but left out the prose.
    #[error("explanation is missing its {0}")]
    Incomplete(&'static str),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain_for_recruiter(
        &self,
        ctx: &ExplanationContext<'_>,
    ) -> Result<RecruiterExplanation, ExplanationError>;

    async fn explain_for_candidate(
        &self,
        ctx: &ExplanationContext<'_>,
    ) -> Result<CandidateExplanation, ExplanationError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmExplainer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmExplainer(pub LlmClient);

#[async_trait]
impl Explainer for LlmExplainer {
    async fn explain_for_recruiter(
        &self,
        ctx: &ExplanationContext<'_>,
    ) -> Result<RecruiterExplanation, ExplanationError> {
        let prompt = render_recruiter_prompt(ctx);
        let system = json_system(RECRUITER_ROLE);
        let explanation: RecruiterExplanation = self
            .0
            .call_json(&prompt, &system, CallOptions::EXPLANATION)
            .await?;
        if explanation.summary.trim().is_empty() {
            return Err(ExplanationError::Incomplete("summary"));
        }
        Ok(explanation)
    }

    async fn explain_for_candidate(
        &self,
        ctx: &ExplanationContext<'_>,
    ) -> Result<CandidateExplanation, ExplanationError> {
        let prompt = render_candidate_prompt(ctx);
        let system = json_system(CANDIDATE_ROLE);
        let explanation: CandidateExplanation = self
            .0
            .call_json(&prompt, &system, CallOptions::EXPLANATION)
            .await?;
        if explanation.message.trim().is_empty() {
            return Err(ExplanationError::Incomplete("message"));
        }
        Ok(explanation)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation with fallbacks
// ────────────────────────────────────────────────────────────────────────────

/// Generates both views concurrently. Never fails.
pub async fn generate_explanations(
    explainer: &dyn Explainer,
    ctx: &ExplanationContext<'_>,
) -> Explanations {
    let (recruiter, candidate) = tokio::join!(
        explainer.explain_for_recruiter(ctx),
        explainer.explain_for_candidate(ctx)
    );

    if let Err(e) = &recruiter {
        warn!("Recruiter explanation failed, using fallback: {e}");
    }
    if let Err(e) = &candidate {
        warn!("Candidate explanation failed, using fallback: {e}");
    }

    Explanations {
        for_recruiter: Generated::or_fallback(recruiter, || recruiter_fallback(ctx)),
        for_candidate: Generated::or_fallback(candidate, || candidate_fallback(ctx)),
    }
}

pub fn recruiter_fallback(ctx: &ExplanationContext<'_>) -> RecruiterExplanation {
    let verdict = if ctx.final_score >= Recommendation::AVERAGE_THRESHOLD {
        Verdict::Interview
    } else {
        Verdict::Reject
    };
    RecruiterExplanation {
        verdict,
        strengths: vec!["Profile analysed automatically".to_string()],
        weaknesses: vec!["Detailed analysis unavailable".to_string()],
        summary: format!(
            "Match score: {}%. Recommendation: {}.",
            ctx.final_score, ctx.recommendation
        ),
    }
}

pub fn candidate_fallback(ctx: &ExplanationContext<'_>) -> CandidateExplanation {
    let skills = &ctx.details.skills;
    let improvement_areas = if skills.missing.is_empty() {
        vec!["Keep developing your skills".to_string()]
    } else {
        skills.missing.iter().take(3).cloned().collect()
    };
    CandidateExplanation {
        message: format!(
            "Your profile scores {}% for this position.",
            ctx.final_score
        ),
        valued_skills: skills.matched.iter().take(3).cloned().collect(),
        improvement_areas,
        advice: vec![
            "Keep your resume up to date".to_string(),
            "Highlight your most relevant experience".to_string(),
            "Build the skills the offer asks for".to_string(),
        ],
    }
}
