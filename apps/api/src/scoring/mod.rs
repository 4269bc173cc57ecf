//! Match scoring: a deterministic, side-effect free function from a candidate
//! profile, a job requirement and a semantic similarity to a 0–100 score.
//!
//! final = 0.40·semantic + 0.25·skills + 0.20·experience + 0.10·education + 0.05·languages
//!
//! Every sub-score is clamped to [0, 1] before weighting, so the final score
//! always lands in [0, 100]. Nothing in here can fail: missing data simply
//! scores as absent.

pub mod education;
pub mod experience;
pub mod profile;
pub mod skills;

use serde::{Deserialize, Serialize};

use crate::scoring::education::{education_level, score_education};
use crate::scoring::experience::{extract_years, score_experience};
use crate::scoring::profile::{CandidateProfile, JobRequirement};
use crate::scoring::skills::{match_languages, match_skills};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub languages: f64,
}

pub const WEIGHTS: ScoringWeights = ScoringWeights {
    semantic: 0.40,
    skills: 0.25,
    experience: 0.20,
    education: 0.10,
    languages: 0.05,
};

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.semantic + self.skills + self.experience + self.education + self.languages
    }
}

/// Recommendation bands, declared lowest first so `Ord` follows the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Low,
    Average,
    Good,
    Excellent,
}

impl Recommendation {
    pub const EXCELLENT_THRESHOLD: f64 = 80.0;
    pub const GOOD_THRESHOLD: f64 = 65.0;
    pub const AVERAGE_THRESHOLD: f64 = 50.0;

    pub fn from_score(final_score: f64) -> Self {
        if final_score >= Self::EXCELLENT_THRESHOLD {
            Recommendation::Excellent
        } else if final_score >= Self::GOOD_THRESHOLD {
            Recommendation::Good
        } else if final_score >= Self::AVERAGE_THRESHOLD {
            Recommendation::Average
        } else {
            Recommendation::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Low => "low",
            Recommendation::Average => "average",
            Recommendation::Good => "good",
            Recommendation::Excellent => "excellent",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermBreakdown {
    /// Percentage, 0 – 100.
    pub score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceBreakdown {
    pub score: f64,
    pub candidate_years: u32,
    pub required_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationBreakdown {
    pub score: f64,
    pub candidate_level: u8,
    pub required_level: u8,
}

/// Per-criterion detail. All scores are percentages rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub semantic_similarity: f64,
    pub skills: TermBreakdown,
    pub experience: ExperienceBreakdown,
    pub education: EducationBreakdown,
    pub languages: TermBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub final_score: f64,
    pub recommendation: Recommendation,
    pub details: ScoreBreakdown,
}

/// Scores a candidate against a job requirement.
///
/// `semantic_similarity` is the normalized embedding similarity in [0, 1];
/// out-of-range or NaN values are clamped.
pub fn compute_match(
    candidate: &CandidateProfile,
    requirement: &JobRequirement,
    semantic_similarity: f64,
) -> MatchResult {
    let semantic = clamp_unit(semantic_similarity);

    let skills = match_skills(&candidate.skills, &requirement.required_skills);

    let candidate_years = extract_years(&candidate.experiences);
    let experience = score_experience(candidate_years, requirement.required_experience_years);

    let candidate_level = education_level(&candidate.education);
    let education = score_education(candidate_level, requirement.required_education_level);

    let languages = match_languages(&candidate.languages, &requirement.required_languages);

    let final_score = weighted_score(
        &WEIGHTS,
        semantic,
        skills.score,
        experience,
        education,
        languages.score,
    );

    MatchResult {
        final_score,
        recommendation: Recommendation::from_score(final_score),
        details: ScoreBreakdown {
            semantic_similarity: to_percent(semantic),
            skills: TermBreakdown {
                score: to_percent(skills.score),
                matched: skills.matched,
                missing: skills.missing,
            },
            experience: ExperienceBreakdown {
                score: to_percent(experience),
                candidate_years,
                required_years: requirement.required_experience_years,
            },
            education: EducationBreakdown {
                score: to_percent(education),
                candidate_level,
                required_level: requirement.required_education_level,
            },
            languages: TermBreakdown {
                score: to_percent(languages.score),
                matched: languages.matched,
                missing: languages.missing,
            },
        },
    }
}

/// Σ wᵢ·clamp(sᵢ) scaled to a percentage and rounded to 2 decimals.
pub fn weighted_score(
    weights: &ScoringWeights,
    semantic: f64,
    skills: f64,
    experience: f64,
    education: f64,
    languages: f64,
) -> f64 {
    let sum = weights.semantic * clamp_unit(semantic)
        + weights.skills * clamp_unit(skills)
        + weights.experience * clamp_unit(experience)
        + weights.education * clamp_unit(education)
        + weights.languages * clamp_unit(languages);
    round2(sum * 100.0).clamp(0.0, 100.0)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn to_percent(value: f64) -> f64 {
    round2(clamp_unit(value) * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::profile::{EducationEntry, ExperienceEntry};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn python_candidate() -> CandidateProfile {
        CandidateProfile {
            skills: strings(&["Python", "Django", "PostgreSQL", "Git"]),
            experiences: vec![ExperienceEntry {
                title: "Backend developer".to_string(),
                period: "2019 - 2023".to_string(),
                ..Default::default()
            }],
            education: vec![EducationEntry {
                degree: "Master Informatique".to_string(),
                ..Default::default()
            }],
            languages: strings(&["French", "English (B2)"]),
        }
    }

    fn python_offer() -> JobRequirement {
        JobRequirement {
            required_skills: strings(&["Python", "Django", "PostgreSQL"]),
            required_experience_years: 3,
            required_education_level: 4,
            required_languages: strings(&["English"]),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((WEIGHTS.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_candidate() {
        let result = compute_match(&python_candidate(), &python_offer(), 1.0);
        assert_eq!(result.final_score, 100.0);
        assert_eq!(result.recommendation, Recommendation::Excellent);
        assert_eq!(result.details.skills.score, 100.0);
        assert_eq!(
            result.details.skills.matched,
            strings(&["Python", "Django", "PostgreSQL"])
        );
        assert!(result.details.skills.missing.is_empty());
        assert_eq!(result.details.experience.candidate_years, 4);
        assert_eq!(result.details.education.candidate_level, 4);
    }

    #[test]
    fn test_semantic_weight_only() {
        // Everything else perfect, semantic at 0.5 → 100 - 40 * 0.5
        let result = compute_match(&python_candidate(), &python_offer(), 0.5);
        assert_eq!(result.final_score, 80.0);
        assert_eq!(result.details.semantic_similarity, 50.0);
    }

    #[test]
    fn test_empty_inputs_never_fail() {
        let result = compute_match(&CandidateProfile::default(), &JobRequirement::default(), 0.0);
        // no requirements → skills, experience, education, languages at 1.0
        assert_eq!(result.final_score, 60.0);
        assert_eq!(result.recommendation, Recommendation::Average);
    }

    #[test]
    fn test_empty_candidate_against_demanding_offer() {
        let result = compute_match(&CandidateProfile::default(), &python_offer(), 0.0);
        assert_eq!(result.details.skills.score, 0.0);
        assert_eq!(result.details.experience.score, 20.0);
        assert_eq!(result.details.education.score, 20.0);
        assert_eq!(result.details.languages.score, 0.0);
        // 0.20 * 0.2 + 0.10 * 0.2 = 0.06
        assert_eq!(result.final_score, 6.0);
        assert_eq!(result.recommendation, Recommendation::Low);
    }

    #[test]
    fn test_no_experience_required_is_full_credit() {
        let mut offer = python_offer();
        offer.required_experience_years = 0;
        let mut candidate = python_candidate();
        candidate.experiences.clear();

        let result = compute_match(&candidate, &offer, 0.7);
        assert_eq!(result.details.experience.score, 100.0);
    }

    #[test]
    fn test_no_education_required_is_full_credit() {
        let mut offer = python_offer();
        offer.required_education_level = 0;
        let mut candidate = python_candidate();
        candidate.education.clear();

        let result = compute_match(&candidate, &offer, 0.7);
        assert_eq!(result.details.education.score, 100.0);
    }

    #[test]
    fn test_final_score_equals_rounded_weighted_sum() {
        let candidate = CandidateProfile {
            skills: strings(&["Python", "Flask"]),
            experiences: vec![ExperienceEntry {
                period: "2 years".to_string(),
                ..Default::default()
            }],
            education: vec![EducationEntry {
                degree: "Licence".to_string(),
                ..Default::default()
            }],
            languages: strings(&["Spanish"]),
        };
        let offer = JobRequirement {
            required_skills: strings(&["Python", "Django", "Docker"]),
            required_experience_years: 5,
            required_education_level: 4,
            required_languages: strings(&["English", "Spanish"]),
        };
        let semantic = 0.6371;

        let result = compute_match(&candidate, &offer, semantic);

        let skills = 1.0 / 3.0;
        let experience = 0.4;
        let education = 0.7;
        let languages = 0.5;
        let expected = ((0.40 * semantic
            + 0.25 * skills
            + 0.20 * experience
            + 0.10 * education
            + 0.05 * languages)
            * 100.0
            * 100.0)
            .round()
            / 100.0;
        assert_eq!(result.final_score, expected);
        assert_eq!(result.details.skills.score, 33.33);
    }

    #[test]
    fn test_final_score_bounded_for_out_of_range_similarity() {
        let high = compute_match(&python_candidate(), &python_offer(), 7.5);
        assert!(high.final_score <= 100.0);

        let low = compute_match(&CandidateProfile::default(), &python_offer(), -3.0);
        assert!(low.final_score >= 0.0);

        let nan = compute_match(&python_candidate(), &python_offer(), f64::NAN);
        assert!((0.0..=100.0).contains(&nan.final_score));
    }

    #[test]
    fn test_final_score_bounded_over_grid() {
        let steps = [0.0, 0.25, 0.5, 0.75, 1.0];
        for s in steps {
            for k in steps {
                for e in steps {
                    let score = weighted_score(&WEIGHTS, s, k, e, k, s);
                    assert!((0.0..=100.0).contains(&score), "score {score} out of range");
                }
            }
        }
    }

    #[test]
    fn test_recommendation_bands() {
        assert_eq!(Recommendation::from_score(100.0), Recommendation::Excellent);
        assert_eq!(Recommendation::from_score(80.0), Recommendation::Excellent);
        assert_eq!(Recommendation::from_score(79.99), Recommendation::Good);
        assert_eq!(Recommendation::from_score(65.0), Recommendation::Good);
        assert_eq!(Recommendation::from_score(64.99), Recommendation::Average);
        assert_eq!(Recommendation::from_score(50.0), Recommendation::Average);
        assert_eq!(Recommendation::from_score(49.99), Recommendation::Low);
        assert_eq!(Recommendation::from_score(0.0), Recommendation::Low);
    }

    #[test]
    fn test_recommendation_is_monotonic() {
        let mut previous = Recommendation::from_score(0.0);
        for i in 0..=10_000 {
            let current = Recommendation::from_score(i as f64 / 100.0);
            assert!(current >= previous, "band dropped at {}", i as f64 / 100.0);
            previous = current;
        }
    }

    #[test]
    fn test_recommendation_serializes_lowercase() {
        let json = serde_json::to_string(&Recommendation::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
    }
}
