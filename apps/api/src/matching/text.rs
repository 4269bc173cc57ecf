// Embedding inputs. Sections are labelled and joined with " | " so the same
// profile always produces the same text (and the same cache key).

use crate::scoring::profile::CandidateProfile;

const SEPARATOR: &str = " | ";

pub fn build_cv_text(profile: &CandidateProfile) -> String {
    let mut parts = Vec::new();

    let skills = join_non_blank(&profile.skills);
    if !skills.is_empty() {
        parts.push(format!("Skills: {skills}"));
    }

    // Title and description are separate parts; a description can stand alone.
    for exp in &profile.experiences {
        if !exp.title.trim().is_empty() {
            parts.push(format!("Experience: {}", exp.title.trim()));
        }
        if !exp.description.trim().is_empty() {
            parts.push(exp.description.trim().to_string());
        }
    }

    for edu in &profile.education {
        if !edu.degree.trim().is_empty() {
            parts.push(format!("Education: {}", edu.degree.trim()));
        }
    }

    let languages = join_non_blank(&profile.languages);
    if !languages.is_empty() {
        parts.push(format!("Languages: {languages}"));
    }

    parts.join(SEPARATOR)
}

/// Offer fields that feed the embedding.
#[derive(Debug, Clone, Copy)]
pub struct OfferText<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub missions: Option<&'a str>,
    pub required_skills: &'a [String],
    pub required_languages: &'a [String],
}

pub fn build_offer_text(offer: OfferText<'_>) -> String {
    let mut parts = Vec::new();

    if !offer.title.trim().is_empty() {
        parts.push(format!("Position: {}", offer.title.trim()));
    }
    if !offer.description.trim().is_empty() {
        parts.push(offer.description.trim().to_string());
    }

    let skills = join_non_blank(offer.required_skills);
    if !skills.is_empty() {
        parts.push(format!("Required skills: {skills}"));
    }

    if let Some(missions) = offer.missions.map(str::trim).filter(|m| !m.is_empty()) {
        parts.push(format!("Missions: {missions}"));
    }

    let languages = join_non_blank(offer.required_languages);
    if !languages.is_empty() {
        parts.push(format!("Languages: {languages}"));
    }

    parts.join(SEPARATOR)
}

fn join_non_blank(items: &[String]) -> String {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
