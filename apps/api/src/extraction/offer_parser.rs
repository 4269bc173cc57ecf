//! Offer parser: recruiter form → structured `ParsedOffer`.
//!
//! The recruiter's own entries always win over what the model extracted; the
//! model only fills the gaps.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::extraction::prompts::{OFFER_PARSE_PROMPT, OFFER_PARSE_ROLE};
use crate::llm_client::prompts::{json_system, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{CallOptions, Generated, LlmClient};
use crate::scoring::profile::{
    items, lenient_string, optional_number, optional_text, JobRequirement, MAX_EDUCATION_LEVEL,
};

/// What a recruiter submits when creating an offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub missions: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub required_experience_years: Option<u32>,
    #[serde(default)]
    pub required_education_level: Option<u8>,
    #[serde(default)]
    pub required_languages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedOffer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "missions_text")]
    pub missions: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub contract_type: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub salary_min: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub salary_max: Option<f64>,
    #[serde(flatten)]
    pub requirement: JobRequirement,
}

impl OfferDraft {
    /// The offer as plain text, the way a job board would show it.
    pub fn prompt_text(&self) -> String {
        let mut text = format!(
            "Title: {}\n\nDescription:\n{}",
            self.title.trim(),
            self.description.trim()
        );
        if let Some(missions) = non_blank(&self.missions) {
            text.push_str(&format!("\n\nMissions:\n{missions}"));
        }
        if let Some(location) = non_blank(&self.location) {
            text.push_str(&format!("\n\nLocation: {location}"));
        }
        if let Some(contract) = non_blank(&self.contract_type) {
            text.push_str(&format!("\n\nContract: {contract}"));
        }
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => text.push_str(&format!("\n\nSalary: {min} - {max}")),
            (Some(min), None) => text.push_str(&format!("\n\nSalary: from {min}")),
            (None, Some(max)) => text.push_str(&format!("\n\nSalary: up to {max}")),
            (None, None) => {}
        }
        text
    }

    /// Offer built from the draft alone, used when the model is unavailable.
    pub fn fallback_offer(&self) -> ParsedOffer {
        self.merge_into(ParsedOffer::default())
    }

    /// Overlays the recruiter's entries on top of the extracted offer.
    pub fn merge_into(&self, parsed: ParsedOffer) -> ParsedOffer {
        let requirement = JobRequirement {
            required_skills: self
                .required_skills
                .clone()
                .filter(|skills| !skills.is_empty())
                .unwrap_or(parsed.requirement.required_skills),
            required_experience_years: self
                .required_experience_years
                .unwrap_or(parsed.requirement.required_experience_years),
            required_education_level: self
                .required_education_level
                .map(|level| level.min(MAX_EDUCATION_LEVEL))
                .unwrap_or(parsed.requirement.required_education_level),
            required_languages: self
                .required_languages
                .clone()
                .filter(|languages| !languages.is_empty())
                .unwrap_or(parsed.requirement.required_languages),
        };

        ParsedOffer {
            title: first_non_blank(&self.title, parsed.title),
            description: first_non_blank(&self.description, parsed.description),
            missions: non_blank(&self.missions)
                .map(str::to_string)
                .or(parsed.missions),
            location: non_blank(&self.location)
                .map(str::to_string)
                .or(parsed.location),
            contract_type: non_blank(&self.contract_type)
                .map(str::to_string)
                .or(parsed.contract_type),
            salary_min: self.salary_min.or(parsed.salary_min),
            salary_max: self.salary_max.or(parsed.salary_max),
            requirement,
        }
    }
}

/// Extracts the requirements of an offer. Never fails: if the model call
/// fails the draft itself becomes the offer.
pub async fn parse_offer(draft: &OfferDraft, llm: &LlmClient) -> Generated<ParsedOffer> {
    let prompt = OFFER_PARSE_PROMPT
        .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
        .replace("{offer_text}", &draft.prompt_text());
    let system = json_system(OFFER_PARSE_ROLE);

    let result = llm
        .call_json::<ParsedOffer>(&prompt, &system, CallOptions::EXTRACTION)
        .await
        .map(|parsed| draft.merge_into(parsed));

    match &result {
        Ok(offer) => info!(
            "Offer '{}' parsed: {} required skills, {} years, education level {}",
            offer.title,
            offer.requirement.required_skills.len(),
            offer.requirement.required_experience_years,
            offer.requirement.required_education_level
        ),
        Err(e) => warn!("Offer parsing failed, using the recruiter draft: {e}"),
    }

    Generated::or_fallback(result, || draft.fallback_offer())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn first_non_blank(preferred: &str, other: String) -> String {
    if preferred.trim().is_empty() {
        other
    } else {
        preferred.trim().to_string()
    }
}

/// Missions arrive either as one paragraph or as a list of bullet points.
fn missions_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let missions = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        list @ Some(Value::Array(_)) => items(list)
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    };
    Ok(Some(missions).filter(|m| !m.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OfferDraft {
        OfferDraft {
            title: "Backend Engineer".to_string(),
            description: "Build APIs in Python.".to_string(),
            location: Some("Paris".to_string()),
            ..Default::default()
        }
    }

    fn client_for(server: &mockito::ServerGuard) -> LlmClient {
        LlmClient::new(
            format!("{}/chat/completions", server.url()),
            "test-key".to_string(),
            "test-model".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_prompt_text_skips_empty_sections() {
        let text = draft().prompt_text();
        assert!(text.starts_with("Title: Backend Engineer"));
        assert!(text.contains("Location: Paris"));
        assert!(!text.contains("Missions"));
        assert!(!text.contains("Salary"));
    }

    #[test]
    fn test_missions_accept_list_or_text() {
        let offer: ParsedOffer =
            serde_json::from_str(r#"{"missions": ["Design APIs", " ", "Review code"]}"#).unwrap();
        assert_eq!(offer.missions.as_deref(), Some("Design APIs; Review code"));

        let offer: ParsedOffer = serde_json::from_str(r#"{"missions": "Ship features"}"#).unwrap();
        assert_eq!(offer.missions.as_deref(), Some("Ship features"));

        let offer: ParsedOffer = serde_json::from_str(r#"{"missions": null}"#).unwrap();
        assert!(offer.missions.is_none());
    }

    #[test]
    fn test_loosely_typed_extraction_keeps_requirements() {
        let json = r#"{
            "title": "Data Engineer",
            "salary_min": "45000",
            "salary_max": "negotiable",
            "location": null,
            "required_skills": ["Spark", null, "SQL"],
            "required_experience_years": 2.5,
            "required_education_level": "4",
            "required_languages": [{"language": "English", "level": "B2"}]
        }"#;
        let offer: ParsedOffer = serde_json::from_str(json).unwrap();
        assert_eq!(offer.salary_min, Some(45000.0));
        assert!(offer.salary_max.is_none());
        assert!(offer.location.is_none());
        assert_eq!(offer.requirement.required_skills, vec!["Spark", "SQL"]);
        assert_eq!(offer.requirement.required_experience_years, 2);
        assert_eq!(offer.requirement.required_education_level, 4);
        assert_eq!(offer.requirement.required_languages, vec!["English (B2)"]);
    }

    #[test]
    fn test_recruiter_entries_override_extraction() {
        let mut d = draft();
        d.required_skills = Some(vec!["Python".to_string(), "Django".to_string()]);
        d.required_education_level = Some(8);

        let parsed = ParsedOffer {
            title: "Something else".to_string(),
            location: Some("Lyon".to_string()),
            contract_type: Some("permanent".to_string()),
            requirement: JobRequirement {
                required_skills: vec!["Java".to_string()],
                required_experience_years: 3,
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = d.merge_into(parsed);
        assert_eq!(merged.title, "Backend Engineer");
        assert_eq!(merged.location.as_deref(), Some("Paris"));
        assert_eq!(merged.contract_type.as_deref(), Some("permanent"));
        assert_eq!(merged.requirement.required_skills, vec!["Python", "Django"]);
        assert_eq!(merged.requirement.required_experience_years, 3);
        assert_eq!(merged.requirement.required_education_level, MAX_EDUCATION_LEVEL);
    }

    #[test]
    fn test_empty_recruiter_skills_do_not_erase_extraction() {
        let mut d = draft();
        d.required_skills = Some(Vec::new());
        let parsed = ParsedOffer {
            requirement: JobRequirement {
                required_skills: vec!["Go".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(d.merge_into(parsed).requirement.required_skills, vec!["Go"]);
    }

    #[tokio::test]
    async fn test_parse_offer_falls_back_to_draft() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "invalid api key"}}"#)
            .create_async()
            .await;

        let mut d = draft();
        d.required_experience_years = Some(2);
        let outcome = parse_offer(&d, &client_for(&server)).await;

        assert!(outcome.is_fallback());
        let offer = outcome.into_value();
        assert_eq!(offer.title, "Backend Engineer");
        assert_eq!(offer.description, "Build APIs in Python.");
        assert_eq!(offer.requirement.required_experience_years, 2);
        assert!(offer.requirement.required_skills.is_empty());
    }

    #[tokio::test]
    async fn test_parse_offer_success() {
        let mut server = mockito::Server::new_async().await;
        let content = r#"{
            "title": "Backend Engineer",
            "description": "Build APIs in Python.",
            "required_skills": ["Python", "PostgreSQL"],
            "required_experience_years": 3,
            "required_education_level": 4,
            "required_languages": [{"language": "English", "level": "fluent"}]
        }"#;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({"choices": [{"message": {"content": content}}]}).to_string(),
            )
            .create_async()
            .await;

        let outcome = parse_offer(&draft(), &client_for(&server)).await;
        assert!(!outcome.is_fallback());
        let offer = outcome.into_value();
        assert_eq!(offer.requirement.required_skills, vec!["Python", "PostgreSQL"]);
        assert_eq!(offer.requirement.required_education_level, 4);
        assert_eq!(offer.requirement.required_languages, vec!["English (fluent)"]);
        assert_eq!(offer.location.as_deref(), Some("Paris"));
    }
}
