//! CV parser: raw resume text → contact details plus a `CandidateProfile`.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extraction::prompts::{CV_PARSE_PROMPT, CV_PARSE_ROLE};
use crate::llm_client::prompts::{json_system, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{CallOptions, Generated, LlmClient};
use crate::scoring::profile::{optional_text, CandidateProfile};

/// Resume text beyond this many characters is not sent to the model.
pub const MAX_CV_CHARS: usize = 12_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCv {
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub profile: CandidateProfile,
}

/// Parses resume text with the LLM. Never fails: on any LLM error the result
/// is an empty profile tagged as a fallback.
pub async fn parse_cv(cv_text: &str, llm: &LlmClient) -> Generated<ParsedCv> {
    let prompt = CV_PARSE_PROMPT
        .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
        .replace("{cv_text}", truncate_chars(cv_text, MAX_CV_CHARS));
    let system = json_system(CV_PARSE_ROLE);

    let result = llm
        .call_json::<ParsedCv>(&prompt, &system, CallOptions::EXTRACTION)
        .await
        .map(ParsedCv::cleaned);

    match &result {
        Ok(cv) => info!(
            "CV parsed: {} skills, {} experiences, {} education entries",
            cv.profile.skills.len(),
            cv.profile.experiences.len(),
            cv.profile.education.len()
        ),
        Err(e) => warn!("CV parsing failed, storing an empty profile: {e}"),
    }

    Generated::or_fallback(result, ParsedCv::default)
}

impl ParsedCv {
    /// Drops blank strings the model sometimes emits in place of null.
    fn cleaned(mut self) -> Self {
        for field in [&mut self.name, &mut self.email, &mut self.phone] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self.profile.skills.retain(|s| !s.trim().is_empty());
        self.profile.languages.retain(|s| !s.trim().is_empty());
        self
    }
}

/// Longest prefix of `text` with at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> LlmClient {
        LlmClient::new(
            format!("{}/chat/completions", server.url()),
            "test-key".to_string(),
            "test-model".to_string(),
        )
        .unwrap()
    }

    fn completion(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_parsed_cv_flattens_profile() {
        let json = r#"{
            "name": "Ada Lovelace",
            "email": null,
            "skills": ["Python", "SQL"],
            "experiences": [{"title": "Analyst", "period": "2018 - 2022"}],
            "languages": ["English (C2)"]
        }"#;
        let cv: ParsedCv = serde_json::from_str(json).unwrap();
        assert_eq!(cv.name.as_deref(), Some("Ada Lovelace"));
        assert!(cv.email.is_none());
        assert_eq!(cv.profile.skills, vec!["Python", "SQL"]);
        assert_eq!(cv.profile.experiences[0].period, "2018 - 2022");
    }

    #[test]
    fn test_malformed_fields_keep_the_rest_of_the_profile() {
        let json = r#"{
            "name": ["Ada"],
            "phone": 33612345678,
            "skills": ["Python", null, "SQL"],
            "languages": [{"language": "English", "level": "C2"}],
            "experiences": [{"title": "Analyst", "period": "2018 - 2022", "company": 42}]
        }"#;
        let cv: ParsedCv = serde_json::from_str(json).unwrap();
        assert!(cv.name.is_none());
        assert_eq!(cv.phone.as_deref(), Some("33612345678"));
        assert_eq!(cv.profile.skills, vec!["Python", "SQL"]);
        assert_eq!(cv.profile.languages, vec!["English (C2)"]);
        assert_eq!(cv.profile.experiences[0].company, "42");
    }

    #[test]
    fn test_cleaned_drops_blank_values() {
        let cv = ParsedCv {
            name: Some("  ".to_string()),
            email: Some("a@b.c".to_string()),
            phone: Some(String::new()),
            profile: CandidateProfile {
                skills: vec!["Rust".to_string(), " ".to_string()],
                ..Default::default()
            },
        }
        .cleaned();
        assert!(cv.name.is_none());
        assert!(cv.phone.is_none());
        assert_eq!(cv.email.as_deref(), Some("a@b.c"));
        assert_eq!(cv.profile.skills, vec!["Rust"]);
    }

    #[tokio::test]
    async fn test_parse_cv_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(
                r#"{"name": "Jane Doe", "skills": ["Rust", "Tokio"], "education": [{"degree": "Master"}]}"#,
            ))
            .create_async()
            .await;

        let outcome = parse_cv("Jane Doe, Rust developer", &client_for(&server)).await;
        assert!(!outcome.is_fallback());
        let cv = outcome.into_value();
        assert_eq!(cv.name.as_deref(), Some("Jane Doe"));
        assert_eq!(cv.profile.skills, vec!["Rust", "Tokio"]);
        assert_eq!(cv.profile.education[0].degree, "Master");
    }

    #[tokio::test]
    async fn test_parse_cv_falls_back_on_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("Sorry, I cannot help with that."))
            .create_async()
            .await;

        let outcome = parse_cv("some resume", &client_for(&server)).await;
        assert!(outcome.is_fallback());
        assert!(outcome.reason().is_some());
        assert_eq!(outcome.into_value(), ParsedCv::default());
    }
}
