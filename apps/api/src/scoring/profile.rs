//! Structured inputs of the scorer. Everything here is produced by LLM
//! extraction, so no field can make a record fail to deserialize: absent,
//! `null` or wrongly typed values fall back to their defaults.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Highest education level on the 0–5 scale.
pub const MAX_EDUCATION_LEVEL: u8 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: String,
    /// Free text, e.g. "2019 - 2023" or "3 years".
    #[serde(default, deserialize_with = "lenient_string")]
    pub period: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
}

/// What the scorer knows about a candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default, deserialize_with = "string_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "record_list")]
    pub experiences: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "record_list")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "language_list")]
    pub languages: Vec<String>,
}

/// What a job offer asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    #[serde(default, deserialize_with = "string_list")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "year_count")]
    pub required_experience_years: u32,
    #[serde(default, deserialize_with = "education_level")]
    pub required_education_level: u8,
    #[serde(default, deserialize_with = "language_list")]
    pub required_languages: Vec<String>,
}

/// LLMs return languages either as "English (fluent)" or as
/// `{"language": "English", "level": "fluent"}`.
fn language_label(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) => {
            let language = map
                .get("language")
                .or_else(|| map.get("name"))
                .and_then(Value::as_str)?
                .to_string();
            match map.get("level").and_then(Value::as_str).map(str::trim) {
                Some(level) if !level.is_empty() => Some(format!("{language} ({level})")),
                _ => Some(language),
            }
        }
        _ => None,
    }
}

/// Reads a whole number out of ints, floats and numeric strings.
/// Fractions are floored, negatives become 0, anything else is 0.
fn lenient_u32(value: &Value) -> u32 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => n.floor().clamp(0.0, u32::MAX as f64) as u32,
        _ => 0,
    }
}

pub(crate) fn items(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Strings and numbers become text; anything else is `None`.
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numbers and numeric strings ("45000", " 52.5 "); anything else is `None`.
pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

fn year_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(|v| lenient_u32(&v))
        .unwrap_or(0))
}

fn education_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let level = year_count(deserializer)?;
    Ok(level.min(MAX_EDUCATION_LEVEL as u32) as u8)
}

/// Keeps the string items of a list; `null`s and other values are skipped.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(items(Option::<Value>::deserialize(deserializer)?)
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

fn language_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(items(Option::<Value>::deserialize(deserializer)?)
        .into_iter()
        .filter_map(language_label)
        .collect())
}

/// Keeps the list items that deserialize as `T`.
fn record_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(items(Option::<Value>::deserialize(deserializer)?)
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
