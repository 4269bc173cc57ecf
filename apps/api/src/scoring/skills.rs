//! Lexical matching for skills and languages.
//!
//! Two terms match when their normalized forms are equal or when either one
//! contains the other. This is intentionally loose: "java" matches
//! "javascript" and "react" matches "react native".

use serde::{Deserialize, Serialize};

/// Outcome of matching a required list against what the candidate has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermMatch {
    /// 0.0 – 1.0
    pub score: f64,
    /// Required terms the candidate covers, as spelled in the offer.
    pub matched: Vec<String>,
    /// Required terms the candidate does not cover.
    pub missing: Vec<String>,
}

impl TermMatch {
    fn full() -> Self {
        Self {
            score: 1.0,
            matched: vec![],
            missing: vec![],
        }
    }
}

/// Lowercases, trims and drops `-` / `_` so "Node-JS" and "node_js" compare equal.
pub fn normalize(term: &str) -> String {
    term.trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect()
}

/// Scores how many required skills the candidate covers.
pub fn match_skills(candidate: &[String], required: &[String]) -> TermMatch {
    match_terms(candidate, required, |s| s.as_str())
}

/// Same strategy as skills, applied to the language name only
/// ("English (C1)" and "english fluent" both reduce to "english").
pub fn match_languages(candidate: &[String], required: &[String]) -> TermMatch {
    match_terms(candidate, required, language_name)
}

fn language_name(label: &String) -> &str {
    label
        .split(|c: char| c.is_whitespace() || c == '(' || c == ',' || c == ':')
        .find(|part| !part.is_empty())
        .unwrap_or("")
}

fn match_terms<F>(candidate: &[String], required: &[String], key: F) -> TermMatch
where
    F: Fn(&String) -> &str,
{
    // One entry per distinct normalized requirement; blank entries carry no requirement.
    let mut wanted: Vec<(String, &String)> = Vec::with_capacity(required.len());
    for term in required {
        let norm = normalize(key(term));
        if !norm.is_empty() && !wanted.iter().any(|(n, _)| *n == norm) {
            wanted.push((norm, term));
        }
    }

    if wanted.is_empty() {
        return TermMatch::full();
    }

    let have: Vec<String> = candidate
        .iter()
        .map(|t| normalize(key(t)))
        .filter(|n| !n.is_empty())
        .collect();

    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for (norm, spelling) in &wanted {
        let found = have
            .iter()
            .any(|h| h == norm || h.contains(norm.as_str()) || norm.contains(h.as_str()));
        if found {
            matched.push((*spelling).clone());
        } else {
            missing.push((*spelling).clone());
        }
    }

    TermMatch {
        score: matched.len() as f64 / wanted.len() as f64,
        matched,
        missing,
    }
}
