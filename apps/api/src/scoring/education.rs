use crate::scoring::profile::EducationEntry;

/// Keyword lists per level, highest first. A degree takes the first level whose
/// keywords it contains, so "bac+2" is never read as a plain baccalaureate.
const LEVEL_KEYWORDS: [(u8, &[&str]); 5] = [
    (5, &["doctorat", "doctorate", "phd", "ph.d", "thèse", "thesis"]),
    (
        4,
        &["master", "msc", "m.sc", "mba", "m2", "m1", "ingénieur", "engineering degree"],
    ),
    (3, &["licence", "bachelor", "bsc", "b.sc", "l3"]),
    (2, &["dut", "bts", "deug", "bac+2", "associate"]),
    (1, &["baccalauréat", "baccalaureate", "bac", "high school"]),
];

/// Maps a single degree string to 0 (unknown) .. 5 (doctorate).
pub fn degree_level(degree: &str) -> u8 {
    let degree = degree.to_lowercase();
    LEVEL_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| degree.contains(k)))
        .map(|(level, _)| *level)
        .unwrap_or(0)
}

/// Highest level across all education entries.
pub fn education_level(education: &[EducationEntry]) -> u8 {
    education
        .iter()
        .map(|e| degree_level(&e.degree))
        .max()
        .unwrap_or(0)
}

pub fn score_education(candidate_level: u8, required_level: u8) -> f64 {
    if required_level == 0 || candidate_level >= required_level {
        return 1.0;
    }
    match required_level - candidate_level {
        1 => 0.7,
        2 => 0.4,
        _ => 0.2,
    }
}
