use std::sync::LazyLock;

use regex::Regex;

use crate::scoring::profile::ExperienceEntry;

/// Years credited per experience entry when no period could be parsed at all.
pub const FALLBACK_YEARS_PER_ENTRY: u32 = 2;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("valid year regex"));

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}(?:[.,]\d+)?)\s*\+?\s*(?:years?|yrs?|ans?\b|ann[ée]es?)")
        .expect("valid duration regex")
});

/// Estimates total years of experience from free-text periods.
///
/// Per entry, a year range ("2019 - 2023", "Jan 2020 to Mar 2022") and an explicit
/// duration ("3 years", "1.5 ans", floored) are both counted. If nothing parses in
/// any entry, each entry counts for [`FALLBACK_YEARS_PER_ENTRY`].
pub fn extract_years(experiences: &[ExperienceEntry]) -> u32 {
    if experiences.is_empty() {
        return 0;
    }

    let total: u32 = experiences
        .iter()
        .map(|e| years_in_period(&e.period))
        .sum();

    if total == 0 {
        experiences.len() as u32 * FALLBACK_YEARS_PER_ENTRY
    } else {
        total
    }
}

fn years_in_period(period: &str) -> u32 {
    let years: Vec<u32> = YEAR_RE
        .captures_iter(period)
        .filter_map(|c| c[1].parse().ok())
        .collect();

    let range = match years.as_slice() {
        [first, .., last] => last.saturating_sub(*first),
        _ => 0,
    };

    let duration = DURATION_RE
        .captures(period)
        .and_then(|c| c[1].replace(',', ".").parse::<f64>().ok())
        .map(|n| n.floor() as u32)
        .unwrap_or(0);

    range + duration
}

/// 1.0 at or above the requirement, 0.8 from 70%, 0.5 from 50%, otherwise the
/// plain ratio with a 0.2 floor. No requirement means full credit.
pub fn score_experience(candidate_years: u32, required_years: u32) -> f64 {
    if required_years == 0 {
        return 1.0;
    }

    let years = candidate_years as f64;
    let required = required_years as f64;

    if years >= required {
        1.0
    } else if years >= required * 0.7 {
        0.8
    } else if years >= required * 0.5 {
        0.5
    } else {
        (years / required).max(0.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(period: &str) -> ExperienceEntry {
        ExperienceEntry {
            period: period.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_year_range() {
        assert_eq!(extract_years(&[entry("2020-2023")]), 3);
        assert_eq!(extract_years(&[entry("Jan 2018 – Dec 2021")]), 3);
    }

    #[test]
    fn test_explicit_duration() {
        assert_eq!(extract_years(&[entry("3 years")]), 3);
        assert_eq!(extract_years(&[entry("5 ans")]), 5);
        assert_eq!(extract_years(&[entry("2 années")]), 2);
        assert_eq!(extract_years(&[entry("4+ yrs")]), 4);
    }

    #[test]
    fn test_range_and_duration_in_same_entry_add_up() {
        assert_eq!(extract_years(&[entry("2019 - 2022 (3 years)")]), 6);
    }

    #[test]
    fn test_decimal_durations_are_floored() {
        assert_eq!(extract_years(&[entry("1.5 years")]), 1);
        assert_eq!(extract_years(&[entry("2,5 ans")]), 2);
        // floors to nothing, so the per-entry estimate applies
        assert_eq!(extract_years(&[entry("0.5 year")]), FALLBACK_YEARS_PER_ENTRY);
    }

    #[test]
    fn test_sum_across_entries() {
        let experiences = vec![entry("2015-2018"), entry("2 years"), entry("2018 - 2020")];
        assert_eq!(extract_years(&experiences), 7);
    }

    #[test]
    fn test_reversed_range_counts_zero() {
        let experiences = vec![entry("2023 - 2020"), entry("1 year")];
        assert_eq!(extract_years(&experiences), 1);
    }

    #[test]
    fn test_fallback_when_nothing_parses() {
        let experiences = vec![entry("since forever"), entry(""), entry("2021")];
        assert_eq!(extract_years(&experiences), 6);
    }

    #[test]
    fn test_no_experience_is_zero_years() {
        assert_eq!(extract_years(&[]), 0);
    }

    #[test]
    fn test_no_requirement_is_full_credit() {
        assert_eq!(score_experience(0, 0), 1.0);
        assert_eq!(score_experience(12, 0), 1.0);
    }

    #[test]
    fn test_score_thresholds() {
        assert_eq!(score_experience(5, 5), 1.0);
        assert_eq!(score_experience(8, 5), 1.0);
        assert_eq!(score_experience(7, 10), 0.8);
        assert_eq!(score_experience(5, 10), 0.5);
        assert!((score_experience(4, 10) - 0.4).abs() < f64::EPSILON);
        assert_eq!(score_experience(1, 10), 0.2);
        assert_eq!(score_experience(0, 3), 0.2);
    }
}
