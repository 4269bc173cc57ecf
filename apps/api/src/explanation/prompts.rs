// Explanation prompts. Both views are fed the same facts; only the audience
// and the output schema differ.

use crate::explanation::ExplanationContext;

pub const RECRUITER_ROLE: &str = "You are an expert HR consultant. \
    You analyse how well a resume matches a job offer and give recruiters a clear recommendation.";

pub const CANDIDATE_ROLE: &str = "You are a supportive career coach. \
    You explain to a candidate why their profile does or does not fit a job offer.";

/// Replace every `{placeholder}` with `render_recruiter_prompt`.
pub const RECRUITER_PROMPT_TEMPLATE: &str = r#"MATCH SCORE: {final_score}%
SYSTEM RECOMMENDATION: {recommendation}

MATCH DETAILS:
- Semantic similarity: {semantic}%
- Technical skills: {skills_score}%
  - Matched skills: {skills_matched}
  - Missing skills: {skills_missing}
- Experience: {experience_score}%
  - Candidate: {candidate_years} years
  - Required: {required_years} years
- Education: {education_score}%
- Languages: {languages_score}%
  - Matched languages: {languages_matched}
  - Missing languages: {languages_missing}

POSITION: {job_title}

Your task:
1. List 3-5 STRENGTHS of the candidate (skills, experience, education).
2. List 2-4 WEAKNESSES or critical gaps.
3. Give a clear VERDICT: "HIRE" (score above 80%), "INTERVIEW" (50-80%) or "REJECT" (below 50%).
4. Write a SUMMARY of 2-3 sentences.

Be factual, professional and direct. Rely only on the data above.

Return a JSON object with EXACTLY this schema:
{
  "verdict": "HIRE" | "INTERVIEW" | "REJECT",
  "strengths": ["..."],
  "weaknesses": ["..."],
  "summary": "..."
}"#;

/// Replace every `{placeholder}` with `render_candidate_prompt`.
pub const CANDIDATE_PROMPT_TEMPLATE: &str = r#"MATCH SCORE: {final_score}%
RECOMMENDATION: {recommendation}

MATCH DETAILS:
- Matched skills: {skills_matched}
- Missing skills: {skills_missing}
- Experience: {candidate_years} years (required: {required_years} years)
- Matched languages: {languages_matched}
- Missing languages: {languages_missing}

TARGET POSITION: {job_title}

Your task:
1. Write a MAIN MESSAGE: encouraging for a good score, constructive for a low one.
2. List the SKILLS that count in the candidate's favour.
3. List the IMPROVEMENT AREAS (missing skills, insufficient experience, ...).
4. Give 2-3 CONCRETE, actionable pieces of advice.

Stay positive even when the score is low and avoid heavy jargon.

Return a JSON object with EXACTLY this schema:
{
  "message": "...",
  "valued_skills": ["..."],
  "improvement_areas": ["..."],
  "advice": ["..."]
}"#;

pub fn render_recruiter_prompt(ctx: &ExplanationContext<'_>) -> String {
    let details = ctx.details;
    RECRUITER_PROMPT_TEMPLATE
        .replace("{final_score}", &ctx.final_score.to_string())
        .replace("{recommendation}", ctx.recommendation.as_str())
        .replace("{semantic}", &details.semantic_similarity.to_string())
        .replace("{skills_score}", &details.skills.score.to_string())
        .replace("{skills_matched}", &join_or(&details.skills.matched, "None"))
        .replace("{skills_missing}", &join_or(&details.skills.missing, "None"))
        .replace("{experience_score}", &details.experience.score.to_string())
        .replace("{candidate_years}", &details.experience.candidate_years.to_string())
        .replace("{required_years}", &details.experience.required_years.to_string())
        .replace("{education_score}", &details.education.score.to_string())
        .replace("{languages_score}", &details.languages.score.to_string())
        .replace("{languages_matched}", &join_or(&details.languages.matched, "None"))
        .replace("{languages_missing}", &join_or(&details.languages.missing, "None"))
        .replace("{job_title}", ctx.job_title)
}

pub fn render_candidate_prompt(ctx: &ExplanationContext<'_>) -> String {
    let details = ctx.details;
    CANDIDATE_PROMPT_TEMPLATE
        .replace("{final_score}", &ctx.final_score.to_string())
        .replace("{recommendation}", ctx.recommendation.as_str())
        .replace(
            "{skills_matched}",
            &join_or(&details.skills.matched, "No technical skill identified"),
        )
        .replace("{skills_missing}", &join_or(&details.skills.missing, "None"))
        .replace("{candidate_years}", &details.experience.candidate_years.to_string())
        .replace("{required_years}", &details.experience.required_years.to_string())
        .replace(
            "{languages_matched}",
            &join_or(&details.languages.matched, "Not specified"),
        )
        .replace("{languages_missing}", &join_or(&details.languages.missing, "None"))
        .replace("{job_title}", ctx.job_title)
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}
