// Extraction prompt templates. Placeholders are replaced with `str::replace`.

pub const CV_PARSE_ROLE: &str = "You are an expert resume analyst. \
    Extract every piece of information from a resume into structured JSON.";

/// Replace `{cv_text}` before sending.
pub const CV_PARSE_PROMPT: &str = r#"Extract ALL information from the resume below.

Return a JSON object with EXACTLY this schema:
{
  "name": "Full name" | null,
  "email": "email address" | null,
  "phone": "phone number with country code" | null,
  "skills": ["every skill mentioned: languages, frameworks, tools, soft skills"],
  "experiences": [
    {
      "title": "job title",
      "company": "company name" | null,
      "period": "period as written, e.g. 2019 - 2023 or 3 years",
      "description": "responsibilities and achievements"
    }
  ],
  "education": [
    {"degree": "degree name as written", "institution": "school" | null, "year": "year" | null}
  ],
  "languages": ["language with level if stated, e.g. English (C1)"]
}

RULES:
1. Be exhaustive: list every skill, every experience and every degree.
2. Keep periods exactly as written so durations can be computed later.
3. Missing information is null or an empty list.

{no_invention}

RESUME:
{cv_text}"#;

pub const OFFER_PARSE_ROLE: &str = "You are an expert job posting analyst. \
    Extract the requirements of a job offer into structured JSON.";

/// Replace `{offer_text}` before sending.
pub const OFFER_PARSE_PROMPT: &str = r#"Extract ALL information from the job offer below.

Return a JSON object with EXACTLY this schema:
{
  "title": "job title",
  "description": "full description",
  "required_skills": ["technical skills: languages, frameworks, tools"],
  "required_experience_years": 0,
  "required_education_level": 0,
  "required_languages": [{"language": "English", "level": "fluent" | null}],
  "missions": "main missions" | null,
  "location": "work location" | null,
  "contract_type": "permanent, fixed-term, internship, ..." | null,
  "salary_min": number | null,
  "salary_max": number | null
}

EDUCATION LEVEL SCALE (integer):
- 0: no specific degree
- 1: high-school diploma / baccalaureate
- 2: two-year degree (associate, BTS, DUT)
- 3: bachelor
- 4: master / engineering degree
- 5: doctorate

required_experience_years is an integer; use 0 when not stated.

{no_invention}

JOB OFFER:
{offer_text}"#;
