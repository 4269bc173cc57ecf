// Shared prompt fragments. Each feature that calls the LLM keeps its own
// prompts.rs next to it and pulls the cross-cutting pieces from here.

/// Appended to every system prompt that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps the model from filling gaps with plausible-sounding facts.
pub const NO_INVENTION_INSTRUCTION: &str = "Use ONLY information present in the input. \
    If a field is not stated, use null, 0 or an empty list. Never guess.";

/// Builds a system prompt from a role description plus the JSON-only rule.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_INSTRUCTION}")
}
