use serde::{Deserialize, Serialize};

/// Result of an LLM-backed step that must always produce a value.
///
/// When the model call fails the caller substitutes a canned value, and the
/// failure reason travels with it instead of being swallowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Generated<T> {
    Generated { value: T },
    Fallback { value: T, reason: String },
}

impl<T> Generated<T> {
    pub fn generated(value: T) -> Self {
        Generated::Generated { value }
    }

    pub fn fallback(value: T, reason: impl ToString) -> Self {
        Generated::Fallback {
            value,
            reason: reason.to_string(),
        }
    }

    /// Runs `result`, falling back to `fallback()` on error.
    pub fn or_fallback<E: std::fmt::Display>(
        result: Result<T, E>,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match result {
            Ok(value) => Generated::generated(value),
            Err(e) => Generated::fallback(fallback(), e),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Generated::Generated { value } | Generated::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Generated::Generated { value } | Generated::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generated::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Generated::Fallback { reason, .. } => Some(reason),
            Generated::Generated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_fallback_keeps_reason() {
        let outcome = Generated::or_fallback(Err::<u32, _>("boom"), || 7);
        assert!(outcome.is_fallback());
        assert_eq!(*outcome.value(), 7);
        assert_eq!(outcome.reason(), Some("boom"));
    }

    #[test]
    fn test_or_fallback_success() {
        let outcome = Generated::or_fallback(Ok::<u32, String>(3), || 7);
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.into_value(), 3);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Generated::fallback(1, "llm down")).unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["value"], 1);
        assert_eq!(json["reason"], "llm down");

        let json = serde_json::to_value(Generated::generated("ok")).unwrap();
        assert_eq!(json["source"], "generated");
        assert!(json.get("reason").is_none());
    }
}
