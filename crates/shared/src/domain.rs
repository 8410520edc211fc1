use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DocumentKeyError {
    #[error("document key is missing")]
    Missing,
    #[error("document key is blank")]
    Blank,
}

/// Trimmed, non-empty identifier of the document unit being drafted (the
/// page's `dmKey`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn parse(raw: &str) -> Result<Self, DocumentKeyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DocumentKeyError::Blank);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_optional(raw: Option<&str>) -> Result<Self, DocumentKeyError> {
        raw.ok_or(DocumentKeyError::Missing).and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentKey {
    type Error = DocumentKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentKey> for String {
    fn from(value: DocumentKey) -> Self {
        value.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operator-editable free text. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftForm {
    pub objective: String,
    pub constraints: String,
    pub seed_outline: String,
    pub safety_focus: String,
}

impl DraftForm {
    pub fn apply_suggestion(&mut self, suggestion: PrefillSuggestion) {
        self.objective = suggestion.objective;
        self.constraints = suggestion.constraints;
        self.seed_outline = suggestion.seed_outline;
        self.safety_focus = suggestion.safety_focus;
    }
}

/// Immutable snapshot of one generate submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRequest {
    pub document_key: DocumentKey,
    pub objective: String,
    pub constraints: String,
    pub seed_outline: String,
    pub safety_focus: String,
}

impl DraftRequest {
    pub fn new(document_key: DocumentKey, form: &DraftForm) -> Self {
        Self {
            document_key,
            objective: form.objective.clone(),
            constraints: form.constraints.clone(),
            seed_outline: form.seed_outline.clone(),
            safety_focus: form.safety_focus.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefillSuggestion {
    pub objective: String,
    pub constraints: String,
    pub seed_outline: String,
    pub safety_focus: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftResult {
    /// Full document serialization.
    pub xml: String,
    /// Suggested download name.
    pub filename: String,
    /// Server-side handle used for promotion.
    pub draft_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementOutcome {
    /// Replacement for the content region only.
    pub xml: String,
    pub improvements: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionOutcome {
    /// Final repository location, when the server reported one.
    pub path: Option<String>,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
