//! JSON bodies exchanged with the draft generation service.

use serde::{Deserialize, Serialize};

use crate::domain::{
    DocumentKey, DraftRequest, DraftResult, PrefillSuggestion, PromotionOutcome,
    RefinementOutcome,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefillRequest {
    #[serde(rename = "dmKey")]
    pub dm_key: DocumentKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefillResponse {
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub seed_outline: String,
    #[serde(default)]
    pub safety_focus: String,
}

impl From<PrefillResponse> for PrefillSuggestion {
    fn from(value: PrefillResponse) -> Self {
        Self {
            objective: value.objective,
            constraints: value.constraints,
            seed_outline: value.seed_outline,
            safety_focus: value.safety_focus,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "dmKey")]
    pub dm_key: DocumentKey,
    pub objective: String,
    pub constraints: String,
    pub seed_outline: String,
    pub safety_focus: String,
}

impl From<&DraftRequest> for GenerateRequest {
    fn from(value: &DraftRequest) -> Self {
        Self {
            dm_key: value.document_key.clone(),
            objective: value.objective.clone(),
            constraints: value.constraints.clone(),
            seed_outline: value.seed_outline.clone(),
            safety_focus: value.safety_focus.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub xml: String,
    pub filename: String,
    pub draft_path: String,
}

impl From<GenerateResponse> for DraftResult {
    fn from(value: GenerateResponse) -> Self {
        Self {
            xml: value.xml,
            filename: value.filename,
            draft_path: value.draft_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineRequest {
    #[serde(rename = "dmKey")]
    pub dm_key: DocumentKey,
    pub xml_content: String,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineResponse {
    pub xml: String,
    #[serde(default)]
    pub improvements: String,
}

impl From<RefineResponse> for RefinementOutcome {
    fn from(value: RefineResponse) -> Self {
        Self {
            xml: value.xml,
            improvements: value.improvements,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteRequest {
    #[serde(rename = "dmKey")]
    pub dm_key: DocumentKey,
    pub draft_path: String,
}

/// Only `path` is read; replies without it still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromoteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<PromoteResponse> for PromotionOutcome {
    fn from(value: PromoteResponse) -> Self {
        Self { path: value.path }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
