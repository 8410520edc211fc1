//! Typed client for the four draft-service operations.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{
        DocumentKey, DraftRequest, DraftResult, PrefillSuggestion, PromotionOutcome,
        RefinementOutcome,
    },
    protocol::{
        GenerateRequest, GenerateResponse, PrefillRequest, PrefillResponse, PromoteRequest,
        PromoteResponse, RefineRequest, RefineResponse,
    },
};
use tracing::{debug, warn};

use crate::{config::ApiSettings, error::DraftError};

/// Remote operations a draft session depends on. Each call is one round trip
/// with no retries.
#[async_trait]
pub trait DraftApi: Send + Sync {
    async fn prefill(&self, document_key: &DocumentKey) -> Result<PrefillSuggestion, DraftError>;
    async fn generate(&self, request: &DraftRequest) -> Result<DraftResult, DraftError>;
    async fn refine(
        &self,
        document_key: &DocumentKey,
        xml_content: &str,
        feedback: &str,
    ) -> Result<RefinementOutcome, DraftError>;
    async fn promote(
        &self,
        document_key: &DocumentKey,
        draft_path: &str,
    ) -> Result<PromotionOutcome, DraftError>;
}

pub struct HttpDraftApi {
    http: Client,
    api_base: String,
}

impl HttpDraftApi {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(settings.api_base.clone())
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, DraftError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "draft service responded");

        let text = response.text().await?;
        if !status.is_success() {
            return Err(DraftError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl DraftApi for HttpDraftApi {
    async fn prefill(&self, document_key: &DocumentKey) -> Result<PrefillSuggestion, DraftError> {
        let response: PrefillResponse = self
            .post_json(
                "/prefill",
                &PrefillRequest {
                    dm_key: document_key.clone(),
                },
            )
            .await?;
        Ok(response.into())
    }

    async fn generate(&self, request: &DraftRequest) -> Result<DraftResult, DraftError> {
        let response: GenerateResponse = self
            .post_json("/generate", &GenerateRequest::from(request))
            .await?;
        Ok(response.into())
    }

    async fn refine(
        &self,
        document_key: &DocumentKey,
        xml_content: &str,
        feedback: &str,
    ) -> Result<RefinementOutcome, DraftError> {
        let response: RefineResponse = self
            .post_json(
                "/refine",
                &RefineRequest {
                    dm_key: document_key.clone(),
                    xml_content: xml_content.to_string(),
                    feedback: feedback.to_string(),
                },
            )
            .await?;
        Ok(response.into())
    }

    async fn promote(
        &self,
        document_key: &DocumentKey,
        draft_path: &str,
    ) -> Result<PromotionOutcome, DraftError> {
        let url = self.endpoint("/promote");
        let response = self
            .http
            .post(&url)
            .json(&PromoteRequest {
                dm_key: document_key.clone(),
                draft_path: draft_path.to_string(),
            })
            .send()
            .await?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "draft service responded");

        let text = response.text().await?;
        interpret_promotion(status, text)
    }
}

/// Promotion does not reject on status: any reply body that decodes is a
/// promotion, with or without a `path`. Only an undecodable body fails.
fn interpret_promotion(status: StatusCode, text: String) -> Result<PromotionOutcome, DraftError> {
    let PromoteResponse { path } = serde_json::from_str::<PromoteResponse>(&text)?;
    if !status.is_success() {
        warn!(
            status = status.as_u16(),
            path = path.as_deref().unwrap_or_default(),
            "promotion reply carried a non-success status"
        );
    }
    Ok(PromotionOutcome { path })
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
