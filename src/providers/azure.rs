//! Azure OpenAI provider.
//!
//! Azure serves the chat-completions schema from a per-deployment URL:
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={v}`
//! and authenticates with an `api-key` header instead of a bearer token.

use std::time::Duration;

use url::Url;

use super::openai::{build_request, parse_response};
use super::{
    check_http_response, http_client, CompletionRequest, CompletionResponse, LlmProvider,
    ProviderError,
};

/// API version used when none is configured.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

/// Azure OpenAI deployment client.
#[derive(Clone)]
pub struct AzureOpenAiProvider {
    model_spec: String,
    url: Url,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AzureOpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiProvider")
            .field("model_spec", &self.model_spec)
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AzureOpenAiProvider {
    /// Create a client for `deployment` under the resource `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unavailable` if the endpoint is not a valid
    /// base URL, or `ProviderError::Request` if the HTTP client cannot be built.
    pub fn new(
        model_spec: String,
        endpoint: &str,
        deployment: &str,
        api_version: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            model_spec,
            url: deployment_url(endpoint, deployment, api_version)?,
            api_key,
            client: http_client(timeout)?,
        })
    }
}

/// Build the chat-completions URL for a deployment.
///
/// # Errors
///
/// Returns `ProviderError::Unavailable` when the endpoint cannot be parsed or
/// cannot carry path segments.
pub fn deployment_url(
    endpoint: &str,
    deployment: &str,
    api_version: &str,
) -> Result<Url, ProviderError> {
    let mut url = Url::parse(endpoint).map_err(|e| {
        ProviderError::Unavailable(format!("invalid Azure endpoint {endpoint:?}: {e}"))
    })?;

    url.path_segments_mut()
        .map_err(|()| {
            ProviderError::Unavailable(format!("Azure endpoint {endpoint:?} cannot be a base URL"))
        })?
        .pop_if_empty()
        .extend(["openai", "deployments", deployment, "chat", "completions"]);
    url.query_pairs_mut()
        .clear()
        .append_pair("api-version", api_version);

    Ok(url)
}

#[async_trait::async_trait]
impl LlmProvider for AzureOpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = build_request(None, &request);

        let response = self
            .client
            .post(self.url.clone())
            .header("content-type", "application/json")
            .header("api-key", &self.api_key)
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
