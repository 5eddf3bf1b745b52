//! Builds the completion client named by a `<provider>/<model>` spec.

use std::sync::Arc;

use crate::config::ModelConfig;
use crate::credentials::Credentials;

use super::azure::AzureOpenAiProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use super::{LlmProvider, ProviderError};

/// Provider construction errors.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// Model spec is not in `<provider>/<model>` format.
    #[error("invalid model spec '{spec}', expected '<provider>/<model>'")]
    InvalidModelSpec {
        /// Invalid raw spec.
        spec: String,
    },
    /// Unsupported provider prefix.
    #[error("unsupported provider '{provider}' (expected azure, openai or ollama)")]
    UnsupportedProvider {
        /// Unsupported provider prefix.
        provider: String,
    },
    /// Required credential or endpoint missing for the selected provider.
    #[error("missing setting for provider '{provider}': {key}")]
    MissingCredential {
        /// Provider name.
        provider: String,
        /// Missing key.
        key: String,
    },
    /// The client itself could not be built.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// A parsed `<provider>/<model>` spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Provider prefix (`azure`, `openai`, `ollama`).
    pub provider: String,
    /// Model or deployment name; may itself contain `/` or `:`.
    pub model: String,
}

/// Split a model spec at its first `/`.
///
/// # Errors
///
/// Returns [`FactoryError::InvalidModelSpec`] when either side is empty.
pub fn parse_model_spec(spec: &str) -> Result<ModelSpec, FactoryError> {
    match spec.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Ok(ModelSpec {
            provider: provider.to_owned(),
            model: model.to_owned(),
        }),
        _ => Err(FactoryError::InvalidModelSpec {
            spec: spec.to_owned(),
        }),
    }
}

/// Instantiate the provider for `model.default`.
///
/// # Errors
///
/// Returns a [`FactoryError`] for malformed specs, unknown providers,
/// missing API keys or endpoints, and client construction failures.
pub fn build_provider(
    model: &ModelConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn LlmProvider>, FactoryError> {
    let spec = model.default.as_str();
    let parsed = parse_model_spec(spec)?;
    let missing = |key: &str| FactoryError::MissingCredential {
        provider: parsed.provider.clone(),
        key: key.to_owned(),
    };

    let provider: Arc<dyn LlmProvider> = match parsed.provider.as_str() {
        "azure" => {
            let endpoint = model
                .azure_endpoint
                .as_deref()
                .filter(|e| !e.trim().is_empty())
                .ok_or_else(|| missing("AZURE_OPENAI_ENDPOINT"))?;
            let api_key = credentials
                .get("AZURE_OPENAI_API_KEY")
                .ok_or_else(|| missing("AZURE_OPENAI_API_KEY"))?;
            Arc::new(AzureOpenAiProvider::new(
                spec.to_owned(),
                endpoint,
                &parsed.model,
                &model.azure_api_version,
                api_key.to_owned(),
                model.timeout(),
            )?)
        }
        "openai" => {
            let api_key = credentials
                .get("OPENAI_API_KEY")
                .ok_or_else(|| missing("OPENAI_API_KEY"))?;
            Arc::new(OpenAiProvider::new(
                spec.to_owned(),
                parsed.model.clone(),
                &model.openai_base_url,
                api_key.to_owned(),
                model.timeout(),
            )?)
        }
        "ollama" => Arc::new(OllamaProvider::new(
            spec.to_owned(),
            parsed.model.clone(),
            &model.ollama_base_url,
            model.timeout(),
        )?),
        other => {
            return Err(FactoryError::UnsupportedProvider {
                provider: other.to_owned(),
            })
        }
    };

    tracing::debug!(model = %spec, "completion provider ready");
    Ok(provider)
}
