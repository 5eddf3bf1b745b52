//! Provider factory tests.

use std::collections::BTreeMap;

use salesreq::config::ModelConfig;
use salesreq::credentials::Credentials;
use salesreq::providers::factory::{build_provider, parse_model_spec, FactoryError};

fn credentials(pairs: &[(&str, &str)]) -> Credentials {
    Credentials::from_map(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn model(spec: &str) -> ModelConfig {
    ModelConfig {
        default: spec.to_owned(),
        ..ModelConfig::default()
    }
}

#[test]
fn parse_model_spec_splits_at_first_slash() {
    let spec = parse_model_spec("ollama/library/llama3:8b").expect("valid");
    assert_eq!(spec.provider, "ollama");
    assert_eq!(spec.model, "library/llama3:8b");
}

#[test]
fn parse_model_spec_rejects_malformed() {
    for bad in ["gpt-4o", "/gpt-4o", "openai/", ""] {
        assert!(
            matches!(parse_model_spec(bad), Err(FactoryError::InvalidModelSpec { .. })),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn builds_openai_with_key() {
    let provider = build_provider(&model("openai/gpt-4o"), &credentials(&[("OPENAI_API_KEY", "k")]))
        .expect("should build");
    assert_eq!(provider.model_id(), "openai/gpt-4o");
}

#[test]
fn openai_without_key_is_missing_credential() {
    let err = build_provider(&model("openai/gpt-4o"), &credentials(&[])).expect_err("no key");
    assert!(matches!(
        err,
        FactoryError::MissingCredential { ref key, .. } if key == "OPENAI_API_KEY"
    ));
}

#[test]
fn blank_key_counts_as_missing() {
    let err = build_provider(&model("openai/gpt-4o"), &credentials(&[("OPENAI_API_KEY", "  ")]))
        .expect_err("blank key");
    assert!(matches!(err, FactoryError::MissingCredential { .. }));
}

#[test]
fn azure_requires_endpoint_and_key() {
    let creds = credentials(&[("AZURE_OPENAI_API_KEY", "k")]);
    let err = build_provider(&model("azure/gpt4o"), &creds).expect_err("no endpoint");
    assert!(matches!(
        err,
        FactoryError::MissingCredential { ref key, .. } if key == "AZURE_OPENAI_ENDPOINT"
    ));

    let mut cfg = model("azure/gpt4o");
    cfg.azure_endpoint = Some("https://res.openai.azure.com".to_owned());
    let err = build_provider(&cfg, &credentials(&[])).expect_err("no key");
    assert!(matches!(
        err,
        FactoryError::MissingCredential { ref key, .. } if key == "AZURE_OPENAI_API_KEY"
    ));

    let provider = build_provider(&cfg, &creds).expect("should build");
    assert_eq!(provider.model_id(), "azure/gpt4o");
}

#[test]
fn ollama_needs_no_credentials() {
    let provider =
        build_provider(&model("ollama/llama3"), &credentials(&[])).expect("should build");
    assert_eq!(provider.model_id(), "ollama/llama3");
}

#[test]
fn unknown_provider_is_rejected() {
    let err = build_provider(&model("weaviate/rag"), &credentials(&[])).expect_err("unknown");
    assert!(matches!(
        err,
        FactoryError::UnsupportedProvider { ref provider } if provider == "weaviate"
    ));
}
