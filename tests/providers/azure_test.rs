//! Azure OpenAI provider tests.

use std::time::Duration;

use serde_json::json;
use salesreq::providers::azure::{deployment_url, AzureOpenAiProvider};
use salesreq::providers::{CompletionRequest, LlmProvider, Message, ProviderError};

use crate::stub_server::{request_json, serve_once};

#[test]
fn deployment_url_joins_segments_and_version() {
    let url = deployment_url("https://sales.openai.azure.com/", "gpt4o-prod", "2024-02-01")
        .expect("valid endpoint");
    assert_eq!(
        url.as_str(),
        "https://sales.openai.azure.com/openai/deployments/gpt4o-prod/chat/completions?api-version=2024-02-01"
    );
}

#[test]
fn deployment_url_without_trailing_slash() {
    let url = deployment_url("https://sales.openai.azure.com", "d", "v1").expect("valid endpoint");
    assert_eq!(url.path(), "/openai/deployments/d/chat/completions");
    assert_eq!(url.query(), Some("api-version=v1"));
}

#[test]
fn deployment_url_rejects_garbage_endpoint() {
    let err = deployment_url("not a url", "d", "v1").expect_err("invalid");
    assert!(matches!(err, ProviderError::Unavailable(_)));
}

#[test]
fn debug_output_hides_api_key() {
    let provider = AzureOpenAiProvider::new(
        "azure/gpt4o".to_owned(),
        "https://sales.openai.azure.com",
        "gpt4o",
        "2024-02-01",
        "super-secret-key".to_owned(),
        Duration::from_secs(5),
    )
    .expect("client should build");
    let debug = format!("{provider:?}");
    assert!(!debug.contains("super-secret-key"));
    assert!(debug.contains("[REDACTED]"));
    assert_eq!(provider.model_id(), "azure/gpt4o");
}

#[tokio::test]
async fn complete_uses_api_key_header_and_deployment_path() {
    let reply = json!({
        "choices": [{"message": {"content": "Success!"}, "finish_reason": "stop"}],
        "model": "gpt-4o"
    });
    let (base, captured) = serve_once("200 OK", "application/json", &reply.to_string()).await;

    let provider = AzureOpenAiProvider::new(
        "azure/sales".to_owned(),
        &base,
        "sales",
        "2024-02-01",
        "azure-key".to_owned(),
        Duration::from_secs(5),
    )
    .expect("client should build");

    let request = CompletionRequest {
        messages: vec![Message::user("prompt")],
        system: Some("sys".to_owned()),
        max_tokens: Some(64),
    };
    let resp = provider.complete(request).await.expect("completion should succeed");
    assert_eq!(resp.text, "Success!");

    let raw = captured.await.expect("server task");
    assert!(raw.starts_with(
        "POST /openai/deployments/sales/chat/completions?api-version=2024-02-01 "
    ));
    assert!(raw.to_ascii_lowercase().contains("api-key: azure-key"));
    let body = request_json(&raw);
    assert!(body.get("model").is_none());
    assert_eq!(body["max_tokens"], 64);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "prompt");
}
