//! Transcript export.

use std::sync::Arc;

use salesreq::elicit::{ChecklistTemplate, ElicitationSession, SessionState};

use crate::scripted::ScriptedProvider;

#[tokio::test]
async fn save_transcript_writes_ordered_json() {
    let template = Arc::new(
        ChecklistTemplate::parse("x {{USER_REQUEST}} y").expect("valid template"),
    );
    let provider = ScriptedProvider::replies(&["Great. Success!"]);
    let mut session = ElicitationSession::start(template).with_system_prompt("sys");
    session
        .submit_user_turn(&provider, "Acme, 50k, May")
        .await
        .expect("turn should succeed");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("transcript.json");
    session.save_transcript(&path).expect("should save");

    let raw = std::fs::read_to_string(&path).expect("read back");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(value["session_id"], session.id().to_string());
    assert_eq!(value["state"], "satisfied");
    assert!(value["exported_at"].is_string());

    let messages = value["messages"].as_array().expect("messages array");
    let roles: Vec<&str> = messages
        .iter()
        .map(|m| m["role"].as_str().expect("role"))
        .collect();
    assert_eq!(roles, vec!["system", "user", "assistant"]);
    assert_eq!(messages[1]["content"], "Acme, 50k, May");
}

#[test]
fn export_of_fresh_transcript_is_empty() {
    let template = Arc::new(ChecklistTemplate::parse("{{USER_REQUEST}}").expect("valid"));
    let session = ElicitationSession::start(template);
    let json = session
        .transcript()
        .export(session.id(), SessionState::Collecting)
        .to_json_pretty()
        .expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["state"], "collecting");
    assert_eq!(value["messages"].as_array().map(Vec::len), Some(0));
}
