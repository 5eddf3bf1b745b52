//! Chat surface behavior driven by in-memory input.

use std::sync::Arc;

use salesreq::config::SessionSettings;
use salesreq::elicit::{ChecklistTemplate, SessionState};
use salesreq::providers::LlmProvider;
use salesreq::repl::{Input, Repl, BANNER};

use crate::scripted::{ScriptedProvider, Step};

const TEMPLATE: &str = "Check the request.\n\nUser Request:\n\"\"\"\n\"\"\"\n";

fn template() -> Arc<ChecklistTemplate> {
    Arc::new(ChecklistTemplate::parse(TEMPLATE).expect("valid template"))
}

fn repl(provider: &Arc<ScriptedProvider>) -> Repl<Vec<u8>> {
    let provider: Arc<dyn LlmProvider> = Arc::clone(provider) as Arc<dyn LlmProvider>;
    Repl::new(
        provider,
        template(),
        SessionSettings::default(),
        256,
        Vec::new(),
    )
}

fn output(repl: Repl<Vec<u8>>) -> String {
    String::from_utf8(repl.into_writer()).expect("utf-8 output")
}

#[test]
fn parse_classifies_lines() {
    assert_eq!(Input::parse("   "), Input::Blank);
    assert_eq!(Input::parse("/quit"), Input::Quit);
    assert_eq!(Input::parse(" /exit \n"), Input::Quit);
    assert_eq!(Input::parse("/reset"), Input::Reset);
    assert_eq!(Input::parse("/transcript"), Input::Transcript);
    assert_eq!(
        Input::parse("  Acme wants a CRM  "),
        Input::Text("  Acme wants a CRM  ".to_owned())
    );
    assert_eq!(Input::parse("/unknown"), Input::Text("/unknown".to_owned()));
}

#[tokio::test]
async fn prints_banner_response_and_follow_up() {
    let provider = Arc::new(ScriptedProvider::replies(&["Thanks. What is the budget?"]));
    let mut chat = repl(&provider);

    let session = chat
        .run("Acme wants a CRM\n".as_bytes())
        .await
        .expect("run should succeed");
    assert_eq!(session.state(), SessionState::Collecting);
    assert_eq!(session.turns(), 1);

    let out = output(chat);
    assert!(out.starts_with(BANNER));
    assert!(out.contains("assistant> Thanks. What is the budget?\nassistant> What is the budget?\n"));
}

#[tokio::test]
async fn stops_reading_once_satisfied() {
    let provider = Arc::new(ScriptedProvider::replies(&[
        "Who is the customer?",
        "Success!",
    ]));
    let mut chat = repl(&provider);

    let session = chat
        .run("CRM rollout\nAcme\nthis line is never sent\n".as_bytes())
        .await
        .expect("run should succeed");

    assert_eq!(session.state(), SessionState::Satisfied);
    assert_eq!(provider.requests().len(), 2);
    assert!(output(chat).contains("All required information has been collected."));
}

#[tokio::test]
async fn completion_errors_are_reported_and_the_loop_continues() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Step::Fail(429),
        Step::Reply("Success!"),
    ]));
    let mut chat = repl(&provider);

    let session = chat
        .run("first try\nsecond try\n".as_bytes())
        .await
        .expect("run should succeed");

    assert_eq!(session.state(), SessionState::Satisfied);
    assert_eq!(session.accumulated_request(), "first try\nsecond try\n");
    assert!(output(chat).contains("error [CompletionServiceError]: "));
}

#[tokio::test]
async fn blank_lines_are_not_submitted() {
    let provider = Arc::new(ScriptedProvider::replies(&["Which region?"]));
    let mut chat = repl(&provider);

    let session = chat
        .run("\n   \nhello\n\n".as_bytes())
        .await
        .expect("run should succeed");

    assert_eq!(session.turns(), 1);
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn text_turns_are_submitted_as_typed() {
    let provider = Arc::new(ScriptedProvider::replies(&["Which region?"]));
    let mut chat = repl(&provider);

    let session = chat
        .run("  Acme wants\ta CRM  \n".as_bytes())
        .await
        .expect("run should succeed");

    assert_eq!(session.accumulated_request(), "  Acme wants\ta CRM  \n");
    assert!(provider.prompt(0).contains("  Acme wants\ta CRM  \n"));
}

#[tokio::test]
async fn missing_follow_up_prints_hint() {
    let provider = Arc::new(ScriptedProvider::replies(&["Noted."]));
    let mut chat = repl(&provider);

    chat.run("hello\n".as_bytes()).await.expect("run should succeed");
    assert!(output(chat).contains("no follow-up question detected"));
}

#[tokio::test]
async fn reset_starts_a_fresh_request() {
    let provider = Arc::new(ScriptedProvider::replies(&["What else?", "And the budget?"]));
    let mut chat = repl(&provider);

    let session = chat
        .run("first request\n/reset\nsecond request\n".as_bytes())
        .await
        .expect("run should succeed");

    assert_eq!(session.accumulated_request(), "second request\n");
    let second_prompt = provider.prompt(1);
    assert!(second_prompt.contains("second request"));
    assert!(!second_prompt.contains("first request"));
    assert!(output(chat).contains("(started a new request)"));
}

#[tokio::test]
async fn transcript_command_replays_visible_messages() {
    let provider = Arc::new(ScriptedProvider::replies(&["Got it. Who is the buyer?"]));
    let mut chat = repl(&provider);

    chat.run("hello\n/transcript\n".as_bytes())
        .await
        .expect("run should succeed");

    let out = output(chat);
    assert!(out.contains("user> hello\n"));
    assert!(!out.contains("system> "));
}

#[tokio::test]
async fn quit_stops_without_calling_the_model() {
    let provider = Arc::new(ScriptedProvider::replies(&[]));
    let mut chat = repl(&provider);

    let session = chat
        .run("/quit\nnever sent\n".as_bytes())
        .await
        .expect("run should succeed");
    assert_eq!(session.turns(), 0);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn transcript_file_written_when_session_ends() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("transcript.json");
    let provider = Arc::new(ScriptedProvider::replies(&["Success!"]));
    let mut chat = repl(&provider).with_transcript_path(Some(path.clone()));

    let session = chat
        .run("everything at once\n".as_bytes())
        .await
        .expect("run should succeed");

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("transcript written"))
            .expect("valid json");
    assert_eq!(saved["session_id"], session.id().to_string());
    assert_eq!(saved["state"], "satisfied");
    assert!(saved["messages"].as_array().is_some_and(|m| m.len() == 3));
}

#[tokio::test]
async fn transcript_file_skipped_without_turns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("transcript.json");
    let provider = Arc::new(ScriptedProvider::replies(&[]));
    let mut chat = repl(&provider).with_transcript_path(Some(path.clone()));

    chat.run("/quit\n".as_bytes()).await.expect("run should succeed");
    assert!(!path.exists());
}
