//! Turn orchestration against a scripted model.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use turnkit::agent::{Agent, AgentSessions, TurnState};
use turnkit::error::TurnkitError;
use turnkit::tools::builtin::{dad_joke_tool, DAD_JOKE};
use turnkit::types::{Message, Role};

#[tokio::test]
async fn dad_joke_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "R7UfaahVfFd",
            "joke": "My dog used to chase people on a bike a lot. It got so bad I had to take his bike away.",
            "status": 200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = ScriptedInvoker::new();
    invoker.queue_tool_calls(&[("call_1", DAD_JOKE, "{}")]);
    let registry = registry(vec![dad_joke_tool(Some(server.uri()))]);
    let tools = registry.definitions_for([DAD_JOKE]).unwrap();
    let mut agent = Agent::new(invoker.clone(), registry);

    let history = agent.run_turn("tell me a dad joke", &tools).await.unwrap();

    assert_eq!(history.len(), 3);
    assert_eq!(history[0], Message::user("tell me a dad joke"));
    assert_eq!(history[1].role(), Role::Assistant);
    assert_eq!(history[1].tool_calls()[0].name(), DAD_JOKE);
    assert_eq!(history[2].role(), Role::Tool);
    assert_eq!(history[2].tool_call_id(), Some("call_1"));
    assert_eq!(
        history[2].content(),
        Some("My dog used to chase people on a bike a lot. It got so bad I had to take his bike away.")
    );
    assert_eq!(invoker.calls().len(), 1);
    assert_eq!(invoker.calls()[0].tool_names, [DAD_JOKE]);
}

#[tokio::test]
async fn plain_answer_ends_turn_without_tools() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_text("Hi there!");
    let registry = registry(vec![dad_joke_tool(Some("http://127.0.0.1:9".into()))]);
    let tools = registry.definitions_for([DAD_JOKE]).unwrap();
    let mut agent = Agent::new(invoker.clone(), registry);

    let report = agent.run_turn_detailed("hello", &tools).await.unwrap();

    assert_eq!(report.state, TurnState::FinalAnswer);
    assert_eq!(report.history.len(), 2);
    assert!(matches!(
        report.history[1],
        Message::Assistant {
            content: Some(_),
            tool_calls: None
        }
    ));
    assert_eq!(report.history[1], Message::assistant("Hi there!"));
    assert!(report.history.iter().all(|m| m.role() != Role::Tool));
    assert_eq!(report.answer(), Some("Hi there!"));
    assert_eq!(report.executed_tool, None);
    assert_eq!(invoker.calls()[0].tool_names, [DAD_JOKE]);
}

#[tokio::test]
async fn model_sees_history_including_the_new_user_message() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_text("first");
    invoker.queue_text("second");
    let mut agent = Agent::new(invoker.clone(), registry(vec![]));

    agent.run_turn("one", &[]).await.unwrap();
    agent.run_turn("two", &[]).await.unwrap();

    let calls = invoker.calls();
    assert_eq!(calls[0].history, [Message::user("one")]);
    assert_eq!(
        calls[1].history,
        [
            Message::user("one"),
            Message::assistant("first"),
            Message::user("two"),
        ]
    );
}

#[tokio::test]
async fn history_only_grows_and_keeps_its_prefix() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_text("a");
    invoker.queue_tool_calls(&[("call_1", "weather", "{}")]);
    invoker.queue_text("b");
    let mut agent = Agent::new(
        invoker,
        registry(vec![constant_tool("weather", json!("sunny"))]),
    );

    let mut previous: Vec<Message> = Vec::new();
    for text in ["x", "y", "z"] {
        let history = agent.run_turn(text, &[]).await.unwrap();
        assert!(history.len() > previous.len());
        assert_eq!(&history[..previous.len()], previous.as_slice());
        previous = history;
    }
    assert_eq!(previous.len(), 7);
}

#[tokio::test]
async fn only_the_first_of_several_tool_calls_runs() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_tool_calls(&[
        ("call_a", "first", "{}"),
        ("call_b", "second", "{}"),
    ]);
    let mut agent = Agent::new(
        invoker,
        registry(vec![
            constant_tool("first", json!("one")),
            constant_tool("second", json!("two")),
        ]),
    );

    let report = agent.run_turn_detailed("do both", &[]).await.unwrap();

    assert_eq!(report.state, TurnState::ToolResultRecorded);
    assert_eq!(report.executed_tool.as_deref(), Some("first"));
    assert_eq!(report.ignored_tool_calls, 1);
    let tool_messages: Vec<_> = report
        .history
        .iter()
        .filter(|m| m.role() == Role::Tool)
        .collect();
    assert_eq!(tool_messages.len(), 1);
    assert_eq!(tool_messages[0].tool_call_id(), Some("call_a"));
    assert_eq!(tool_messages[0].content(), Some("one"));
}

#[tokio::test]
async fn every_tool_message_answers_an_earlier_request() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_tool_calls(&[("call_1", "weather", "{}")]);
    invoker.queue_text("It's sunny.");
    invoker.queue_tool_calls(&[("call_2", "weather", "{}")]);
    let mut agent = Agent::new(
        invoker,
        registry(vec![constant_tool("weather", json!({ "sky": "clear" }))]),
    );

    agent.run_turn("weather?", &[]).await.unwrap();
    agent.run_turn("thanks", &[]).await.unwrap();
    let history = agent.run_turn("and now?", &[]).await.unwrap();

    let mut requested = HashSet::new();
    for message in &history {
        for call in message.tool_calls() {
            requested.insert(call.id.clone());
        }
        if let Some(id) = message.tool_call_id() {
            assert!(requested.contains(id), "tool result {id} precedes its request");
        }
    }
    assert_eq!(history.last().and_then(|m| m.content()), Some(r#"{"sky":"clear"}"#));
}

#[tokio::test]
async fn tool_receives_the_triggering_user_message() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_tool_calls(&[("call_1", "echo_user", "")]);
    let mut agent = Agent::new(invoker, registry(vec![echo_user_tool()]));

    let history = agent.run_turn("repeat after me", &[]).await.unwrap();

    assert_eq!(history[2].content(), Some("repeat after me"));
}

#[tokio::test]
async fn unknown_tool_keeps_request_without_result() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_tool_calls(&[("call_1", "nonexistent", "{}")]);
    let mut agent = Agent::new(invoker, registry(vec![]));

    let err = agent.run_turn("do something", &[]).await.unwrap_err();

    assert!(matches!(err, TurnkitError::UnknownTool { ref name } if name == "nonexistent"));
    let store = agent.conversation();
    assert_eq!(store.len(), 2);
    assert_eq!(store.pending_tool_call().map(|c| c.name()), Some("nonexistent"));
    assert!(store.all().iter().all(|m| m.role() != Role::Tool));
}

#[tokio::test]
async fn malformed_arguments_fail_before_the_handler_runs() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_tool_calls(&[("call_1", DAD_JOKE, "{not valid json")]);
    // Unreachable URL: reaching the handler would surface as a handler error.
    let mut agent = Agent::new(
        invoker,
        registry(vec![dad_joke_tool(Some("http://127.0.0.1:9".into()))]),
    );

    let err = agent.run_turn("joke", &[]).await.unwrap_err();

    assert!(matches!(
        err,
        TurnkitError::MalformedArguments { ref tool_name, .. } if tool_name == DAD_JOKE
    ));
    assert_eq!(agent.conversation().len(), 2);
    assert_eq!(agent.conversation().last().map(|m| m.role()), Some(Role::Assistant));
}

#[tokio::test]
async fn handler_failure_surfaces_as_handler_error() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_tool_calls(&[("call_1", "flaky", "{}")]);
    let mut agent = Agent::new(invoker, registry(vec![failing_tool("flaky")]));

    let err = agent.run_turn("try it", &[]).await.unwrap_err();

    assert!(matches!(err, TurnkitError::Handler { ref tool_name, .. } if tool_name == "flaky"));
    assert!(err.is_tool_error());
    assert_eq!(agent.conversation().len(), 2);
}

#[tokio::test]
async fn model_failure_keeps_only_the_user_message() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_error(TurnkitError::RateLimited {
        retry_after_ms: Some(1000),
    });
    let mut agent = Agent::new(invoker.clone(), registry(vec![]));

    let err = agent.run_turn("hello", &[]).await.unwrap_err();

    assert!(err.is_provider_error());
    assert_eq!(agent.conversation().all(), [Message::user("hello")]);
    assert_eq!(invoker.calls().len(), 1, "failed model calls are not retried");
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let invoker = ScriptedInvoker::new();
    invoker.queue_text("hi alice");
    invoker.queue_text("hi bob");
    let sessions = AgentSessions::new(invoker, registry(vec![]));

    let alice = sessions.get_or_create("alice");
    alice.lock().await.run_turn("hello", &[]).await.unwrap();
    let bob = sessions.get_or_create("bob");
    bob.lock().await.run_turn("hey", &[]).await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert!(Arc::ptr_eq(&alice, &sessions.get_or_create("alice")));
    assert_eq!(
        alice.lock().await.conversation().all(),
        [Message::user("hello"), Message::assistant("hi alice")]
    );
    assert_eq!(
        bob.lock().await.conversation().all(),
        [Message::user("hey"), Message::assistant("hi bob")]
    );

    assert!(sessions.remove("alice").is_some());
    assert!(sessions.get("alice").is_none());
    assert_eq!(sessions.session_ids(), ["bob"]);
}

#[tokio::test]
async fn sessions_run_turns_concurrently() {
    // Each model call waits until both sessions are inside one.
    let invoker = EchoInvoker::gated(2);
    let sessions = Arc::new(AgentSessions::new(invoker, registry(vec![])));

    let turn = |id: &'static str, text: &'static str| {
        let sessions = sessions.clone();
        async move {
            let agent = sessions.get_or_create(id);
            let mut agent = agent.lock().await;
            agent.run_turn(text, &[]).await
        }
    };

    let (alice, bob) = tokio::time::timeout(
        Duration::from_secs(5),
        async { tokio::join!(turn("alice", "hello"), turn("bob", "hey")) },
    )
    .await
    .expect("turns in different sessions must not wait on each other");

    assert_eq!(
        alice.unwrap(),
        [Message::user("hello"), Message::assistant("echo: hello")]
    );
    assert_eq!(
        bob.unwrap(),
        [Message::user("hey"), Message::assistant("echo: hey")]
    );
}
