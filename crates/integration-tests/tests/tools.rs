mod harness;

use std::sync::Arc;

use futures_util::StreamExt;
use harness::mock_backend::{Behavior, MockBackend};
use harness::{llm_config, provider_config};
use serde_json::json;
use tandem_config::LlmProviderType;
use tandem_llm::{CompletionOptions, Message, ProviderRegistry, ToolCall};
use tandem_tools::{Dispatcher, Permission, RegistryError, ToolRegistry, register_categories};

fn builtin_registry() -> Arc<ToolRegistry> {
    let registry = Arc::new(ToolRegistry::new());
    register_categories(&registry, &["files", "search", "tasks"]).unwrap();
    registry
}

#[tokio::test]
async fn backend_tool_call_round_trips_through_dispatcher() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "first line\nsecond line\n").unwrap();

    let behavior = Behavior::ToolCall {
        name: "read_file".to_owned(),
        arguments: json!({"path": path.display().to_string()}),
    };
    let mock = MockBackend::start_with("sk-test", behavior).await.unwrap();
    let providers = ProviderRegistry::from_config(&llm_config(vec![(
        "mock",
        provider_config(LlmProviderType::Openai, mock.base_url(), Some("sk-test")),
    )]))
    .unwrap();
    let provider = providers.default_provider().unwrap();

    let tools = builtin_registry();
    let dispatcher = Dispatcher::new(Arc::clone(&tools));
    let options = CompletionOptions::new("mock-model").with_tools(tools.definitions());
    let mut messages = vec![Message::user("What is in notes.txt?")];

    let mut calls: Vec<ToolCall> = Vec::new();
    let mut stream = provider.stream(&messages, &options);
    while let Some(chunk) = stream.next().await {
        calls.extend(chunk.unwrap().tool_calls.unwrap_or_default());
    }
    assert_eq!(calls.len(), 1);

    let results = dispatcher.dispatch_all(&calls).await;
    assert!(!results[0].is_error, "{}", results[0].content);
    assert!(results[0].content.contains("second line"));

    messages.push(Message::assistant_with_tool_calls("", calls.clone()));
    messages.push(results[0].clone().into_message(calls[0].id.clone()));
    let _: Vec<_> = provider.stream(&messages, &options).collect().await;

    let request = mock.last_request().unwrap();
    let sent = request.body["messages"].as_array().unwrap();
    assert_eq!(sent[1]["tool_calls"][0]["id"], "call_mock_1");
    assert!(sent[1]["content"].is_null());
    assert_eq!(sent[2]["role"], "tool");
    assert_eq!(sent[2]["tool_call_id"], "call_mock_1");
    assert!(sent[2]["content"].as_str().unwrap().contains("first line"));
}

#[tokio::test]
async fn unknown_tool_from_backend_becomes_error_result() {
    let dispatcher = Dispatcher::new(builtin_registry());

    let results = dispatcher
        .dispatch_all(&[
            ToolCall::new("c1", "launch_rockets", "{}"),
            ToolCall::new("c2", "todo_read", ""),
        ])
        .await;

    assert!(results[0].is_error);
    assert_eq!(results[0].content, "tool not found: launch_rockets");
    assert!(!results[1].is_error);
    assert_eq!(results[1].content, "no tasks");
}

#[test]
fn categories_load_once_and_classify_permissions() {
    let registry = builtin_registry();
    let count = registry.len();

    register_categories(&registry, &["files"]).unwrap();
    assert_eq!(registry.len(), count);
    assert_eq!(registry.overwrite_count(), 0);

    assert_eq!(registry.permission("write_file").unwrap(), Permission::Unsafe);
    assert_eq!(registry.permission("read_file").unwrap(), Permission::Safe);
    assert!(!registry.contains("run_command"));

    let err = register_categories(&registry, &["shell", "network"]).unwrap_err();
    assert!(matches!(err, RegistryError::UnknownCategory { ref category } if category == "network"));
    assert!(!registry.contains("run_command"));

    registry.reset();
    assert!(registry.is_empty());
    register_categories(&registry, &["shell"]).unwrap();
    assert!(registry.contains("run_command"));
}
