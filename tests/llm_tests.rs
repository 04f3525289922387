// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use gg::commands::generate::{files_from_reply, generate};
use gg::config::{Config, GgPaths, Secrets, Settings};
use gg::llm::{CompletionRequest, ProviderFactory};
use gg::usage::{CommandKind, UsageStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, provider: &str) -> Config {
    let mut settings = Settings::default();
    settings.api.provider = provider.to_string();
    settings.api.anthropic_base_url = Some(server.uri());
    settings.api.openai_base_url = Some(server.uri());
    Config {
        settings,
        secrets: Secrets::from_answers("sk-ant-test", "sk-test", "", ""),
        paths: GgPaths::new("/tmp/gg-llm-tests"),
    }
}

#[tokio::test]
async fn test_anthropic_stream_to_files_and_usage() {
    let sse = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"usage\":{\"input_tokens\":40}}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"```rust:src/ok.rs\\n\"}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"pub fn ok() {}\\n```\\n\"}}\n\n",
        "event: message_delta\n",
        "data: {\"type\":\"message_delta\",\"usage\":{\"output_tokens\":12}}\n\n",
        "event: message_stop\n",
        "data: {\"type\":\"message_stop\"}\n\n",
    );
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "anthropic");
    let provider = ProviderFactory::create("anthropic", &config).unwrap();
    let model = ProviderFactory::default_model("anthropic", &config.settings);

    let mut streamed = String::new();
    let reply = generate(
        provider.as_ref(),
        CompletionRequest::new(&model, "add ok"),
        true,
        |t| streamed.push_str(t),
    )
    .await
    .unwrap();

    assert_eq!(streamed, reply.text);
    let files = files_from_reply(&reply.text, None);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "src/ok.rs");
    assert_eq!(files[0].content, "pub fn ok() {}\n");

    let dir = tempfile::tempdir().unwrap();
    let store = UsageStore::new(dir.path().join("stats.json"));
    store.record_command(CommandKind::Ask).unwrap();
    let stats = store
        .record_tokens(&reply.usage, &provider.pricing(&reply.model))
        .unwrap();
    assert_eq!(stats.ask_count, 1);
    assert_eq!(stats.input_tokens, 40);
    assert_eq!(stats.output_tokens, 12);
    assert_eq!(stats.total_tokens, 52);
    assert!(stats.estimated_cost > 0.0);
}

#[tokio::test]
async fn test_openai_complete_through_factory() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "Done."}}],
            "usage": {"prompt_tokens": 9, "completion_tokens": 2}
        })))
        .mount(&server)
        .await;

    let config = config_for(&server, "openai");
    let provider = ProviderFactory::create("openai", &config).unwrap();
    let reply = generate(
        provider.as_ref(),
        CompletionRequest::new("gpt-4o-mini", "hi"),
        false,
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(reply.text, "Done.");
    assert_eq!(reply.usage.input_tokens, 9);
    assert_eq!(reply.usage.output_tokens, 2);
}

#[test]
fn test_unknown_provider_rejected() {
    let config = Config {
        settings: Settings::default(),
        secrets: Secrets::default(),
        paths: GgPaths::new("/tmp/gg-llm-tests"),
    };
    let err = ProviderFactory::create("gemini", &config).err().unwrap();
    assert!(err.to_string().contains("Unknown provider"));
}
