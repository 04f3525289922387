// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Anthropic Claude API provider implementation
//!
//! Implements the LlmProvider trait for Claude models.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::common::{parse_retry_after_seconds, server_error, split_records, status_error};
use crate::error::{ApiError, GgError, Result};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, EventStream, LlmProvider, ModelPricing, StreamEvent,
    Usage,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, ANTHROPIC_API_URL)
    }

    /// Create with a custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// Build the request body
    fn build_request(&self, request: &CompletionRequest, stream: bool) -> AnthropicRequest {
        AnthropicRequest {
            model: request.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            system: request.system.clone(),
            max_tokens: request.max_tokens,
            temperature: Some(request.temperature),
            stream,
        }
    }

    async fn send(&self, body: &AnthropicRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after = parse_retry_after_seconds(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error(status, &body, retry_after));
        }

        Ok(response)
    }
}

/// Parse an error response
fn parse_error(status: u16, body: &str, retry_after: Option<u64>) -> GgError {
    if let Ok(error_response) = serde_json::from_str::<AnthropicError>(body) {
        match error_response.error.error_type.as_str() {
            "authentication_error" | "permission_error" => {
                GgError::Api(ApiError::AuthenticationFailed)
            }
            "rate_limit_error" => GgError::Api(ApiError::RateLimited(
                retry_after.unwrap_or(10) as u32,
            )),
            "not_found_error" => GgError::Api(ApiError::ModelNotFound(error_response.error.message)),
            _ => server_error(status, error_response.error.message),
        }
    } else {
        status_error(status, retry_after).unwrap_or_else(|| server_error(status, body))
    }
}

/// Claude pricing per million tokens
fn claude_pricing(model: &str) -> ModelPricing {
    if model.contains("opus") {
        ModelPricing::new(15.0, 75.0)
    } else if model.contains("haiku") {
        ModelPricing::new(0.80, 4.0)
    } else {
        ModelPricing::new(3.0, 15.0)
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn pricing(&self, model: &str) -> ModelPricing {
        claude_pricing(model)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request, false);
        let response = self.send(&body).await?;
        let api_response: AnthropicResponse = response.json().await?;

        let text = api_response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionResponse {
            model: api_response.model,
            text,
            usage: Usage {
                input_tokens: api_response.usage.input_tokens,
                output_tokens: api_response.usage.output_tokens,
            },
        })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<EventStream> {
        let body = self.build_request(&request, true);
        let response = self.send(&body).await?;

        Ok(split_records(response, "\n\n", |record| {
            parse_sse_event(record).into_iter().collect()
        }))
    }
}

/// Parse a Server-Sent Event
fn parse_sse_event(event_str: &str) -> Option<StreamEvent> {
    let mut event_type = None;
    let mut data = None;

    for line in event_str.lines() {
        if let Some(rest) = line.strip_prefix("event:") {
            event_type = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data = Some(rest.trim().to_string());
        }
    }

    let event_type = event_type?;
    let parsed: serde_json::Value = serde_json::from_str(&data?).ok()?;

    match event_type.as_str() {
        "message_start" => {
            let input_tokens = parsed["message"]["usage"]["input_tokens"].as_u64()?;
            Some(StreamEvent::Usage(Usage {
                input_tokens,
                output_tokens: 0,
            }))
        }
        "content_block_delta" => {
            let delta = &parsed["delta"];
            if delta["type"].as_str()? != "text_delta" {
                return None;
            }
            Some(StreamEvent::TextDelta {
                text: delta["text"].as_str()?.to_string(),
            })
        }
        "message_delta" => {
            let output_tokens = parsed["usage"]["output_tokens"].as_u64()?;
            Some(StreamEvent::Usage(Usage {
                input_tokens: 0,
                output_tokens,
            }))
        }
        "message_stop" => Some(StreamEvent::MessageStop),
        "error" => Some(StreamEvent::Error {
            error_type: parsed["error"]["type"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            message: parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        }),
        _ => None,
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::stream::collect_stream;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_provider_new() {
        let provider = AnthropicProvider::new("test-key");
        assert_eq!(provider.api_key, "test-key");
        assert_eq!(provider.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_provider_with_base_url_trims_slash() {
        let provider = AnthropicProvider::with_base_url("k", "http://localhost:9000/");
        assert_eq!(provider.messages_url(), "http://localhost:9000/v1/messages");
    }

    #[test]
    fn test_build_request_single_user_turn() {
        let provider = AnthropicProvider::new("k");
        let request = CompletionRequest::new("claude-sonnet-4-5-20250929", "write hello")
            .with_system("sys")
            .with_max_tokens(512);
        let body = serde_json::to_value(provider.build_request(&request, true)).unwrap();

        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "write hello");
        assert_eq!(body["system"], "sys");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_pricing() {
        let provider = AnthropicProvider::new("k");
        assert_eq!(
            provider.pricing("claude-sonnet-4-5-20250929"),
            ModelPricing::new(3.0, 15.0)
        );
        assert_eq!(provider.pricing("claude-3-opus"), ModelPricing::new(15.0, 75.0));
    }

    #[test]
    fn test_parse_sse_message_start_usage() {
        let event = parse_sse_event(
            "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"m\",\"usage\":{\"input_tokens\":42,\"output_tokens\":1}}}",
        );
        assert_eq!(
            event,
            Some(StreamEvent::Usage(Usage {
                input_tokens: 42,
                output_tokens: 0
            }))
        );
    }

    #[test]
    fn test_parse_sse_text_delta() {
        let event = parse_sse_event(
            "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}",
        );
        assert_eq!(
            event,
            Some(StreamEvent::TextDelta {
                text: "Hi".to_string()
            })
        );
    }

    #[test]
    fn test_parse_sse_ignores_ping_and_json_delta() {
        assert!(parse_sse_event("event: ping\ndata: {}").is_none());
        assert!(parse_sse_event(
            "event: content_block_delta\ndata: {\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\"}}"
        )
        .is_none());
        assert!(parse_sse_event("data: {}").is_none());
    }

    #[test]
    fn test_parse_sse_error() {
        let event = parse_sse_event(
            "event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}",
        );
        assert_eq!(
            event,
            Some(StreamEvent::Error {
                error_type: "overloaded_error".to_string(),
                message: "Overloaded".to_string()
            })
        );
    }

    #[test]
    fn test_parse_error_types() {
        let auth = r#"{"type":"error","error":{"type":"authentication_error","message":"bad key"}}"#;
        assert!(matches!(
            parse_error(401, auth, None),
            GgError::Api(ApiError::AuthenticationFailed)
        ));

        let rate = r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow"}}"#;
        assert!(matches!(
            parse_error(429, rate, Some(7)),
            GgError::Api(ApiError::RateLimited(7))
        ));

        let missing = r#"{"type":"error","error":{"type":"not_found_error","message":"model: x"}}"#;
        assert!(matches!(
            parse_error(404, missing, None),
            GgError::Api(ApiError::ModelNotFound(_))
        ));

        match parse_error(502, "bad gateway", None) {
            GgError::Api(ApiError::ServerError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "model": "claude-sonnet-4-5-20250929",
                "content": [{"type": "text", "text": "Hello"}, {"type": "text", "text": " there"}],
                "usage": {"input_tokens": 10, "output_tokens": 3}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::with_base_url("test-key", server.uri());
        let response = provider
            .complete(CompletionRequest::new("claude-sonnet-4-5-20250929", "hi"))
            .await
            .unwrap();

        assert_eq!(response.text, "Hello there");
        assert_eq!(response.usage.input_tokens, 10);
        assert_eq!(response.usage.output_tokens, 3);
    }

    #[tokio::test]
    async fn test_stream_against_mock_server() {
        let sse = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{\"usage\":{\"input_tokens\":25}}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"lo\"}}\n\n",
            "event: message_delta\n",
            "data: {\"type\":\"message_delta\",\"usage\":{\"output_tokens\":5}}\n\n",
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
            .mount(&server)
            .await;

        let provider = AnthropicProvider::with_base_url("k", server.uri());
        let stream = provider
            .complete_stream(CompletionRequest::new("claude", "hi"))
            .await
            .unwrap();
        let mut seen = String::new();
        let collected = collect_stream(stream, |t| seen.push_str(t)).await.unwrap();

        assert_eq!(collected.text, "Hello");
        assert_eq!(seen, "Hello");
        assert_eq!(collected.usage.input_tokens, 25);
        assert_eq!(collected.usage.output_tokens, 5);
    }

    #[tokio::test]
    async fn test_auth_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::with_base_url("bad", server.uri());
        let err = provider
            .complete(CompletionRequest::new("claude", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, GgError::Api(ApiError::AuthenticationFailed)));
    }
}
