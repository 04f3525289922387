// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Ollama local LLM provider implementation
//!
//! Talks to a local Ollama server over `/api/chat`. Streaming responses are
//! newline-delimited JSON objects, the last one carrying `done: true` and the
//! token counts.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::common::{server_error, split_records, status_error};
use crate::error::{ApiError, GgError, Result};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, EventStream, LlmProvider, ModelPricing, StreamEvent,
    Usage,
};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const NOT_RUNNING: &str = "Ollama is not running. Start the Ollama app or run 'ollama serve'";

/// Ollama provider
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaProvider {
    /// Create a provider for the default local server
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_OLLAMA_URL)
    }

    /// Create with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn build_request(&self, request: &CompletionRequest, stream: bool) -> OllamaRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(OllamaMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        OllamaRequest {
            model: request.model.clone(),
            messages,
            stream,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }

    async fn send(&self, body: &OllamaRequest) -> Result<reqwest::Response> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    GgError::Api(ApiError::Network(NOT_RUNNING.to_string()))
                } else {
                    GgError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error(status, &body));
        }

        Ok(response)
    }
}

/// Parse an error response
fn parse_error(status: u16, body: &str) -> GgError {
    if let Ok(error_response) = serde_json::from_str::<OllamaError>(body) {
        let message = error_response.error;
        if message.contains("model") && message.contains("not found") {
            GgError::Api(ApiError::ModelNotFound(message))
        } else {
            server_error(status, message)
        }
    } else {
        status_error(status, None).unwrap_or_else(|| server_error(status, body))
    }
}

/// Parse one NDJSON line of a streaming response
fn parse_stream_line(line: &str) -> Vec<StreamEvent> {
    if line.trim().is_empty() {
        return Vec::new();
    }

    let chunk: OllamaResponse = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!("skipping unparseable ollama chunk: {}", e);
            return Vec::new();
        }
    };

    if let Some(error) = chunk.error {
        return vec![StreamEvent::Error {
            error_type: "ollama_error".to_string(),
            message: error,
        }];
    }

    let mut events = Vec::new();
    if let Some(message) = chunk.message.filter(|m| !m.content.is_empty()) {
        events.push(StreamEvent::TextDelta {
            text: message.content,
        });
    }
    if chunk.done {
        events.push(StreamEvent::Usage(Usage {
            input_tokens: chunk.prompt_eval_count.unwrap_or(0),
            output_tokens: chunk.eval_count.unwrap_or(0),
        }));
        events.push(StreamEvent::MessageStop);
    }
    events
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn pricing(&self, _model: &str) -> ModelPricing {
        ModelPricing::FREE
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request, false);
        let response = self.send(&body).await?;
        let api_response: OllamaResponse = response.json().await?;

        if let Some(error) = api_response.error {
            return Err(server_error(200, error));
        }

        Ok(CompletionResponse {
            model: request.model,
            text: api_response.message.map(|m| m.content).unwrap_or_default(),
            usage: Usage {
                input_tokens: api_response.prompt_eval_count.unwrap_or(0),
                output_tokens: api_response.eval_count.unwrap_or(0),
            },
        })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<EventStream> {
        let body = self.build_request(&request, true);
        let response = self.send(&body).await?;
        Ok(split_records(response, "\n", parse_stream_line))
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}
