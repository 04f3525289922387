// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock LLM provider for testing
//!
//! Provides a configurable mock implementation of the LlmProvider trait
//! that can be used in unit tests without making real API calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ApiError, GgError, Result};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, EventStream, LlmProvider, ModelPricing, StreamEvent,
    Usage,
};

/// A mock LLM provider for testing
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    responses: Arc<Mutex<Vec<MockResponse>>>,
    call_count: Arc<AtomicUsize>,
    recorded_requests: Arc<Mutex<Vec<CompletionRequest>>>,
    pricing: ModelPricing,
}

/// A pre-configured response for the mock provider
#[derive(Clone, Debug, Default)]
pub enum MockResponse {
    /// Reply text and usage
    Text { text: String, usage: Usage },
    /// Fail the call with a server error
    Error(String),
    #[default]
    Empty,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock provider lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MockProvider {
    /// Create a new mock provider
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: Arc::new(Mutex::new(vec![MockResponse::default()])),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(vec![])),
            pricing: ModelPricing::FREE,
        }
    }

    /// Create a mock provider with a custom name
    pub fn with_name(name: impl Into<String>) -> Self {
        let mut provider = Self::new();
        provider.name = name.into();
        provider
    }

    /// Set the text response
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_usage_response(text, Usage::default())
    }

    /// Set the text response with token usage
    pub fn with_usage_response(self, text: impl Into<String>, usage: Usage) -> Self {
        {
            let mut responses = lock(&self.responses);
            responses.clear();
            responses.push(MockResponse::Text {
                text: text.into(),
                usage,
            });
        }
        self
    }

    /// Make every call fail
    pub fn with_error(self, message: impl Into<String>) -> Self {
        {
            let mut responses = lock(&self.responses);
            responses.clear();
            responses.push(MockResponse::Error(message.into()));
        }
        self
    }

    /// Set the pricing reported for every model
    pub fn with_pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing = pricing;
        self
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.recorded_requests).last().cloned()
    }

    fn next_response(&self, request: &CompletionRequest) -> Result<(String, Usage)> {
        lock(&self.recorded_requests).push(request.clone());
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let responses = lock(&self.responses);
        let response = if responses.is_empty() {
            MockResponse::default()
        } else {
            responses[count.min(responses.len() - 1)].clone()
        };

        match response {
            MockResponse::Text { text, usage } => Ok((text, usage)),
            MockResponse::Error(message) => Err(GgError::Api(ApiError::ServerError {
                status: 500,
                message,
            })),
            MockResponse::Empty => Ok((String::new(), Usage::default())),
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn pricing(&self, _model: &str) -> ModelPricing {
        self.pricing
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let (text, usage) = self.next_response(&request)?;
        Ok(CompletionResponse {
            model: request.model,
            text,
            usage,
        })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<EventStream> {
        let (text, usage) = self.next_response(&request)?;

        // Split into word-sized chunks to exercise incremental handling
        let mut events: Vec<Result<StreamEvent>> = text
            .split_inclusive(' ')
            .map(|chunk| {
                Ok(StreamEvent::TextDelta {
                    text: chunk.to_string(),
                })
            })
            .collect();
        events.push(Ok(StreamEvent::Usage(usage)));
        events.push(Ok(StreamEvent::MessageStop));

        Ok(Box::pin(futures::stream::iter(events)))
    }
}
