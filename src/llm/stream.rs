// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Streaming response handling
//!
//! Folds provider events into the final reply text and usage. The
//! accumulator is kept separate from the stream so it can be fed by hand in
//! tests.

use futures::StreamExt;

use crate::error::{ApiError, GgError, Result};
use crate::llm::provider::{EventStream, StreamEvent, Usage};

/// Reply assembled from a stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedReply {
    pub text: String,
    pub usage: Usage,
}

/// Accumulator for streaming response content
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    reply: CollectedReply,
    stopped: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one event, returning the text delta to display, if any
    pub fn process_event(&mut self, event: StreamEvent) -> Result<Option<String>> {
        match event {
            StreamEvent::TextDelta { text } => {
                self.reply.text.push_str(&text);
                Ok(Some(text))
            }
            StreamEvent::Usage(usage) => {
                self.reply.usage.merge(usage);
                Ok(None)
            }
            StreamEvent::MessageStop => {
                self.stopped = true;
                Ok(None)
            }
            StreamEvent::Error {
                error_type,
                message,
            } => Err(GgError::Api(ApiError::StreamError(format!(
                "{}: {}",
                error_type, message
            )))),
        }
    }

    /// Whether a stop event was seen
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn finish(self) -> CollectedReply {
        self.reply
    }
}

/// Drain a provider stream, calling `on_text` for every text delta.
pub async fn collect_stream<F>(mut stream: EventStream, mut on_text: F) -> Result<CollectedReply>
where
    F: FnMut(&str),
{
    let mut acc = StreamAccumulator::new();

    while let Some(event) = stream.next().await {
        if let Some(text) = acc.process_event(event?)? {
            on_text(&text);
        }
    }

    if !acc.is_stopped() {
        tracing::debug!("stream ended without a stop event");
    }

    Ok(acc.finish())
}
