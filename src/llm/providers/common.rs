// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::error::{ApiError, GgError, Result};
use crate::llm::provider::{EventStream, StreamEvent};

/// Parse numeric Retry-After header (seconds).
pub(crate) fn parse_retry_after_seconds(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}

/// Construct a standardized server error.
pub(crate) fn server_error(status: u16, message: impl Into<String>) -> GgError {
    GgError::Api(ApiError::ServerError {
        status,
        message: message.into(),
    })
}

/// Map the status codes every provider shares; `None` means provider-specific.
pub(crate) fn status_error(status: u16, retry_after: Option<u64>) -> Option<GgError> {
    match status {
        401 | 403 => Some(GgError::Api(ApiError::AuthenticationFailed)),
        429 => Some(GgError::Api(ApiError::RateLimited(
            retry_after.unwrap_or(10) as u32,
        ))),
        _ => None,
    }
}

/// Split a response body into records separated by `delimiter` and feed each
/// to `parse`, which may emit any number of events per record.
pub(crate) fn split_records<F>(
    response: reqwest::Response,
    delimiter: &'static str,
    parse: F,
) -> EventStream
where
    F: FnMut(&str) -> Vec<StreamEvent> + Send + 'static,
{
    split_byte_stream(response.bytes_stream(), delimiter, parse)
}

struct RecordReader<S, F> {
    bytes: std::pin::Pin<Box<S>>,
    buffer: Vec<u8>,
    delimiter: &'static [u8],
    parse: F,
    finished: bool,
}

impl<S, F> RecordReader<S, F>
where
    F: FnMut(&str) -> Vec<StreamEvent>,
{
    /// Parse every complete record in the buffer. Records are decoded only once
    /// whole, so multi-byte characters split across chunks survive.
    fn drain(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(pos) = find(&self.buffer, self.delimiter) {
            let record: Vec<u8> = self.buffer.drain(..pos + self.delimiter.len()).collect();
            let text = String::from_utf8_lossy(&record[..pos]);
            events.extend((self.parse)(&*text));
        }
        events
    }

    /// Whatever is left once the body ends is a final record without delimiter.
    fn flush(&mut self) -> Vec<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&rest);
        if text.trim().is_empty() {
            return Vec::new();
        }
        (self.parse)(&*text)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

pub(crate) fn split_byte_stream<S, B, E, F>(
    bytes: S,
    delimiter: &'static str,
    parse: F,
) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]>,
    E: Display,
    F: FnMut(&str) -> Vec<StreamEvent> + Send + 'static,
{
    let reader = RecordReader {
        bytes: Box::pin(bytes),
        buffer: Vec::new(),
        delimiter: delimiter.as_bytes(),
        parse,
        finished: false,
    };

    let event_stream = futures::stream::unfold(reader, |mut reader| async move {
        if reader.finished {
            return None;
        }
        let events: Vec<Result<StreamEvent>> = match reader.bytes.next().await {
            Some(Ok(chunk)) => {
                // CRLF framing is normalized to LF
                reader
                    .buffer
                    .extend(chunk.as_ref().iter().filter(|b| **b != b'\r'));
                reader.drain().into_iter().map(Ok).collect()
            }
            Some(Err(e)) => vec![Err(GgError::Api(ApiError::StreamError(e.to_string())))],
            None => {
                reader.finished = true;
                reader.flush().into_iter().map(Ok).collect()
            }
        };
        Some((events, reader))
    })
    .flat_map(futures::stream::iter);

    Box::pin(event_stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn text_records(chunks: Vec<&'static [u8]>, delimiter: &'static str) -> EventStream {
        let chunks = chunks
            .into_iter()
            .map(Ok::<_, std::io::Error>)
            .collect::<Vec<_>>();
        split_byte_stream(futures::stream::iter(chunks), delimiter, |record| {
            vec![StreamEvent::TextDelta {
                text: record.to_string(),
            }]
        })
    }

    async fn collect_texts(stream: EventStream) -> Vec<String> {
        stream
            .map(|event| match event.unwrap() {
                StreamEvent::TextDelta { text } => text,
                other => panic!("unexpected event: {:?}", other),
            })
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_character_split_across_chunks() {
        let record = "data: {\"t\":\"héllo\"}\n\n".as_bytes();
        let split = record.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let (first, second) = record.split_at(split);

        let texts = collect_texts(text_records(vec![first, second], "\n\n")).await;
        assert_eq!(texts, vec!["data: {\"t\":\"héllo\"}".to_string()]);
    }

    #[tokio::test]
    async fn test_final_record_without_delimiter_is_flushed() {
        let texts = collect_texts(text_records(
            vec![b"{\"a\":1}\n{\"b\"".as_slice(), b":2}".as_slice()],
            "\n",
        ))
        .await;
        assert_eq!(texts, vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]);
    }

    #[tokio::test]
    async fn test_crlf_framing() {
        let body = b"data: x\r\n\r\ndata: y\r\n\r\n".as_slice();
        let texts = collect_texts(text_records(vec![body], "\n\n")).await;
        assert_eq!(texts, vec!["data: x".to_string(), "data: y".to_string()]);
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after_seconds(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after_seconds(&headers), Some(30));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(401, None),
            Some(GgError::Api(ApiError::AuthenticationFailed))
        ));
        assert!(matches!(
            status_error(429, None),
            Some(GgError::Api(ApiError::RateLimited(10)))
        ));
        assert!(matches!(
            status_error(429, Some(3)),
            Some(GgError::Api(ApiError::RateLimited(3)))
        ));
        assert!(status_error(500, None).is_none());
    }
}
