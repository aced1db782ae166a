//! # SSE Parser
//!
//! Line parser for `data:`-framed streaming responses.
//!
//! Both backends stream over HTTP with `data: <json>` lines. The parser:
//! - Buffers incoming bytes across chunk boundaries
//! - Extracts the `data:` payload from each line
//! - Skips comments, blank lines, empty data, and the `[DONE]` sentinel
//! - Flushes a final unterminated line when the body ends

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tracing::warn;

use crate::error::HttpError;

/// Parses SSE lines from a byte stream and yields raw data payloads.
///
/// A read error is yielded once and then ends the stream.
pub fn parse_sse_lines<S>(byte_stream: S) -> impl Stream<Item = Result<String, HttpError>> + Send
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + Unpin + 'static,
{
    futures::stream::unfold(
        (byte_stream, BytesMut::with_capacity(8192), false),
        |(mut stream, mut buffer, done)| async move {
            if done {
                return None;
            }

            loop {
                if let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let mut line_bytes = buffer.split_to(newline_pos + 1);
                    line_bytes.truncate(line_bytes.len() - 1);
                    if line_bytes.last() == Some(&b'\r') {
                        line_bytes.truncate(line_bytes.len() - 1);
                    }

                    let Ok(line) = std::str::from_utf8(&line_bytes) else {
                        warn!(len = line_bytes.len(), "Skipping non-UTF-8 stream line");
                        continue;
                    };

                    if let Some(data) = extract_sse_data(line) {
                        return Some((Ok(data), (stream, buffer, false)));
                    }
                    continue;
                }

                match stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        warn!(error = %e, "SSE stream read error");
                        return Some((Err(HttpError::Request(e)), (stream, buffer, true)));
                    }
                    None => {
                        let data = match std::str::from_utf8(&buffer) {
                            Ok(line) => extract_sse_data(line),
                            Err(_) => {
                                warn!(len = buffer.len(), "Skipping non-UTF-8 stream line");
                                None
                            }
                        };
                        buffer.clear();
                        return data.map(|data| (Ok(data), (stream, buffer, true)));
                    }
                }
            }
        },
    )
}

/// Extracts the data payload from an SSE line.
///
/// Returns `None` for comments, blank lines, `[DONE]`, and empty data.
fn extract_sse_data(line: &str) -> Option<String> {
    let trimmed = line.trim();

    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }

    let data = trimmed
        .strip_prefix("data: ")
        .or_else(|| trimmed.strip_prefix("data:"))?
        .trim();

    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    Some(data.to_string())
}

/// Parses JSON from an SSE payload, logging and discarding malformed events.
pub fn parse_sse_data<T: serde::de::DeserializeOwned>(data: &str, backend: &str) -> Option<T> {
    match serde_json::from_str(data) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            let preview: String = data.chars().take(100).collect();
            warn!(
                backend,
                error = %e,
                data_preview = %preview,
                "Skipping malformed stream event"
            );
            None
        }
    }
}
