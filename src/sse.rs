//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! `streamGenerateContent?alt=sse` answers with frames of the form
//! `data: <GenerateContentResponse JSON>` separated by blank lines.  This
//! module turns the raw response body into a stream of parsed frames.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::client::error_for_status;
use crate::observability::{STREAM_BYTES, STREAM_ERRORS, STREAM_EVENTS};
use crate::types::GenerateContentResponse;
use crate::{Error, Result};

/// Process a stream of bytes into a stream of response frames.
///
/// Frames may be split across network chunks at any byte, including inside
/// a multi-byte character or between the `\r` and `\n` of a CRLF.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let state = SseState {
        buffer: String::new(),
        pending: Vec::new(),
    };

    stream::unfold((stream, state), |(mut stream, mut state)| async move {
        loop {
            // First check if we have a complete event in the buffer
            while let Some((event_text, remaining)) = extract_event(&state.buffer) {
                state.buffer = remaining;
                if let Some(event) = parse_event(&event_text) {
                    return Some((event, (stream, state)));
                }
            }

            // Read more data
            match stream.next().await {
                Some(Ok(bytes)) => {
                    STREAM_BYTES.count(bytes.len() as u64);
                    if let Err(e) = state.push_bytes(&bytes) {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, state)));
                    }
                }
                Some(Err(e)) => {
                    STREAM_ERRORS.click();
                    return Some((Err(e), (stream, state)));
                }
                None => {
                    // End of stream; a final frame may lack its trailing blank line.
                    let tail = std::mem::take(&mut state.buffer);
                    if !state.pending.is_empty() {
                        state.pending.clear();
                        STREAM_ERRORS.click();
                        return Some((
                            Err(Error::encoding("stream ended inside a UTF-8 sequence", None)),
                            (stream, state),
                        ));
                    }
                    if let Some(event) = parse_event(&tail) {
                        return Some((event, (stream, state)));
                    }
                    return None;
                }
            }
        }
    })
}

struct SseState {
    buffer: String,
    pending: Vec<u8>,
}

impl SseState {
    /// Appends decoded text, holding back an incomplete trailing UTF-8 sequence.
    fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                self.pending.clear();
                return Err(Error::encoding(
                    format!("Invalid UTF-8 in stream: {e}"),
                    Some(Box::new(e)),
                ));
            }
        };
        let rest = self.pending.split_off(valid);
        let text = std::str::from_utf8(&self.pending)?;
        self.buffer.push_str(text);
        self.pending = rest;
        if self.buffer.contains("\r\n") {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }
        Ok(())
    }
}

/// Split the first complete event off the buffer.
fn extract_event(buffer: &str) -> Option<(String, String)> {
    let (event_text, rest) = buffer.split_once("\n\n")?;
    Some((event_text.to_string(), rest.to_string()))
}

/// Parse the data lines of one event.
///
/// Returns `None` for events with no data (comments, keep-alives).
fn parse_event(event_text: &str) -> Option<Result<GenerateContentResponse>> {
    let data: Vec<&str> = event_text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    if data.is_empty() {
        return None;
    }
    let data = data.join("\n");
    if data.trim().is_empty() {
        return None;
    }
    STREAM_EVENTS.click();

    let frame = match serde_json::from_str::<GenerateContentResponse>(&data) {
        Ok(frame) => frame,
        Err(e) => {
            STREAM_ERRORS.click();
            return Some(Err(Error::serialization(
                format!("Failed to parse event JSON: {e}"),
                Some(Box::new(e)),
            )));
        }
    };

    if let Some(error) = &frame.error {
        STREAM_ERRORS.click();
        return Some(Err(error_for_status(
            error.code.unwrap_or(500),
            error.status.clone(),
            error
                .message
                .clone()
                .unwrap_or_else(|| "error reported inside stream".to_string()),
            None,
        )));
    }

    if let Some(reason) = frame.block_reason() {
        STREAM_ERRORS.click();
        return Some(Err(Error::blocked(reason)));
    }

    Some(Ok(frame))
}
