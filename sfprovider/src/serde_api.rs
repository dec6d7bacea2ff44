//! Wire helpers: server-sent event line decoding and error envelope parsing.

use serde::Deserialize;

use crate::{ChatCompletionChunk, ProviderError};

const DATA_PREFIX: &str = "data:";
const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Fragment(ChatCompletionChunk),
    Done,
}

/// Incremental `data:` line decoder.
///
/// Bytes are buffered until a full line is available so multi-byte characters split across
/// network reads decode correctly.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>, ProviderError> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while !self.done {
            let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') else {
                break;
            };

            let line = self.buffer.drain(..=newline).collect::<Vec<u8>>();
            if let Some(event) = decode_line(&line)? {
                if event == SseEvent::Done {
                    self.done = true;
                }
                events.push(event);
            }
        }

        Ok(events)
    }

    /// Decodes a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Result<Option<SseEvent>, ProviderError> {
        if self.done || self.buffer.is_empty() {
            return Ok(None);
        }

        let line = std::mem::take(&mut self.buffer);
        let event = decode_line(&line)?;
        if event == Some(SseEvent::Done) {
            self.done = true;
        }
        Ok(event)
    }
}

fn decode_line(line: &[u8]) -> Result<Option<SseEvent>, ProviderError> {
    let line =
        std::str::from_utf8(line).map_err(|err| ProviderError::malformed_response(err.to_string()))?;
    let line = line.trim();

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };

    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(None);
    }

    if payload == DONE_MARKER {
        return Ok(Some(SseEvent::Done));
    }

    let fragment = serde_json::from_str::<ChatCompletionChunk>(payload)
        .map_err(|err| ProviderError::malformed_response(format!("malformed stream fragment: {err}")))?;
    Ok(Some(SseEvent::Fragment(fragment)))
}

/// Pulls `error.message` out of a JSON error body.
pub fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    const FRAGMENT: &str =
        r#"data: {"id":"turn-1","choices":[{"index":0,"delta":{"role":"assistant","content":"你好"}}]}"#;

    #[test]
    fn decoder_handles_lines_split_across_reads() {
        let mut decoder = SseDecoder::new();
        let line = format!("{FRAGMENT}\n\ndata: [DONE]\n");
        let bytes = line.as_bytes();
        let split = FRAGMENT.find("你").expect("marker") + 1;

        let first = decoder.push(&bytes[..split]).expect("first read");
        assert!(first.is_empty());

        let rest = decoder.push(&bytes[split..]).expect("second read");
        assert_eq!(rest.len(), 2);
        match &rest[0] {
            SseEvent::Fragment(fragment) => {
                assert_eq!(fragment.delta().map(|message| message.text()), Some("你好"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(rest[1], SseEvent::Done);
        assert!(decoder.is_done());
    }

    #[test]
    fn decoder_ignores_comments_and_lines_after_done() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .push(b": keep-alive\nevent: message\ndata: [DONE]\ndata: {broken\n")
            .expect("decode");

        assert_eq!(events, vec![SseEvent::Done]);
        assert_eq!(decoder.finish().expect("finish"), None);
    }

    #[test]
    fn decoder_reports_malformed_payload() {
        let mut decoder = SseDecoder::new();
        let error = decoder.push(b"data: {broken\n").expect_err("must fail");
        assert_eq!(error.kind, ProviderErrorKind::MalformedResponse);
    }

    #[test]
    fn trailing_line_without_newline_is_decoded_on_finish() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [DONE]").expect("push").is_empty());
        assert_eq!(decoder.finish().expect("finish"), Some(SseEvent::Done));
    }

    #[test]
    fn error_envelope_message_is_extracted() {
        let body = r#"{"error":{"message":"invalid api key","type":"auth_error"}}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("invalid api key"));
        assert_eq!(extract_error_message("<html>"), None);
    }
}
