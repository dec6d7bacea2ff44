//! Windowing of a fragment stream into logical turns.
//!
//! A plain fragment closes its own window. Once a fragment carries a tool call, the window stays
//! open until a fragment finishes with `tool_calls`, so split argument fragments end up in one
//! turn.
//!
//! ```rust
//! use sfprovider::{ChatCompletionChunk, ChunkChoice, Message, segment_fragments};
//!
//! let plain = ChatCompletionChunk {
//!     choices: vec![ChunkChoice {
//!         delta: Message::assistant("hi"),
//!         ..ChunkChoice::default()
//!     }],
//!     ..ChatCompletionChunk::default()
//! };
//!
//! let turns = segment_fragments(vec![plain.clone(), plain]).expect("segment");
//! assert_eq!(turns.len(), 2);
//! ```

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    ChatCompletionChunk, FragmentStream, LogicalTurn, ProviderError, TurnStream, merge,
};

/// Explicit windowing accumulator; scoped to one request's fragment stream.
#[derive(Debug, Clone, Default)]
pub struct TurnSegmenter {
    window: Option<ChatCompletionChunk>,
    inside_tool: bool,
}

impl TurnSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_inside_tool(&self) -> bool {
        self.inside_tool
    }

    pub fn has_open_window(&self) -> bool {
        self.window.is_some()
    }

    /// Folds one fragment into the open window and returns the turn if the window closed.
    pub fn push(
        &mut self,
        fragment: ChatCompletionChunk,
    ) -> Result<Option<LogicalTurn>, ProviderError> {
        if fragment.has_tool_call_delta() {
            self.inside_tool = true;
        }

        let closes = if self.inside_tool {
            let finished = fragment.is_tool_call_finish();
            if finished {
                self.inside_tool = false;
            }
            finished
        } else {
            true
        };

        let merged = merge(self.window.as_ref(), fragment)?;
        if closes {
            self.window = None;
            Ok(Some(merged))
        } else {
            self.window = Some(merged);
            Ok(None)
        }
    }

    /// Flushes a window left open when the source ended.
    pub fn finish(&mut self) -> Option<LogicalTurn> {
        self.inside_tool = false;
        self.window.take()
    }
}

/// Lazily segments `fragments`; transport errors pass through and end the stream.
pub fn segment_turns<'a>(fragments: FragmentStream<'a>) -> TurnStream<'a> {
    let stream = try_stream! {
        let mut fragments = fragments;
        let mut segmenter = TurnSegmenter::new();

        while let Some(fragment) = fragments.next().await {
            if let Some(turn) = segmenter.push(fragment?)? {
                yield turn;
            }
        }

        if let Some(turn) = segmenter.finish() {
            yield turn;
        }
    };

    Box::pin(stream)
}

/// Segments an already collected fragment list.
pub fn segment_fragments(
    fragments: Vec<ChatCompletionChunk>,
) -> Result<Vec<LogicalTurn>, ProviderError> {
    let mut segmenter = TurnSegmenter::new();
    let mut turns = Vec::new();

    for fragment in fragments {
        if let Some(turn) = segmenter.push(fragment)? {
            turns.push(turn);
        }
    }

    turns.extend(segmenter.finish());
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::{
        ChunkChoice, FinishReason, Message, ProviderErrorKind, ToolCallRequest, VecFragmentStream,
    };

    fn text(content: &str, finish_reason: Option<FinishReason>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: Some("turn-1".to_string()),
            choices: vec![ChunkChoice {
                index: Some(0),
                delta: Message::assistant(content),
                finish_reason,
            }],
            ..ChatCompletionChunk::default()
        }
    }

    fn call(call: ToolCallRequest, finish_reason: Option<FinishReason>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: Some("turn-2".to_string()),
            choices: vec![ChunkChoice {
                index: Some(0),
                delta: Message {
                    tool_calls: Some(vec![call]),
                    ..Message::default()
                },
                finish_reason,
            }],
            ..ChatCompletionChunk::default()
        }
    }

    #[test]
    fn plain_fragments_each_close_a_window() {
        let mut segmenter = TurnSegmenter::new();

        let first = segmenter.push(text("a", None)).expect("push");
        let second = segmenter.push(text("b", Some(FinishReason::Stop))).expect("push");

        let first = first.expect("first window should close");
        assert_eq!(first.delta().map(Message::text), Some("a"));
        assert!(second.is_some());
        assert!(!segmenter.has_open_window());
    }

    #[test]
    fn tool_run_stays_open_until_tool_calls_finish() {
        let mut segmenter = TurnSegmenter::new();

        let opened = segmenter
            .push(call(ToolCallRequest::function("t1", "lookup", "{\"q\":"), None))
            .expect("push");
        assert!(opened.is_none());
        assert!(segmenter.is_inside_tool());

        let closed = segmenter
            .push(call(
                ToolCallRequest::continuation("\"x\"}"),
                Some(FinishReason::ToolCalls),
            ))
            .expect("push")
            .expect("window should close");

        assert!(!segmenter.is_inside_tool());
        assert!(closed.is_tool_call_finish());
        let calls = closed.delta().expect("delta").tool_calls();
        assert_eq!(calls[0].function.arguments(), "{\"q\":\"x\"}");
    }

    #[test]
    fn window_count_matches_plain_fragments_plus_tool_runs() {
        let fragments = vec![
            text("Let me ", None),
            text("check.", None),
            call(ToolCallRequest::function("a", "first", "{"), None),
            call(ToolCallRequest::continuation("}"), None),
            call(
                ToolCallRequest::function("b", "second", "{}"),
                Some(FinishReason::ToolCalls),
            ),
            text("done", Some(FinishReason::Stop)),
        ];

        let turns = segment_fragments(fragments).expect("segment");
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].delta().expect("delta").tool_calls().len(), 2);
    }

    #[test]
    fn open_window_is_flushed_when_source_ends() {
        let turns = segment_fragments(vec![call(
            ToolCallRequest::function("t1", "lookup", "{"),
            None,
        )])
        .expect("segment");

        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].delta().expect("delta").tool_calls().len(), 1);
    }

    #[tokio::test]
    async fn segment_turns_streams_turns_in_order() {
        let fragments: FragmentStream<'static> = Box::pin(VecFragmentStream::new(vec![
            Ok(text("hello", None)),
            Ok(call(ToolCallRequest::function("t1", "lookup", "{}"), None)),
            Ok(call(ToolCallRequest::continuation(""), Some(FinishReason::ToolCalls))),
        ]));

        let turns = segment_turns(fragments).collect::<Vec<_>>().await;
        assert_eq!(turns.len(), 2);
        let first = turns[0].as_ref().expect("first turn");
        assert_eq!(first.delta().map(Message::text), Some("hello"));
        let second = turns[1].as_ref().expect("second turn");
        assert!(second.has_tool_call_delta());
    }

    #[tokio::test]
    async fn segment_turns_propagates_transport_errors() {
        let fragments: FragmentStream<'static> = Box::pin(VecFragmentStream::new(vec![
            Ok(text("partial", None)),
            Err(ProviderError::transport("connection reset")),
        ]));

        let turns = segment_turns(fragments).collect::<Vec<_>>().await;
        assert_eq!(turns.len(), 2);
        assert!(turns[0].is_ok());
        let error = turns[1].as_ref().expect_err("error should surface");
        assert_eq!(error.kind, ProviderErrorKind::Transport);
    }
}
