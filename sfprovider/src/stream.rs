//! Fragment and turn stream contracts plus an in-memory stream utility.
//!
//! ```rust
//! use sfprovider::{ChatCompletionChunk, FragmentStream, VecFragmentStream};
//!
//! let stream = VecFragmentStream::new(vec![Ok(ChatCompletionChunk::default())]);
//! let _boxed: FragmentStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{ChatCompletionChunk, LogicalTurn, ProviderError};

/// Raw fragments in arrival order. Once `None` is yielded, no further items follow.
pub type FragmentStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, ProviderError>> + Send + 'a>>;

/// Merged logical turns in the order their windows closed.
pub type TurnStream<'a> =
    Pin<Box<dyn Stream<Item = Result<LogicalTurn, ProviderError>> + Send + 'a>>;

#[derive(Debug)]
pub struct VecFragmentStream {
    fragments: VecDeque<Result<ChatCompletionChunk, ProviderError>>,
}

impl VecFragmentStream {
    pub fn new(fragments: Vec<Result<ChatCompletionChunk, ProviderError>>) -> Self {
        Self {
            fragments: fragments.into(),
        }
    }
}

impl Stream for VecFragmentStream {
    type Item = Result<ChatCompletionChunk, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<ChatCompletionChunk, ProviderError>>> {
        Poll::Ready(self.fragments.pop_front())
    }
}
