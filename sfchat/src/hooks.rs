//! Lifecycle hooks for the tool-calling conversation loop.
//!
//! ```rust
//! use sfchat::{ChatLoopHooks, NoopChatLoopHooks};
//!
//! fn accepts_hooks(_hooks: &dyn ChatLoopHooks) {}
//!
//! accepts_hooks(&NoopChatLoopHooks);
//! ```

use std::time::Duration;

use sfcommon::RequestId;

use crate::ChatError;

pub trait ChatLoopHooks: Send + Sync {
    /// A model round is about to be submitted. Rounds are one-based.
    fn on_round_start(&self, _request_id: &RequestId, _round: u32, _stream: bool) {}

    fn on_tool_dispatch(&self, _request_id: &RequestId, _round: u32, _tool_calls: usize) {}

    fn on_loop_complete(&self, _request_id: &RequestId, _rounds: u32, _elapsed: Duration) {}

    fn on_loop_failure(&self, _request_id: &RequestId, _error: &ChatError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatLoopHooks;

impl ChatLoopHooks for NoopChatLoopHooks {}
