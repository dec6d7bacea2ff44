//! Folding of streamed fragments into one accumulated turn.
//!
//! Only the first choice is folded; StepFun streams a single choice per request.
//!
//! ```rust
//! use sfprovider::{ChatCompletionChunk, ChunkChoice, Message, merge};
//!
//! let fragment = |text: &str| ChatCompletionChunk {
//!     id: Some("turn-1".to_string()),
//!     choices: vec![ChunkChoice {
//!         delta: Message::assistant(text),
//!         ..ChunkChoice::default()
//!     }],
//!     ..ChatCompletionChunk::default()
//! };
//!
//! let seed = merge(None, fragment("Hel")).expect("seed");
//! let turn = merge(Some(&seed), fragment("lo")).expect("merge");
//! assert_eq!(turn.delta().map(Message::text), Some("Hello"));
//! ```

use sfcommon::fresh_id;

use crate::{
    ChatCompletionChunk, ChunkChoice, Message, ProviderError, Role, ToolCallRequest, ToolCallType,
};

/// Folds `current` onto the accumulated `previous` fragment.
///
/// With no previous fragment, `current` becomes the seed. Fails when a fragment carries more
/// than one tool call, since continuation fragments could not be attributed.
pub fn merge(
    previous: Option<&ChatCompletionChunk>,
    current: ChatCompletionChunk,
) -> Result<ChatCompletionChunk, ProviderError> {
    ensure_single_tool_call(&current)?;

    let Some(previous) = previous else {
        return Ok(seed(current));
    };

    let ChatCompletionChunk {
        id,
        object,
        created,
        model,
        request_id,
        choices,
    } = current;

    let choice = match (previous.choices.first(), choices.into_iter().next()) {
        (Some(previous_choice), Some(current_choice)) => {
            Some(merge_choice(previous_choice, current_choice))
        }
        (Some(previous_choice), None) => Some(previous_choice.clone()),
        (None, Some(current_choice)) => Some(seed_choice(current_choice)),
        (None, None) => None,
    };

    Ok(ChatCompletionChunk {
        id: id.or_else(|| previous.id.clone()),
        object: object.or_else(|| previous.object.clone()),
        created: created.or(previous.created),
        model: model.or_else(|| previous.model.clone()),
        request_id: request_id.or_else(|| previous.request_id.clone()),
        choices: choice.into_iter().collect(),
    })
}

fn ensure_single_tool_call(fragment: &ChatCompletionChunk) -> Result<(), ProviderError> {
    let count = fragment
        .choices
        .first()
        .map_or(0, |choice| choice.delta.tool_calls().len());

    if count > 1 {
        return Err(ProviderError::contract_violation(format!(
            "a streamed fragment may carry at most one tool call, got {count}"
        )));
    }

    Ok(())
}

fn seed(mut fragment: ChatCompletionChunk) -> ChatCompletionChunk {
    if let Some(first) = fragment.choices.first_mut() {
        let choice = std::mem::take(first);
        *first = seed_choice(choice);
    }

    fragment
}

fn seed_choice(mut choice: ChunkChoice) -> ChunkChoice {
    let Some(tool_calls) = choice.delta.tool_calls.as_mut() else {
        return choice;
    };

    if tool_calls.iter().any(|call| call.id.is_some()) {
        return choice;
    }

    let id = fresh_id();
    for call in tool_calls.iter_mut() {
        call.id = Some(id.clone());
        call.kind = Some(ToolCallType::Function);
    }

    if choice.delta.role.is_none() {
        choice.delta.role = Some(Role::Assistant);
    }

    choice
}

fn merge_choice(previous: &ChunkChoice, current: ChunkChoice) -> ChunkChoice {
    ChunkChoice {
        index: current.index.or(previous.index),
        finish_reason: current.finish_reason.or(previous.finish_reason),
        delta: merge_message(&previous.delta, current.delta),
    }
}

fn merge_message(previous: &Message, current: Message) -> Message {
    let content = match (previous.content.as_deref(), current.content) {
        (Some(accumulated), Some(delta)) => Some(format!("{accumulated}{delta}")),
        (Some(accumulated), None) => Some(accumulated.to_string()),
        (None, delta) => delta,
    };

    let tool_calls = splice_tool_calls(previous.tool_calls.as_deref(), current.tool_calls);

    Message {
        content,
        role: current.role.or(previous.role).or(Some(Role::Assistant)),
        name: current.name.or_else(|| previous.name.clone()),
        tool_calls,
    }
}

fn splice_tool_calls(
    previous: Option<&[ToolCallRequest]>,
    current: Option<Vec<ToolCallRequest>>,
) -> Option<Vec<ToolCallRequest>> {
    let Some(current_call) = current.and_then(|calls| calls.into_iter().next()) else {
        return previous.map(<[ToolCallRequest]>::to_vec);
    };

    let mut calls = previous.map(<[ToolCallRequest]>::to_vec).unwrap_or_default();
    match (current_call.id.is_some(), calls.last_mut()) {
        (true, _) => calls.push(current_call),
        (false, Some(in_progress)) => continue_tool_call(in_progress, current_call),
        (false, None) => calls.push(with_fresh_id(current_call)),
    }

    Some(calls)
}

fn continue_tool_call(in_progress: &mut ToolCallRequest, fragment: ToolCallRequest) {
    if fragment.kind.is_some() {
        in_progress.kind = fragment.kind;
    }

    if let Some(name) = fragment.function.name {
        in_progress.function.name = Some(name);
    }

    if let Some(arguments) = fragment.function.arguments {
        in_progress
            .function
            .arguments
            .get_or_insert_with(String::new)
            .push_str(&arguments);
    }
}

fn with_fresh_id(mut call: ToolCallRequest) -> ToolCallRequest {
    call.id = Some(fresh_id());
    call.kind.get_or_insert(ToolCallType::Function);
    call
}
