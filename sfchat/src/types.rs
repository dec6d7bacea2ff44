//! Prompt and chat response types.

use std::pin::Pin;

use futures_core::Stream;
use sfcommon::{MetadataMap, RequestId};
use sfprovider::{ChatCompletion, FinishReason, LogicalTurn, Message, Role, Usage};

use crate::{ChatError, ChatOptions};

#[derive(Debug, Clone, Default)]
pub struct Prompt {
    pub messages: Vec<Message>,
    pub options: Option<ChatOptions>,
    /// Correlates every round of one conversation; generated when absent.
    pub request_id: Option<RequestId>,
}

impl Prompt {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            options: None,
            request_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(vec![Message::user(content)])
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationMetadata {
    pub id: Option<String>,
    pub role: Option<Role>,
    pub finish_reason: Option<FinishReason>,
}

impl GenerationMetadata {
    pub fn to_map(&self) -> MetadataMap {
        let mut map = MetadataMap::new();
        if let Some(id) = &self.id {
            map.insert("id".to_string(), id.clone());
        }
        if let Some(role) = self.role {
            map.insert("role".to_string(), role.to_string());
        }
        if let Some(finish_reason) = self.finish_reason {
            map.insert("finish_reason".to_string(), finish_reason.to_string());
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub message: Message,
    pub metadata: GenerationMetadata,
}

impl Generation {
    pub fn text(&self) -> &str {
        self.message.text()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatResponse {
    pub generations: Vec<Generation>,
    /// Reported for aggregate responses only.
    pub usage: Option<Usage>,
    pub id: Option<String>,
    pub model: Option<String>,
    pub request_id: Option<String>,
    /// Conversation as it stood when the tool loop finished, ending with the final answer.
    /// Empty for streamed turns that passed through without a tool round.
    pub history: Vec<Message>,
}

impl ChatResponse {
    pub fn from_completion(completion: ChatCompletion) -> Self {
        let id = completion.id;
        let generations = completion
            .choices
            .into_iter()
            .map(|choice| Generation {
                metadata: GenerationMetadata {
                    id: id.clone(),
                    role: choice.message.role,
                    finish_reason: choice.finish_reason,
                },
                message: choice.message,
            })
            .collect();

        Self {
            generations,
            usage: completion.usage,
            id,
            model: completion.model,
            request_id: completion.request_id,
            history: Vec::new(),
        }
    }

    /// Wraps a streamed turn, reporting `role` as the role recorded for the turn's id.
    pub fn from_turn(turn: LogicalTurn, role: Role) -> Self {
        let id = turn.id;
        let generations = turn
            .choices
            .into_iter()
            .map(|choice| Generation {
                metadata: GenerationMetadata {
                    id: id.clone(),
                    role: Some(role),
                    finish_reason: choice.finish_reason,
                },
                message: choice.delta,
            })
            .collect();

        Self {
            generations,
            usage: None,
            id,
            model: turn.model,
            request_id: turn.request_id,
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn generation(&self) -> Option<&Generation> {
        self.generations.first()
    }

    pub fn text(&self) -> &str {
        self.generation().map(Generation::text).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }
}

pub type ChatResponseStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ChatResponse, ChatError>> + Send + 'a>>;

#[cfg(test)]
mod tests {
    use sfprovider::{Choice, ChunkChoice};

    use super::*;

    #[test]
    fn completion_maps_choices_and_usage() {
        let response = ChatResponse::from_completion(ChatCompletion {
            id: Some("cmpl-1".to_string()),
            choices: vec![Choice {
                index: Some(0),
                message: Message::assistant("sunny"),
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: Some(Usage {
                prompt_tokens: 3,
                completion_tokens: 1,
                total_tokens: 4,
            }),
            ..ChatCompletion::default()
        });

        assert_eq!(response.text(), "sunny");
        assert_eq!(response.usage.map(|usage| usage.total_tokens), Some(4));

        let metadata = response.generation().expect("generation").metadata.to_map();
        assert_eq!(metadata.get("id").map(String::as_str), Some("cmpl-1"));
        assert_eq!(metadata.get("role").map(String::as_str), Some("assistant"));
        assert_eq!(metadata.get("finish_reason").map(String::as_str), Some("stop"));
    }

    #[test]
    fn turn_uses_tracked_role_and_reports_no_usage() {
        let turn = LogicalTurn {
            id: Some("turn-1".to_string()),
            choices: vec![ChunkChoice {
                delta: Message {
                    content: Some("partial".to_string()),
                    ..Message::default()
                },
                ..ChunkChoice::default()
            }],
            ..LogicalTurn::default()
        };

        let response = ChatResponse::from_turn(turn, Role::Assistant);
        let generation = response.generation().expect("generation");
        assert_eq!(generation.metadata.role, Some(Role::Assistant));
        assert_eq!(generation.metadata.finish_reason, None);
        assert_eq!(response.usage, None);
    }

    #[test]
    fn empty_completion_yields_no_generations() {
        let response = ChatResponse::from_completion(ChatCompletion::default());
        assert!(response.is_empty());
        assert_eq!(response.text(), "");
        assert!(response.history.is_empty());
    }
}
