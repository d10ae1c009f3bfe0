//! Completion request and response types

use crate::Message;
use serde::{Deserialize, Serialize};

/// Token budget used when the caller does not set one
pub const DEFAULT_MAX_TOKENS: usize = 2048;

/// A single completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider-specific model name
    pub model: String,

    /// Messages in conversation order
    pub messages: Vec<Message>,

    /// Instructions sent ahead of the messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Upper bound on generated tokens
    pub max_tokens: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Strings that end generation when produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl CompletionRequest {
    /// Start building a request for `model`
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }

    /// A request carrying one user prompt and default settings
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::builder(model).user(prompt).build()
    }

    /// Text of all user messages, joined by blank lines
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == crate::Role::User)
            .map(Message::text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// What the model returned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The assistant's reply
    pub message: Message,

    /// Why generation ended
    pub stop_reason: StopReason,

    /// Tokens billed for the call
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Create an end-of-turn response carrying `text`
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }
}

/// Reason the LLM stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished its answer
    EndTurn,

    /// The token budget ran out
    MaxTokens,

    /// A configured stop sequence was produced
    StopSequence,

    /// Output withheld by the provider's safety filter
    ContentFiltered,
}

/// Token counts reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub input_tokens: usize,

    /// Generated tokens
    pub output_tokens: usize,
}

impl TokenUsage {
    /// Prompt plus generated tokens
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// Builder for [`CompletionRequest`]
#[derive(Debug, Clone)]
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    /// New builder with no messages and [`DEFAULT_MAX_TOKENS`]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: CompletionRequest {
                model: model.into(),
                messages: Vec::new(),
                system: None,
                max_tokens: DEFAULT_MAX_TOKENS,
                temperature: None,
                stop_sequences: None,
            },
        }
    }

    /// Append a message
    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    /// Append a user message
    pub fn user(self, text: impl Into<String>) -> Self {
        self.add_message(Message::user(text))
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    pub fn stop_sequences(mut self, sequences: Vec<String>) -> Self {
        self.request.stop_sequences = Some(sequences);
        self
    }

    /// Finish the request
    pub fn build(self) -> CompletionRequest {
        self.request
    }
}
