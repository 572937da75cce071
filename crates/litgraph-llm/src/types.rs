//! LLM types for requests and streaming responses

use litgraph_core::Message;
use serde::{Deserialize, Serialize};

/// What shape of output the caller asks the service for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Ask the service to emit a single JSON object.
    JsonObject,
}

/// LLM request
#[derive(Clone, Debug)]
pub struct LlmRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub response_format: ResponseFormat,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LlmRequest {
    fn default() -> Self {
        Self {
            model: "qwen3-32b".to_string(),
            messages: Vec::new(),
            response_format: ResponseFormat::Text,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl LlmRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    pub fn json(mut self) -> Self {
        self.response_format = ResponseFormat::JsonObject;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Prepend a system message.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.messages.insert(0, Message::system(system));
        self
    }
}

/// Streaming delta from LLM
#[derive(Clone, Debug)]
pub enum StreamDelta {
    Text(String),
    Done { finish_reason: Option<String>, usage: Option<Usage> },
}

/// Token usage
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}
