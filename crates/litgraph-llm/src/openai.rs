//! OpenAI-compatible chat completions provider with SSE streaming

use crate::provider::{LlmError, LlmProvider, LlmResult, LlmStream};
use crate::types::{LlmRequest, ResponseFormat, StreamDelta, Usage};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiCompatibleProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str { "openai-compatible" }

    async fn complete_stream(&self, request: LlmRequest) -> LlmResult<LlmStream> {
        let body = ChatRequest::from(&request);

        debug!("Chat request: model={} messages={}", body.model, body.messages.len());

        let response = self.client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let body = response.text().await.unwrap_or_default();
            error!("Chat completion error {}: {}", status, body);

            let status = status.as_u16();
            return Err(match status {
                401 | 403 => LlmError::Unauthorized { status, body },
                429 => LlmError::RateLimited { retry_after_secs },
                _ => LlmError::Status { status, body },
            });
        }

        let stream = parse_sse_stream(response.bytes_stream());
        Ok(Box::pin(stream))
    }
}

fn parse_sse_stream(
    bytes_stream: impl futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl futures::Stream<Item = LlmResult<StreamDelta>> + Send {
    async_stream::stream! {
        let events = bytes_stream.eventsource();
        tokio::pin!(events);

        let mut finish_reason: Option<String> = None;
        let mut usage: Option<Usage> = None;

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(e) => e,
                Err(e) => {
                    yield Err(LlmError::Stream(e.to_string()));
                    return;
                }
            };

            if event.data.trim() == "[DONE]" {
                break;
            }
            if event.data.is_empty() { continue; }

            let chunk = match serde_json::from_str::<ChatChunk>(&event.data) {
                Ok(c) => c,
                Err(e) => {
                    yield Err(LlmError::Malformed(format!("{}: {}", e, event.data)));
                    return;
                }
            };

            if let Some(err) = chunk.error {
                yield Err(LlmError::Stream(err.message));
                return;
            }
            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
            for choice in chunk.choices {
                if let Some(text) = choice.delta.content {
                    if !text.is_empty() {
                        yield Ok(StreamDelta::Text(text));
                    }
                }
                if choice.finish_reason.is_some() {
                    finish_reason = choice.finish_reason;
                }
            }
        }

        debug!("Completion finished: finish_reason={:?}", finish_reason);
        yield Ok(StreamDelta::Done { finish_reason, usage });
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ChatResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl From<&LlmRequest> for ChatRequest {
    fn from(request: &LlmRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: request.messages.iter().map(|m| ChatMessage {
                role: m.role.as_str(),
                content: m.content.clone(),
            }).collect(),
            stream: true,
            response_format: match request.response_format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(ChatResponseFormat { kind: "json_object" }),
            },
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    usage: Option<Usage>,
    error: Option<ChunkError>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChunkError {
    message: String,
}
