//! The generation capability: a provider turns a request into streamed text.

use crate::types::{LlmRequest, StreamDelta};
use futures::{Stream, StreamExt};
use std::pin::Pin;

pub type LlmResult<T> = Result<T, LlmError>;

/// Why a generation call failed. The stage that made the call wraps this
/// into a run-level generation error.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Non-2xx answer other than auth and rate limiting.
    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation service rejected the credentials ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("rate limited by generation service{}", .retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// A stream event that is not a completion chunk.
    #[error("malformed stream event: {0}")]
    Malformed(String),

    /// The stream broke, or the service sent an error event mid-stream.
    #[error("generation stream failed: {0}")]
    Stream(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type LlmStream = Pin<Box<dyn Stream<Item = LlmResult<StreamDelta>> + Send>>;

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    async fn complete_stream(&self, request: LlmRequest) -> LlmResult<LlmStream>;

    /// `generate(messages, responseFormat) -> text`: drain the stream and
    /// return the concatenated text.
    ///
    /// Stops at the first `Done`. A stream that ends without one still
    /// returns whatever text arrived.
    async fn generate(&self, request: LlmRequest) -> LlmResult<String> {
        let mut stream = self.complete_stream(request).await?;
        let mut text = String::new();
        while let Some(delta) = stream.next().await {
            match delta? {
                StreamDelta::Text(t) => text.push_str(&t),
                StreamDelta::Done { .. } => break,
            }
        }
        Ok(text)
    }
}
