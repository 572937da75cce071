//! MockProvider: deterministic LLM responses for testing
//!
//! Implements `LlmProvider` with canned responses consumed in order, and
//! keeps every request it saw so tests can assert on prompts.

use crate::provider::{LlmError, LlmProvider, LlmResult, LlmStream};
use crate::types::{LlmRequest, StreamDelta};
use async_stream::stream;
use tokio::sync::Mutex;

/// Mock behavior configuration
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// Return a text-only response
    Text(String),
    /// Stream part of a response, then fail mid-stream
    TextThenError { text: String, error: String },
    /// Fail before any streaming starts
    Error(String),
}

/// A sequence of behaviors. Each call to complete_stream pops the next one.
/// If the sequence is exhausted, returns the default behavior.
pub struct MockProvider {
    behaviors: Mutex<Vec<MockBehavior>>,
    default_behavior: MockBehavior,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    /// Create a mock that always returns the same behavior
    pub fn constant(behavior: MockBehavior) -> Self {
        Self {
            behaviors: Mutex::new(Vec::new()),
            default_behavior: behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock with a sequence of behaviors (consumed in order)
    pub fn sequence(behaviors: Vec<MockBehavior>) -> Self {
        Self {
            behaviors: Mutex::new(behaviors),
            default_behavior: MockBehavior::Text("(mock: sequence exhausted)".into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a sequence of plain text replies.
    pub fn replies<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::sequence(texts.into_iter().map(|t| MockBehavior::Text(t.into())).collect())
    }

    /// Get the number of calls made
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// All requests received so far, in call order.
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_behavior(&self, request: LlmRequest) -> MockBehavior {
        self.requests.lock().await.push(request);

        let mut behaviors = self.behaviors.lock().await;
        if behaviors.is_empty() {
            self.default_behavior.clone()
        } else {
            behaviors.remove(0)
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str { "mock" }

    async fn complete_stream(&self, request: LlmRequest) -> LlmResult<LlmStream> {
        let behavior = self.next_behavior(request).await;

        if let MockBehavior::Error(msg) = behavior {
            return Err(LlmError::Status { status: 500, body: msg });
        }

        Ok(Box::pin(stream! {
            match behavior {
                MockBehavior::Text(text) => {
                    // Stream text in chunks like a real LLM
                    for chunk in chunk_chars(&text, 20) {
                        yield Ok(StreamDelta::Text(chunk));
                    }
                    yield Ok(StreamDelta::Done { finish_reason: Some("stop".into()), usage: None });
                }
                MockBehavior::TextThenError { text, error } => {
                    yield Ok(StreamDelta::Text(text));
                    yield Err(LlmError::Stream(error));
                }
                MockBehavior::Error(_) => {}
            }
        }))
    }
}

/// Split on char boundaries so multi-byte text survives chunking.
fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}
