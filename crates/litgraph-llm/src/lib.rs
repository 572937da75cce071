//! litgraph LLM - generation capability with streaming support

pub mod mock;
pub mod openai;
pub mod provider;
pub mod types;

pub use mock::{MockBehavior, MockProvider};
pub use openai::OpenAiCompatibleProvider;
pub use provider::{LlmError, LlmProvider, LlmResult, LlmStream};
pub use types::*;
