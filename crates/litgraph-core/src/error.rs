//! Error types for litgraph
//!
//! Every variant except `EnrichmentUnavailable` is fatal to the run that raised it.
//! Errors cross the engine and the nested-run boundary unchanged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The plan stage got output that does not match the plan schema.
    #[error("planning failed: {reason}\nmodel output: {raw}")]
    Planning { reason: String, raw: String },

    /// Retrieval still failing after the retry budget was spent.
    #[error("retrieval failed after {attempts} attempt(s): {message}")]
    Retrieval { attempts: u32, message: String },

    /// The synthesize stage got output that does not match the summary schema.
    #[error("synthesis failed: {reason}\nmodel output: {raw}")]
    Synthesis { reason: String, raw: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    /// Author statistics could not be produced. Never aborts a run.
    #[error("enrichment unavailable: {0}")]
    EnrichmentUnavailable(String),

    #[error("generation error: {provider} - {message}")]
    Generation { provider: String, message: String },

    #[error("recursion limit of {limit} steps reached")]
    RecursionLimit { limit: usize },

    #[error("state conflict: field '{field}' is already set")]
    StateConflict { field: &'static str },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn planning(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Planning {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn synthesis(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Synthesis {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether a run may continue past this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::EnrichmentUnavailable(_))
    }
}
