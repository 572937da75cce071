//! The five research stages.
//!
//! Each stage reads the run state and returns a `ResearchUpdate`; none of them
//! mutates the state directly.

mod enrich;
mod format;
mod plan;
mod retrieve;
mod synthesize;

pub use enrich::EnrichStage;
pub use format::FormatStage;
pub use plan::PlanStage;
pub use retrieve::RetrieveStage;
pub use synthesize::SynthesizeStage;

use litgraph_core::config::Settings;
use litgraph_core::{Error, Result};
use litgraph_graph::WriteOnce;
use litgraph_llm::{LlmError, LlmProvider, LlmRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard ceiling on records a run returns, whatever the caller asks for.
pub const MAX_RECORDS: usize = 5;

/// Per-run configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub model: String,
    pub max_results: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            model: "qwen3-32b".into(),
            max_results: MAX_RECORDS,
            temperature: None,
        }
    }
}

impl From<&Settings> for RunSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.llm.model.clone(),
            max_results: settings.search.max_results,
            temperature: settings.llm.temperature,
        }
    }
}

impl RunSettings {
    /// Records a run may return: the requested count, capped.
    pub fn record_cap(&self) -> usize {
        self.max_results.min(MAX_RECORDS)
    }
}

/// A field an earlier stage should have written.
fn required<'a, T>(field: &'a WriteOnce<T>, name: &str, stage: &str) -> Result<&'a T> {
    field
        .get()
        .ok_or_else(|| Error::configuration(format!("{stage} ran before '{name}' was set")))
}

async fn generate(llm: &dyn LlmProvider, stage: &str, request: LlmRequest) -> Result<String> {
    let raw = llm
        .generate(request)
        .await
        .map_err(|e: LlmError| Error::generation(llm.name(), e.to_string()))?;
    debug!(stage, provider = llm.name(), output = %raw, "model output");
    Ok(raw)
}
