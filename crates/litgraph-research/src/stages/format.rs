use super::{generate, required, RunSettings};
use crate::prompts::{format_input, FORMAT_PROMPT};
use crate::state::{ResearchState, ResearchUpdate};
use litgraph_core::{Message, Result};
use litgraph_graph::{Node, RunContext};
use litgraph_llm::{LlmProvider, LlmRequest};
use std::sync::Arc;
use tracing::info;

/// Renders the summary as prose. The output is free text and is not validated.
pub struct FormatStage {
    llm: Arc<dyn LlmProvider>,
}

impl FormatStage {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait::async_trait]
impl Node<ResearchState, RunSettings> for FormatStage {
    async fn run(&self, state: &ResearchState, ctx: &RunContext<RunSettings>) -> Result<ResearchUpdate> {
        let summary = required(&state.summary, "summary", "format")?;
        let request = LlmRequest::new(ctx.config.model.clone(), vec![Message::user(format_input(summary)?)])
            .with_system(FORMAT_PROMPT)
            .with_temperature(ctx.config.temperature);

        let report = generate(self.llm.as_ref(), "format", request).await?.trim().to_string();
        info!(run_id = %ctx.run_id, chars = report.len(), "report ready");

        Ok(ResearchUpdate {
            formatted_report: Some(report),
            ..Default::default()
        })
    }
}
