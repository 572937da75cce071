use super::{generate, required, RunSettings};
use crate::models::Summary;
use crate::prompts::{synthesis_input, SYNTHESIS_PROMPT};
use crate::state::{ResearchState, ResearchUpdate};
use litgraph_core::{Message, Result};
use litgraph_graph::{Node, RunContext};
use litgraph_llm::{LlmProvider, LlmRequest};
use std::sync::Arc;
use tracing::info;

pub struct SynthesizeStage {
    llm: Arc<dyn LlmProvider>,
}

impl SynthesizeStage {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait::async_trait]
impl Node<ResearchState, RunSettings> for SynthesizeStage {
    async fn run(&self, state: &ResearchState, ctx: &RunContext<RunSettings>) -> Result<ResearchUpdate> {
        let plan = required(&state.plan, "plan", "synthesize")?;
        let records = required(&state.records, "records", "synthesize")?;
        let input = synthesis_input(plan, records, state.author_stats.get())?;

        let request = LlmRequest::new(ctx.config.model.clone(), vec![Message::user(input)])
            .with_system(SYNTHESIS_PROMPT)
            .with_temperature(ctx.config.temperature)
            .json();

        let raw = generate(self.llm.as_ref(), "synthesize", request).await?;
        let summary = Summary::parse(&raw)?;
        info!(run_id = %ctx.run_id, topic = %summary.topic, trends = summary.trends.len(), "summary ready");

        Ok(ResearchUpdate {
            summary: Some(summary),
            ..Default::default()
        })
    }
}
