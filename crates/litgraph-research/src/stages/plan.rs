use super::{generate, RunSettings};
use crate::models::Plan;
use crate::prompts::PLAN_PROMPT;
use crate::state::{ResearchState, ResearchUpdate};
use litgraph_core::{Message, Result};
use litgraph_graph::{Node, RunContext};
use litgraph_llm::{LlmProvider, LlmRequest};
use std::sync::Arc;
use tracing::info;

/// Asks the model for a search plan. Malformed output is fatal, never retried.
pub struct PlanStage {
    llm: Arc<dyn LlmProvider>,
}

impl PlanStage {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait::async_trait]
impl Node<ResearchState, RunSettings> for PlanStage {
    async fn run(&self, state: &ResearchState, ctx: &RunContext<RunSettings>) -> Result<ResearchUpdate> {
        let request = LlmRequest::new(ctx.config.model.clone(), state.conversation.as_slice().to_vec())
            .with_system(PLAN_PROMPT)
            .with_temperature(ctx.config.temperature)
            .json();

        let raw = generate(self.llm.as_ref(), "plan", request).await?;
        let plan = Plan::parse(&raw)?;
        info!(run_id = %ctx.run_id, keywords = ?plan.keywords, min_year = plan.min_year, need_author_stats = plan.need_author_stats, "plan ready");

        Ok(ResearchUpdate {
            conversation: vec![Message::assistant(raw)],
            plan: Some(plan),
            ..Default::default()
        })
    }
}
