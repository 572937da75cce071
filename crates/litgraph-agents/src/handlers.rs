//! Outer pipeline stages: classify, the three handlers, finalize.

use crate::classify::{Classifier, QueryType};
use crate::state::{MemoryRecord, OrchestratorState, OrchestratorUpdate};
use litgraph_core::Result;
use litgraph_graph::{Node, RunContext};
use litgraph_research::{ResearchAssistant, RunSettings};
use std::sync::Arc;
use tracing::info;

pub const ROUTER_AGENT: &str = "RouterAgent";
pub const RESEARCH_AGENT: &str = "ResearchAgent";
pub const THEORY_AGENT: &str = "TheoryAgent";
pub const CODING_AGENT: &str = "CodingAgent";
pub const FINAL_FORMATTER: &str = "FinalFormatter";

pub const RESEARCH_TOOL: &str = "run_research_assistant";

pub const NO_REPORT: &str = "No report produced.";
pub const NO_DRAFT: &str = "No draft answer produced.";

pub struct ClassifyStage {
    classifier: Classifier,
}

impl ClassifyStage {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }
}

#[async_trait::async_trait]
impl Node<OrchestratorState> for ClassifyStage {
    async fn run(&self, state: &OrchestratorState, ctx: &RunContext) -> Result<OrchestratorUpdate> {
        let query_type = self.classifier.classify(state.query());
        info!(run_id = %ctx.run_id, %query_type, "query classified");
        Ok(OrchestratorUpdate {
            query_type: Some(query_type),
            ..OrchestratorUpdate::visited(ROUTER_AGENT)
        })
    }
}

/// Runs the whole research pipeline as one step and folds its report into
/// the outer state. Inner errors abort the outer run unchanged.
pub struct ResearchDelegate {
    assistant: Arc<ResearchAssistant>,
    settings: RunSettings,
}

impl ResearchDelegate {
    pub fn new(assistant: Arc<ResearchAssistant>, settings: RunSettings) -> Self {
        Self { assistant, settings }
    }
}

#[async_trait::async_trait]
impl Node<OrchestratorState> for ResearchDelegate {
    async fn run(&self, state: &OrchestratorState, ctx: &RunContext) -> Result<OrchestratorUpdate> {
        let query = state.query();
        info!(run_id = %ctx.run_id, tool = RESEARCH_TOOL, "delegating to research pipeline");

        let report = self.assistant.invoke(query, self.settings.clone()).await?;
        let answer = report
            .formatted_report
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| NO_REPORT.to_string());

        Ok(OrchestratorUpdate {
            handler_result: Some(report),
            draft_answer: Some(answer.clone()),
            tools_used: vec![RESEARCH_TOOL.to_string()],
            memory: vec![MemoryRecord {
                query: query.to_string(),
                answer,
                kind: QueryType::Research,
            }],
            ..OrchestratorUpdate::visited(RESEARCH_AGENT)
        })
    }
}

/// Templated stand-in answer. No model call.
pub struct PlaceholderHandler {
    agent: &'static str,
    kind: QueryType,
    template: fn(&str) -> String,
}

impl PlaceholderHandler {
    pub fn theory() -> Self {
        Self {
            agent: THEORY_AGENT,
            kind: QueryType::Theory,
            template: |query| {
                format!(
                    "This is a THEORY agent placeholder. It should explain theoretical concepts \
                     related to your query: '{query}'.\n\nLater we can plug a real LLM here."
                )
            },
        }
    }

    pub fn coding() -> Self {
        Self {
            agent: CODING_AGENT,
            kind: QueryType::Coding,
            template: |query| {
                format!(
                    "This is a CODING/PLANNING agent placeholder.\n\n\
                     It should help you with code or study planning related to: '{query}'."
                )
            },
        }
    }
}

#[async_trait::async_trait]
impl Node<OrchestratorState> for PlaceholderHandler {
    async fn run(&self, state: &OrchestratorState, ctx: &RunContext) -> Result<OrchestratorUpdate> {
        let query = state.query();
        let answer = (self.template)(query);
        info!(run_id = %ctx.run_id, agent = self.agent, "placeholder answer");
        Ok(OrchestratorUpdate {
            draft_answer: Some(answer.clone()),
            memory: vec![MemoryRecord {
                query: query.to_string(),
                answer,
                kind: self.kind,
            }],
            ..OrchestratorUpdate::visited(self.agent)
        })
    }
}

pub struct FinalizeStage;

#[async_trait::async_trait]
impl Node<OrchestratorState> for FinalizeStage {
    async fn run(&self, state: &OrchestratorState, _ctx: &RunContext) -> Result<OrchestratorUpdate> {
        let answer = state
            .draft_answer
            .get()
            .filter(|d| !d.is_empty())
            .cloned()
            .unwrap_or_else(|| NO_DRAFT.to_string());
        Ok(OrchestratorUpdate {
            final_answer: Some(answer),
            ..OrchestratorUpdate::visited(FINAL_FORMATTER)
        })
    }
}
