//! Outer graph: classify -> (research | theory | coding) -> finalize.

use crate::classify::{Classifier, QueryType};
use crate::handlers::{ClassifyStage, FinalizeStage, PlaceholderHandler, ResearchDelegate};
use crate::state::{MemoryRecord, OrchestratorState};
use litgraph_core::config::Settings;
use litgraph_core::Result;
use litgraph_graph::{block_on, CompiledGraph, GraphConfig, GraphEvent, Route, RunOutcome, StateGraph, END};
use litgraph_research::{ResearchAssistant, RunSettings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handler selected after classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerRoute {
    Research,
    Theory,
    Coding,
}

impl Route for HandlerRoute {
    const ALL: &'static [Self] = &[Self::Research, Self::Theory, Self::Coding];

    fn key(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Theory => "theory",
            Self::Coding => "coding",
        }
    }
}

impl From<QueryType> for HandlerRoute {
    fn from(query_type: QueryType) -> Self {
        match query_type {
            QueryType::Research => Self::Research,
            QueryType::Theory => Self::Theory,
            // no dedicated planning handler
            QueryType::Coding | QueryType::Planning => Self::Coding,
        }
    }
}

impl HandlerRoute {
    pub fn after_classify(state: &OrchestratorState) -> Self {
        state
            .query_type
            .get()
            .copied()
            .map(Self::from)
            .unwrap_or(Self::Coding)
    }
}

pub fn build_orchestrator_graph(
    classifier: Classifier,
    research: ResearchDelegate,
    config: GraphConfig,
) -> Result<CompiledGraph<OrchestratorState>> {
    let mut graph: StateGraph<OrchestratorState> = StateGraph::new("orchestrator");
    graph
        .add_node("router", ClassifyStage::new(classifier))
        .add_node("research", research)
        .add_node("theory", PlaceholderHandler::theory())
        .add_node("coding", PlaceholderHandler::coding())
        .add_node("final", FinalizeStage)
        .set_entry_point("router")
        .add_conditional_edges(
            "router",
            HandlerRoute::after_classify,
            [
                (HandlerRoute::Research, "research"),
                (HandlerRoute::Theory, "theory"),
                (HandlerRoute::Coding, "coding"),
            ],
        )
        .add_edge("research", "final")
        .add_edge("theory", "final")
        .add_edge("coding", "final")
        .add_edge("final", END)
        .with_config(config);
    graph.compile()
}

/// Fields a caller of the orchestrator usually wants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorReply {
    pub final_answer: String,
    pub agents_visited: Vec<String>,
    pub tools_used: Vec<String>,
    pub query_type: Option<QueryType>,
}

impl From<&OrchestratorState> for OrchestratorReply {
    fn from(state: &OrchestratorState) -> Self {
        Self {
            final_answer: state.final_answer.get().cloned().unwrap_or_default(),
            agents_visited: state.agents_visited.as_slice().to_vec(),
            tools_used: state.tools_used.as_slice().to_vec(),
            query_type: state.query_type.get().copied(),
        }
    }
}

/// The compiled outer pipeline. Built once, invoked per query.
pub struct Orchestrator {
    graph: CompiledGraph<OrchestratorState>,
}

impl Orchestrator {
    pub fn new(assistant: Arc<ResearchAssistant>, research: RunSettings) -> Result<Self> {
        Self::with_classifier(assistant, research, Classifier::default(), GraphConfig::default())
    }

    pub fn with_classifier(
        assistant: Arc<ResearchAssistant>,
        research: RunSettings,
        classifier: Classifier,
        config: GraphConfig,
    ) -> Result<Self> {
        let graph = build_orchestrator_graph(classifier, ResearchDelegate::new(assistant, research), config)?;
        Ok(Self { graph })
    }

    /// Real providers, classifier keywords and limits from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let assistant = Arc::new(ResearchAssistant::from_settings(settings)?);
        Self::with_classifier(
            assistant,
            RunSettings::from(settings),
            Classifier::new(&settings.classifier),
            GraphConfig {
                recursion_limit: settings.graph.recursion_limit,
            },
        )
    }

    pub fn graph(&self) -> &CompiledGraph<OrchestratorState> {
        &self.graph
    }

    pub async fn invoke(&self, query: &str) -> Result<OrchestratorReply> {
        let state = self.invoke_state(query, Vec::new()).await?;
        Ok(OrchestratorReply::from(&state))
    }

    /// Run with earlier memory and return the whole terminal state.
    pub async fn invoke_state(&self, query: &str, memory: Vec<MemoryRecord>) -> Result<OrchestratorState> {
        self.run(query, memory, None).await.map(|outcome| outcome.state)
    }

    pub async fn run(
        &self,
        query: &str,
        memory: Vec<MemoryRecord>,
        events: Option<mpsc::Sender<GraphEvent>>,
    ) -> Result<RunOutcome<OrchestratorState>> {
        self.graph
            .run_with_events(OrchestratorState::new(query, memory), (), events)
            .await
    }

    pub fn invoke_blocking(&self, query: &str) -> Result<OrchestratorReply> {
        block_on(self.invoke(query))?
    }
}

/// Memory records carried across successive queries.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    records: Vec<MemoryRecord>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run one query with the current memory and keep the memory the run ends with.
    /// A failed run leaves the memory unchanged.
    pub async fn ask(&mut self, orchestrator: &Orchestrator, query: &str) -> Result<OrchestratorReply> {
        let state = orchestrator.invoke_state(query, self.records.clone()).await?;
        let reply = OrchestratorReply::from(&state);
        self.records = state.memory.into_inner();
        Ok(reply)
    }
}
