//! Shared state of one orchestrator run.

use crate::classify::QueryType;
use litgraph_core::Result;
use litgraph_graph::{merge_field, Append, FieldSpec, GraphState, Overwrite, WriteOnce};
use litgraph_research::ResearchReport;
use serde::{Deserialize, Serialize};

/// One answered query, kept across runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub query: String,
    pub answer: String,
    #[serde(rename = "type")]
    pub kind: QueryType,
}

#[derive(Clone, Debug, Default)]
pub struct OrchestratorState {
    pub user_query: WriteOnce<String>,
    pub query_type: Overwrite<QueryType>,
    pub handler_result: WriteOnce<ResearchReport>,
    pub draft_answer: Overwrite<String>,
    pub final_answer: WriteOnce<String>,
    pub agents_visited: Append<String>,
    pub tools_used: Append<String>,
    pub memory: Append<MemoryRecord>,
}

impl OrchestratorState {
    /// Fresh state for `query`, carrying earlier memory forward.
    pub fn new(query: impl Into<String>, memory: Vec<MemoryRecord>) -> Self {
        Self {
            user_query: WriteOnce::new(query.into()),
            memory: Append::new(memory),
            ..Default::default()
        }
    }

    pub fn query(&self) -> &str {
        self.user_query.get().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct OrchestratorUpdate {
    pub query_type: Option<QueryType>,
    pub handler_result: Option<ResearchReport>,
    pub draft_answer: Option<String>,
    pub final_answer: Option<String>,
    pub agents_visited: Vec<String>,
    pub tools_used: Vec<String>,
    pub memory: Vec<MemoryRecord>,
}

impl OrchestratorUpdate {
    /// An update that records a visit by `agent`.
    pub fn visited(agent: &str) -> Self {
        Self {
            agents_visited: vec![agent.to_string()],
            ..Default::default()
        }
    }
}

static SCHEMA: &[FieldSpec] = &[
    FieldSpec::of::<WriteOnce<String>>("user_query"),
    FieldSpec::of::<Overwrite<QueryType>>("query_type"),
    FieldSpec::of::<WriteOnce<ResearchReport>>("handler_result"),
    FieldSpec::of::<Overwrite<String>>("draft_answer"),
    FieldSpec::of::<WriteOnce<String>>("final_answer"),
    FieldSpec::of::<Append<String>>("agents_visited"),
    FieldSpec::of::<Append<String>>("tools_used"),
    FieldSpec::of::<Append<MemoryRecord>>("memory"),
];

impl GraphState for OrchestratorState {
    type Update = OrchestratorUpdate;

    fn schema() -> &'static [FieldSpec] {
        SCHEMA
    }

    fn merge(&mut self, update: OrchestratorUpdate) -> Result<Vec<&'static str>> {
        let mut touched = Vec::new();
        merge_field(&mut touched, "query_type", &mut self.query_type, update.query_type)?;
        merge_field(&mut touched, "handler_result", &mut self.handler_result, update.handler_result)?;
        merge_field(&mut touched, "draft_answer", &mut self.draft_answer, update.draft_answer)?;
        merge_field(&mut touched, "final_answer", &mut self.final_answer, update.final_answer)?;
        merge_field(&mut touched, "agents_visited", &mut self.agents_visited, update.agents_visited)?;
        merge_field(&mut touched, "tools_used", &mut self.tools_used, update.tools_used)?;
        merge_field(&mut touched, "memory", &mut self.memory, update.memory)?;
        Ok(touched)
    }
}
