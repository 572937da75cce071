//! Tests for litgraph-agents: classification, dispatch, nested research runs, memory

use async_trait::async_trait;
use litgraph_agents::*;
use litgraph_core::Error;
use litgraph_graph::{GraphConfig, GraphEvent, GraphState};
use litgraph_llm::MockProvider;
use litgraph_research::{ResearchAssistant, RunSettings, ScholarlySearch, SearchError, SearchQuery, Work};
use std::sync::Arc;
use tokio::sync::mpsc;

// ===========================================================================
// Fixtures
// ===========================================================================

const PLAN: &str = r#"{"keywords":["graphene"],"min_year":2018,"need_author_stats":false}"#;
const SUMMARY: &str = r#"{"topic":"Graphene","trends":["synthesis"],"notable_papers":["G1"],"open_questions":["cost"]}"#;
const REPORT: &str = "Graphene research has moved from discovery to manufacturing.";

struct OneWork;

#[async_trait]
impl ScholarlySearch for OneWork {
    fn name(&self) -> &str {
        "one"
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<Work>, SearchError> {
        Ok(vec![Work {
            id: "https://openalex.org/W1".into(),
            title: Some("G1".into()),
            cited_by_count: 3,
            ..Default::default()
        }])
    }
}

fn orchestrator(llm: Arc<MockProvider>) -> Orchestrator {
    let assistant = ResearchAssistant::builder(llm, Arc::new(OneWork)).build().unwrap();
    Orchestrator::new(Arc::new(assistant), RunSettings::default()).unwrap()
}

fn research_llm() -> Arc<MockProvider> {
    Arc::new(MockProvider::replies([PLAN, SUMMARY, REPORT]))
}

// ===========================================================================
// Dispatch
// ===========================================================================

#[tokio::test]
async fn research_query_runs_inner_pipeline() {
    let llm = research_llm();
    let orch = orchestrator(llm.clone());

    let state = orch.invoke_state("Find a paper about graphene", Vec::new()).await.unwrap();
    assert_eq!(state.query_type.get(), Some(&QueryType::Research));
    assert_eq!(state.agents_visited.as_slice(), &[ROUTER_AGENT, RESEARCH_AGENT, FINAL_FORMATTER]);
    assert_eq!(state.tools_used.as_slice(), &[RESEARCH_TOOL]);
    assert_eq!(state.final_answer.get().map(String::as_str), Some(REPORT));

    let report = state.handler_result.get().unwrap();
    assert_eq!(report.summary.as_ref().unwrap().topic, "Graphene");
    assert_eq!(report.records.len(), 1);

    let memory = state.memory.as_slice();
    assert_eq!(memory.len(), 1);
    assert_eq!(memory[0].kind, QueryType::Research);
    assert_eq!(memory[0].answer, REPORT);
    assert_eq!(llm.call_count().await, 3);
}

#[tokio::test]
async fn theory_query_gets_placeholder() {
    let llm = research_llm();
    let reply = orchestrator(llm.clone()).invoke("Explain superposition").await.unwrap();

    assert_eq!(reply.agents_visited, vec![ROUTER_AGENT, THEORY_AGENT, FINAL_FORMATTER]);
    assert!(reply.tools_used.is_empty());
    assert!(reply.final_answer.starts_with("This is a THEORY agent placeholder."));
    assert!(reply.final_answer.contains("'Explain superposition'"));
    assert_eq!(llm.call_count().await, 0);
}

#[tokio::test]
async fn coding_query_gets_placeholder() {
    let reply = orchestrator(research_llm()).invoke("my python script has a bug").await.unwrap();
    assert_eq!(reply.query_type, Some(QueryType::Coding));
    assert_eq!(reply.agents_visited[1], CODING_AGENT);
    assert_eq!(
        reply.final_answer,
        "This is a CODING/PLANNING agent placeholder.\n\nIt should help you with code or study planning related to: 'my python script has a bug'."
    );
}

#[tokio::test]
async fn planning_falls_back_to_coding_handler() {
    let orch = orchestrator(research_llm());
    let state = orch.invoke_state("plan my week", Vec::new()).await.unwrap();
    assert_eq!(state.query_type.get(), Some(&QueryType::Planning));
    assert_eq!(state.agents_visited.as_slice(), &[ROUTER_AGENT, CODING_AGENT, FINAL_FORMATTER]);
    assert_eq!(state.memory.as_slice()[0].kind, QueryType::Coding);
}

#[test]
fn every_query_type_has_a_handler() {
    assert_eq!(HandlerRoute::from(QueryType::Research), HandlerRoute::Research);
    assert_eq!(HandlerRoute::from(QueryType::Theory), HandlerRoute::Theory);
    assert_eq!(HandlerRoute::from(QueryType::Coding), HandlerRoute::Coding);
    assert_eq!(HandlerRoute::from(QueryType::Planning), HandlerRoute::Coding);
}

// ===========================================================================
// Nested run failures and fallbacks
// ===========================================================================

#[tokio::test]
async fn inner_failure_aborts_outer_run() {
    let llm = Arc::new(MockProvider::replies(["{broken"]));
    let err = orchestrator(llm).invoke("latest research on graphene").await.unwrap_err();
    match err {
        Error::Planning { raw, .. } => assert_eq!(raw, "{broken"),
        other => panic!("expected Planning, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_report_uses_fallback() {
    let llm = Arc::new(MockProvider::replies([PLAN, SUMMARY, "   "]));
    let reply = orchestrator(llm).invoke("a study of graphene").await.unwrap();
    assert_eq!(reply.final_answer, NO_REPORT);
}

#[tokio::test]
async fn finalize_without_draft_uses_fallback() {
    let state = OrchestratorState::new("q", Vec::new());
    let ctx = litgraph_graph::RunContext::new("test", ());
    let update = litgraph_graph::Node::run(&FinalizeStage, &state, &ctx).await.unwrap();
    assert_eq!(update.final_answer.as_deref(), Some(NO_DRAFT));
    assert_eq!(update.agents_visited, vec![FINAL_FORMATTER]);
}

// ===========================================================================
// Memory
// ===========================================================================

#[tokio::test]
async fn memory_accumulates_across_asks() {
    let llm = research_llm();
    let orch = orchestrator(llm);
    let mut memory = ConversationMemory::new();

    memory.ask(&orch, "what is the theory of relativity").await.unwrap();
    memory.ask(&orch, "research on graphene").await.unwrap();
    memory.ask(&orch, "fix this bug").await.unwrap();

    let kinds: Vec<_> = memory.records().iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![QueryType::Theory, QueryType::Research, QueryType::Coding]);
    assert_eq!(memory.records()[1].answer, REPORT);
}

#[tokio::test]
async fn failed_ask_keeps_memory() {
    let llm = Arc::new(MockProvider::replies(["not a plan"]));
    let orch = orchestrator(llm);
    let mut memory = ConversationMemory::new();

    memory.ask(&orch, "explain entropy").await.unwrap();
    assert!(memory.ask(&orch, "literature on entropy").await.is_err());
    assert_eq!(memory.len(), 1);
}

#[test]
fn memory_record_serializes_type_field() {
    let record = MemoryRecord { query: "q".into(), answer: "a".into(), kind: QueryType::Theory };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["type"], "theory");
}

// ===========================================================================
// Execution trace
// ===========================================================================

#[tokio::test]
async fn visited_agents_match_executed_nodes() {
    let (tx, mut rx) = mpsc::channel(64);
    let outcome = orchestrator(research_llm()).run("a paper on graphene", Vec::new(), Some(tx)).await.unwrap();

    assert_eq!(outcome.path, vec!["router", "research", "final"]);
    assert_eq!(outcome.state.agents_visited.len(), outcome.path.len());

    let mut routed = Vec::new();
    while let Some(event) = rx.recv().await {
        if let GraphEvent::Routed { route, to, .. } = event {
            routed.push((route, to));
        }
    }
    assert_eq!(routed, vec![("research", "research".to_string())]);
}

#[test]
fn outer_schema_declares_append_fields() {
    let appends: Vec<_> = OrchestratorState::schema()
        .iter()
        .filter(|f| f.strategy == litgraph_graph::MergeStrategy::Append)
        .map(|f| f.name)
        .collect();
    assert_eq!(appends, vec!["agents_visited", "tools_used", "memory"]);
}

#[test]
fn graph_shape() {
    let assistant = ResearchAssistant::builder(research_llm(), Arc::new(OneWork)).build().unwrap();
    let orch = Orchestrator::with_classifier(
        Arc::new(assistant),
        RunSettings::default(),
        Classifier::default(),
        GraphConfig::default(),
    )
    .unwrap();
    assert_eq!(orch.graph().entry(), "router");
    assert_eq!(orch.graph().node_names(), vec!["coding", "final", "research", "router", "theory"]);
}

#[test]
fn blocking_invoke() {
    let reply = orchestrator(research_llm()).invoke_blocking("study graphene").unwrap();
    assert_eq!(reply.final_answer, REPORT);
}
