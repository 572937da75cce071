//! End-to-end scenarios over both pipelines with scripted model output and
//! an in-memory search service.

use async_trait::async_trait;
use litgraph_agents::{Orchestrator, FINAL_FORMATTER, RESEARCH_AGENT, ROUTER_AGENT};
use litgraph_core::Error;
use litgraph_graph::GraphEvent;
use litgraph_llm::{LlmProvider, LlmRequest, LlmResult, LlmStream, MockProvider};
use litgraph_research::{ResearchAssistant, RunSettings, ScholarlySearch, SearchError, SearchQuery, Work};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const QUERY: &str = "Give me a summary of recent research on quantum computing.";
const PLAN: &str = r#"{"keywords":["quantum computing","qubits"],"min_year":2020,"need_author_stats":false}"#;
const SUMMARY: &str = r#"{
  "topic": "Quantum computing",
  "trends": ["Error-corrected logical qubits", "Hybrid quantum-classical algorithms"],
  "notable_papers": ["Quantum supremacy using a programmable superconducting processor"],
  "open_questions": ["How far can noisy devices scale?"]
}"#;
const REPORT: &str = "Recent quantum computing research concentrates on error-corrected logical qubits \
and hybrid algorithms, while the scalability of noisy devices remains open.";

// ===========================================================================
// Search doubles
// ===========================================================================

struct Catalogue;

#[async_trait]
impl ScholarlySearch for Catalogue {
    fn name(&self) -> &str {
        "catalogue"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Work>, SearchError> {
        Ok((1..=query.limit as u64 + 2)
            .map(|n| {
                let mut index = HashMap::new();
                index.insert("qubits".to_string(), vec![0]);
                index.insert(format!("result{n}"), vec![1]);
                Work {
                    id: format!("https://openalex.org/W{n}"),
                    title: Some(format!("Result {n}")),
                    abstract_inverted_index: Some(index),
                    publication_year: Some(2022),
                    cited_by_count: (n * 37) % 11,
                    ..Default::default()
                }
            })
            .collect())
    }
}

struct Unreachable {
    calls: AtomicU32,
}

#[async_trait]
impl ScholarlySearch for Unreachable {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<Work>, SearchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Err(SearchError::Status { status: 504, body: format!("gateway timeout ({n})") })
    }
}

/// Answers by stage, whatever order the requests arrive in.
struct ByStage;

#[async_trait]
impl LlmProvider for ByStage {
    fn name(&self) -> &str {
        "by-stage"
    }

    async fn complete_stream(&self, request: LlmRequest) -> LlmResult<LlmStream> {
        let system = request.messages.first().map(|m| m.content.as_str()).unwrap_or_default();
        let reply = if system.starts_with("You plan") {
            PLAN
        } else if system.starts_with("You write structured") {
            SUMMARY
        } else {
            REPORT
        };
        MockProvider::replies([reply]).complete_stream(request).await
    }
}

fn assistant(llm: Arc<dyn LlmProvider>, search: Arc<dyn ScholarlySearch>) -> ResearchAssistant {
    ResearchAssistant::builder(llm, search).build().unwrap()
}

fn scripted() -> Arc<MockProvider> {
    Arc::new(MockProvider::replies([PLAN, SUMMARY, REPORT]))
}

// ===========================================================================
// Scenario A: plain research run, no enrichment
// ===========================================================================

#[tokio::test]
async fn scenario_a_research_without_enrichment() {
    let assistant = assistant(scripted(), Arc::new(Catalogue));
    let outcome = assistant.run(QUERY, RunSettings::default(), None).await.unwrap();

    assert_eq!(outcome.path, vec!["plan", "retrieve", "synthesize", "format"]);
    let state = outcome.state;
    assert!(!state.formatted_report.get().unwrap().is_empty());
    assert!(!state.summary.get().unwrap().topic.is_empty());

    let records = state.records.get().unwrap();
    assert_eq!(records.len(), 5);
    assert!(records.windows(2).all(|w| w[0].cited_by_count >= w[1].cited_by_count));
}

// ===========================================================================
// Scenario B: outer run dispatches "paper" queries to research
// ===========================================================================

#[tokio::test]
async fn scenario_b_paper_query_goes_through_research() {
    let orchestrator = Orchestrator::new(Arc::new(assistant(scripted(), Arc::new(Catalogue))), RunSettings::default()).unwrap();
    let reply = orchestrator.invoke("Which paper introduced surface codes?").await.unwrap();

    assert_eq!(reply.agents_visited, vec![ROUTER_AGENT, RESEARCH_AGENT, FINAL_FORMATTER]);
    assert_eq!(reply.tools_used, vec!["run_research_assistant"]);
    assert_eq!(reply.final_answer, REPORT);
}

// ===========================================================================
// Scenario C: malformed plan aborts the run
// ===========================================================================

#[tokio::test]
async fn scenario_c_malformed_plan_aborts() {
    let llm = Arc::new(MockProvider::replies(["{\"keywords\": [\"quantum\"", SUMMARY, REPORT]));
    let assistant = assistant(llm.clone(), Arc::new(Catalogue));
    let (tx, mut rx) = mpsc::channel(32);

    let err = assistant.run(QUERY, RunSettings::default(), Some(tx)).await.unwrap_err();
    assert!(matches!(err, Error::Planning { .. }));
    assert!(err.to_string().contains("{\"keywords\": [\"quantum\""));

    let mut written = Vec::new();
    let mut failed_at = None;
    while let Some(event) = rx.recv().await {
        match event {
            GraphEvent::NodeCompleted { fields, .. } => written.extend(fields),
            GraphEvent::Failed { node, .. } => failed_at = Some(node),
            _ => {}
        }
    }
    assert_eq!(failed_at.as_deref(), Some("plan"));
    assert!(!written.contains(&"summary"));
    assert!(!written.contains(&"formatted_report"));
    assert_eq!(llm.call_count().await, 1);
}

#[tokio::test]
async fn unread_event_channel_does_not_block_the_run() {
    let assistant = assistant(scripted(), Arc::new(Catalogue));
    let (tx, rx) = mpsc::channel(1);

    let run = assistant.run(QUERY, RunSettings::default(), Some(tx));
    let outcome = tokio::time::timeout(Duration::from_secs(3), run)
        .await
        .expect("run waited on the event observer")
        .unwrap();
    assert_eq!(outcome.path.last().map(String::as_str), Some("format"));
    drop(rx);
}

// ===========================================================================
// Scenario D: retrieval keeps failing
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn scenario_d_retrieval_exhausts_retries() {
    let search = Arc::new(Unreachable { calls: AtomicU32::new(0) });
    let assistant = assistant(scripted(), search.clone());
    let start = tokio::time::Instant::now();

    let err = assistant.invoke(QUERY, RunSettings::default()).await.unwrap_err();
    match &err {
        Error::Retrieval { attempts, message } => {
            assert_eq!(*attempts, 3);
            assert!(message.contains("gateway timeout (3)"));
        }
        other => panic!("expected Retrieval, got {other:?}"),
    }
    assert_eq!(search.calls.load(Ordering::SeqCst), 3);

    let waited = start.elapsed();
    assert!(waited >= Duration::from_secs(4) && waited < Duration::from_millis(4_100), "waited {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn scenario_d_aborts_the_outer_run_too() {
    let search = Arc::new(Unreachable { calls: AtomicU32::new(0) });
    let orchestrator = Orchestrator::new(Arc::new(assistant(scripted(), search)), RunSettings::default()).unwrap();
    let err = orchestrator.invoke("recent literature on qubits").await.unwrap_err();
    assert!(matches!(err, Error::Retrieval { attempts: 3, .. }));
}

// ===========================================================================
// Independent runs
// ===========================================================================

#[tokio::test]
async fn concurrent_runs_do_not_share_state() {
    let assistant = assistant(Arc::new(ByStage), Arc::new(Catalogue));

    let (a, b) = tokio::join!(
        assistant.invoke("research on qubits", RunSettings { max_results: 2, ..Default::default() }),
        assistant.invoke("research on annealing", RunSettings { max_results: 4, ..Default::default() }),
    );
    assert_eq!(a.unwrap().records.len(), 2);
    assert_eq!(b.unwrap().records.len(), 4);
}

#[test]
fn blocking_boundary_for_synchronous_callers() {
    let orchestrator = Orchestrator::new(Arc::new(assistant(scripted(), Arc::new(Catalogue))), RunSettings::default()).unwrap();
    let reply = orchestrator.invoke_blocking("a study on qubits").unwrap();
    assert_eq!(reply.agents_visited.len(), 3);
}
