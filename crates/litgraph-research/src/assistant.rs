//! Research graph wiring and the invocation boundary.

use crate::enrich::{AuthorStatsSource, SampleAuthorStats};
use crate::models::{Plan, Record, Summary};
use crate::search::{OpenAlexClient, ScholarlySearch};
use crate::stages::{EnrichStage, FormatStage, PlanStage, RetrieveStage, RunSettings, SynthesizeStage};
use crate::state::ResearchState;
use litgraph_core::config::Settings;
use litgraph_core::{Error, Result};
use litgraph_graph::{block_on, CompiledGraph, GraphConfig, GraphEvent, RetryPolicy, Route, RunOutcome, StateGraph, END};
use litgraph_llm::{LlmProvider, OpenAiCompatibleProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Where the run goes after retrieval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResearchRoute {
    Enrich,
    Synthesize,
}

impl Route for ResearchRoute {
    const ALL: &'static [Self] = &[Self::Enrich, Self::Synthesize];

    fn key(self) -> &'static str {
        match self {
            Self::Enrich => "enrich",
            Self::Synthesize => "synthesize",
        }
    }
}

impl ResearchRoute {
    /// Enrich iff the plan asked for author statistics.
    pub fn after_retrieve(state: &ResearchState) -> Self {
        match state.plan.get() {
            Some(plan) if plan.need_author_stats => Self::Enrich,
            _ => Self::Synthesize,
        }
    }
}

/// Build the inner graph: plan -> retrieve -> (enrich) -> synthesize -> format.
pub fn build_research_graph(
    llm: Arc<dyn LlmProvider>,
    search: Arc<dyn ScholarlySearch>,
    author_stats: Arc<dyn AuthorStatsSource>,
    retry: RetryPolicy,
    config: GraphConfig,
) -> Result<CompiledGraph<ResearchState, RunSettings>> {
    let mut graph: StateGraph<ResearchState, RunSettings> = StateGraph::new("research");
    graph
        .add_node("plan", PlanStage::new(llm.clone()))
        .add_node("retrieve", RetrieveStage::new(search, retry))
        .add_node("enrich", EnrichStage::new(author_stats))
        .add_node("synthesize", SynthesizeStage::new(llm.clone()))
        .add_node("format", FormatStage::new(llm))
        .set_entry_point("plan")
        .add_edge("plan", "retrieve")
        .add_conditional_edges(
            "retrieve",
            ResearchRoute::after_retrieve,
            [
                (ResearchRoute::Enrich, "enrich"),
                (ResearchRoute::Synthesize, "synthesize"),
            ],
        )
        .add_edge("enrich", "synthesize")
        .add_edge("synthesize", "format")
        .add_edge("format", END)
        .with_config(config);
    graph.compile()
}

/// What a research run hands back to its caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResearchReport {
    pub plan: Option<Plan>,
    pub summary: Option<Summary>,
    pub formatted_report: Option<String>,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl From<ResearchState> for ResearchReport {
    fn from(state: ResearchState) -> Self {
        Self {
            plan: state.plan.into_inner(),
            summary: state.summary.into_inner(),
            formatted_report: state.formatted_report.into_inner(),
            records: state.records.into_inner().unwrap_or_default(),
        }
    }
}

/// The compiled research pipeline. Cheap to share; every invocation runs on
/// its own fresh state.
pub struct ResearchAssistant {
    graph: CompiledGraph<ResearchState, RunSettings>,
}

impl ResearchAssistant {
    pub fn builder(llm: Arc<dyn LlmProvider>, search: Arc<dyn ScholarlySearch>) -> ResearchAssistantBuilder {
        ResearchAssistantBuilder {
            llm,
            search,
            author_stats: Arc::new(SampleAuthorStats),
            retry: RetryPolicy::default(),
            graph: GraphConfig::default(),
        }
    }

    /// Real providers from settings. Fails when the API key is missing.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let key = settings.require_api_key()?;
        let llm = OpenAiCompatibleProvider::new(key).with_base_url(settings.llm.base_url.clone());
        let search = OpenAlexClient::new(&settings.search)
            .map_err(|e| Error::configuration(format!("search client: {e}")))?;
        Self::builder(Arc::new(llm), Arc::new(search))
            .retry(RetryPolicy::new(settings.retry.max_attempts, settings.retry.delay()))
            .graph_config(GraphConfig {
                recursion_limit: settings.graph.recursion_limit,
            })
            .build()
    }

    pub fn graph(&self) -> &CompiledGraph<ResearchState, RunSettings> {
        &self.graph
    }

    pub async fn invoke(&self, query: &str, settings: RunSettings) -> Result<ResearchReport> {
        self.run(query, settings, None).await.map(|outcome| outcome.state.into())
    }

    /// Full run outcome, optionally streaming progress events.
    pub async fn run(
        &self,
        query: &str,
        settings: RunSettings,
        events: Option<mpsc::Sender<GraphEvent>>,
    ) -> Result<RunOutcome<ResearchState>> {
        info!(model = %settings.model, max_results = settings.max_results, "research run requested");
        self.graph.run_with_events(ResearchState::new(query), settings, events).await
    }

    /// Blocking form of [`ResearchAssistant::invoke`] for synchronous callers.
    pub fn invoke_blocking(&self, query: &str, settings: RunSettings) -> Result<ResearchReport> {
        block_on(self.invoke(query, settings))?
    }
}

pub struct ResearchAssistantBuilder {
    llm: Arc<dyn LlmProvider>,
    search: Arc<dyn ScholarlySearch>,
    author_stats: Arc<dyn AuthorStatsSource>,
    retry: RetryPolicy,
    graph: GraphConfig,
}

impl ResearchAssistantBuilder {
    pub fn author_stats(mut self, source: Arc<dyn AuthorStatsSource>) -> Self {
        self.author_stats = source;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn graph_config(mut self, config: GraphConfig) -> Self {
        self.graph = config;
        self
    }

    pub fn build(self) -> Result<ResearchAssistant> {
        let graph = build_research_graph(self.llm, self.search, self.author_stats, self.retry, self.graph)?;
        Ok(ResearchAssistant { graph })
    }
}
