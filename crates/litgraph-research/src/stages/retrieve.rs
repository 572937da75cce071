use super::{required, RunSettings};
use crate::search::{ScholarlySearch, SearchQuery};
use crate::state::{ResearchState, ResearchUpdate};
use litgraph_core::{Error, Result};
use litgraph_graph::{Node, RetryPolicy, RunContext};
use std::sync::Arc;
use tracing::info;

/// Runs the search under the retry policy, then ranks by citations and caps.
pub struct RetrieveStage {
    search: Arc<dyn ScholarlySearch>,
    retry: RetryPolicy,
}

impl RetrieveStage {
    pub fn new(search: Arc<dyn ScholarlySearch>, retry: RetryPolicy) -> Self {
        Self { search, retry }
    }
}

#[async_trait::async_trait]
impl Node<ResearchState, RunSettings> for RetrieveStage {
    async fn run(&self, state: &ResearchState, ctx: &RunContext<RunSettings>) -> Result<ResearchUpdate> {
        let plan = required(&state.plan, "plan", "retrieve")?;
        let cap = ctx.config.record_cap();
        if cap == 0 {
            return Ok(ResearchUpdate {
                records: Some(Vec::new()),
                ..Default::default()
            });
        }
        let query = SearchQuery {
            keywords: plan.keywords.clone(),
            min_year: plan.min_year,
            limit: cap,
        };

        let search = self.search.as_ref();
        let query = &query;
        let works = self
            .retry
            .run(search.name(), move |_| search.search(query))
            .await
            .map_err(|e| Error::Retrieval {
                attempts: e.attempts,
                message: e.last.to_string(),
            })?;

        let mut records: Vec<_> = works.into_iter().map(|w| w.into_record()).collect();
        records.sort_by(|a, b| b.cited_by_count.cmp(&a.cited_by_count));
        records.truncate(cap);

        info!(run_id = %ctx.run_id, source = search.name(), count = records.len(), "records retrieved");
        Ok(ResearchUpdate {
            records: Some(records),
            ..Default::default()
        })
    }
}
