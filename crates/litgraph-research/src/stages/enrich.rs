use super::{required, RunSettings};
use crate::enrich::AuthorStatsSource;
use crate::state::{ResearchState, ResearchUpdate};
use litgraph_core::{Error, Result};
use litgraph_graph::{Node, RunContext};
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches author statistics. A failing source degrades to "not available".
pub struct EnrichStage {
    source: Arc<dyn AuthorStatsSource>,
}

impl EnrichStage {
    pub fn new(source: Arc<dyn AuthorStatsSource>) -> Self {
        Self { source }
    }
}

#[async_trait::async_trait]
impl Node<ResearchState, RunSettings> for EnrichStage {
    async fn run(&self, state: &ResearchState, ctx: &RunContext<RunSettings>) -> Result<ResearchUpdate> {
        let plan = required(&state.plan, "plan", "enrich")?;
        match self.source.author_stats(plan).await {
            Ok(stats) => {
                info!(run_id = %ctx.run_id, entries = stats.len(), "author stats ready");
                Ok(ResearchUpdate {
                    author_stats: Some(stats),
                    ..Default::default()
                })
            }
            Err(e) => {
                let degraded = Error::EnrichmentUnavailable(e.to_string());
                warn!(run_id = %ctx.run_id, error = %degraded, "continuing without author stats");
                Ok(ResearchUpdate::default())
            }
        }
    }
}
