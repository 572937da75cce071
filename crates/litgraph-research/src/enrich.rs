//! Author reputation source used by the enrich stage.

use crate::models::{AuthorStats, Plan};
use async_trait::async_trait;
use litgraph_core::Result;
use serde_json::json;

#[async_trait]
pub trait AuthorStatsSource: Send + Sync {
    async fn author_stats(&self, plan: &Plan) -> Result<AuthorStats>;
}

/// Fixed sample payload. Stands in until a real author metrics service is wired up.
pub struct SampleAuthorStats;

#[async_trait]
impl AuthorStatsSource for SampleAuthorStats {
    async fn author_stats(&self, _plan: &Plan) -> Result<AuthorStats> {
        let mut stats = AuthorStats::new();
        stats.insert("note".into(), json!("Mocked author stats based on keywords"));
        stats.insert(
            "top_authors".into(),
            json!([
                {"name": "John Preskill", "h_index": 95},
                {"name": "Michelle Simmons", "h_index": 78}
            ]),
        );
        Ok(stats)
    }
}
