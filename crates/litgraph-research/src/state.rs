//! Shared state of one research run.

use crate::models::{AuthorStats, Plan, Record, Summary};
use litgraph_core::{Message, Result};
use litgraph_graph::{merge_field, Append, FieldSpec, GraphState, WriteOnce};

/// Every field but `conversation` is written at most once per run.
#[derive(Clone, Debug, Default)]
pub struct ResearchState {
    pub conversation: Append<Message>,
    pub plan: WriteOnce<Plan>,
    pub records: WriteOnce<Vec<Record>>,
    pub author_stats: WriteOnce<AuthorStats>,
    pub summary: WriteOnce<Summary>,
    pub formatted_report: WriteOnce<String>,
}

impl ResearchState {
    /// Fresh state seeded with the user query as the only message.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            conversation: Append::new(vec![Message::user(query)]),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct ResearchUpdate {
    pub conversation: Vec<Message>,
    pub plan: Option<Plan>,
    pub records: Option<Vec<Record>>,
    pub author_stats: Option<AuthorStats>,
    pub summary: Option<Summary>,
    pub formatted_report: Option<String>,
}

static SCHEMA: &[FieldSpec] = &[
    FieldSpec::of::<Append<Message>>("conversation"),
    FieldSpec::of::<WriteOnce<Plan>>("plan"),
    FieldSpec::of::<WriteOnce<Vec<Record>>>("records"),
    FieldSpec::of::<WriteOnce<AuthorStats>>("author_stats"),
    FieldSpec::of::<WriteOnce<Summary>>("summary"),
    FieldSpec::of::<WriteOnce<String>>("formatted_report"),
];

impl GraphState for ResearchState {
    type Update = ResearchUpdate;

    fn schema() -> &'static [FieldSpec] {
        SCHEMA
    }

    fn merge(&mut self, update: ResearchUpdate) -> Result<Vec<&'static str>> {
        let mut touched = Vec::new();
        merge_field(&mut touched, "conversation", &mut self.conversation, update.conversation)?;
        merge_field(&mut touched, "plan", &mut self.plan, update.plan)?;
        merge_field(&mut touched, "records", &mut self.records, update.records)?;
        merge_field(&mut touched, "author_stats", &mut self.author_stats, update.author_stats)?;
        merge_field(&mut touched, "summary", &mut self.summary, update.summary)?;
        merge_field(&mut touched, "formatted_report", &mut self.formatted_report, update.formatted_report)?;
        Ok(touched)
    }
}
