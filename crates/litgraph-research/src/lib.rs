//! litgraph-research: literature review pipeline
//!
//! plan -> retrieve -> (enrich) -> synthesize -> format, built on the
//! litgraph-graph engine. [`ResearchAssistant`] is the invocation boundary.

pub mod abstracts;
pub mod assistant;
pub mod enrich;
pub mod models;
pub mod prompts;
pub mod search;
pub mod stages;
pub mod state;

pub use abstracts::{invert_abstract, reconstruct_abstract, InvertedIndex};
pub use assistant::{build_research_graph, ResearchAssistant, ResearchAssistantBuilder, ResearchReport, ResearchRoute};
pub use enrich::{AuthorStatsSource, SampleAuthorStats};
pub use models::{AuthorStats, Plan, Record, Summary};
pub use search::{OpenAlexClient, ScholarlySearch, SearchError, SearchQuery, Work};
pub use stages::{RunSettings, MAX_RECORDS};
pub use state::{ResearchState, ResearchUpdate};
