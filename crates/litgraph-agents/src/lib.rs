//! litgraph-agents: query orchestrator
//!
//! Classifies a query, dispatches it to a handler (the research handler runs
//! the whole research pipeline as one step) and finalizes the answer.

pub mod classify;
pub mod handlers;
pub mod orchestrator;
pub mod state;

pub use classify::{Classifier, QueryType};
pub use handlers::{
    ClassifyStage, FinalizeStage, PlaceholderHandler, ResearchDelegate, CODING_AGENT, FINAL_FORMATTER, NO_DRAFT,
    NO_REPORT, RESEARCH_AGENT, RESEARCH_TOOL, ROUTER_AGENT, THEORY_AGENT,
};
pub use orchestrator::{build_orchestrator_graph, ConversationMemory, HandlerRoute, Orchestrator, OrchestratorReply};
pub use state::{MemoryRecord, OrchestratorState, OrchestratorUpdate};
