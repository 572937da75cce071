//! litgraph graph - stage graphs over a shared, field-merged state
//!
//! A graph is a set of named nodes joined by static or conditional edges.
//! Each node reads the current state and returns a sparse update; the
//! executor merges it field by field using the strategy each field declares.
//! Runs are strictly sequential: one node at a time, entry to `END`.

pub mod builder;
pub mod executor;
pub mod node;
pub mod retry;
pub mod state;

pub use builder::{StateGraph, END};
pub use executor::{block_on, CompiledGraph, GraphConfig, GraphEvent, RunOutcome};
pub use node::{FnNode, Node, Route, RunContext};
pub use retry::{RetryError, RetryPolicy};
pub use state::{merge_field, Append, Channel, FieldSpec, GraphState, MergeStrategy, Overwrite, WriteOnce};
