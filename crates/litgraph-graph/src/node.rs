//! Nodes, routes, and the run-scoped context they receive.

use crate::state::GraphState;
use litgraph_core::Result;
use uuid::Uuid;

/// Run-scoped context handed to every node of one run.
#[derive(Debug)]
pub struct RunContext<C = ()> {
    pub run_id: Uuid,
    pub graph: String,
    /// 1-based index of the node currently executing.
    pub step: usize,
    /// Per-run configuration supplied by the caller.
    pub config: C,
}

impl<C> RunContext<C> {
    pub fn new(graph: impl Into<String>, config: C) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            graph: graph.into(),
            step: 0,
            config,
        }
    }
}

/// A stage: reads the state and returns a partial update.
///
/// Nodes never mutate the state they are given; the executor merges
/// the returned update.
#[async_trait::async_trait]
pub trait Node<S: GraphState, C: Send + Sync = ()>: Send + Sync {
    async fn run(&self, state: &S, ctx: &RunContext<C>) -> Result<S::Update>;
}

/// Adapter for synchronous stages written as plain functions.
pub struct FnNode<F>(pub F);

#[async_trait::async_trait]
impl<S, C, F> Node<S, C> for FnNode<F>
where
    S: GraphState,
    C: Send + Sync,
    F: Fn(&S, &RunContext<C>) -> Result<S::Update> + Send + Sync,
{
    async fn run(&self, state: &S, ctx: &RunContext<C>) -> Result<S::Update> {
        (self.0)(state, ctx)
    }
}

/// Closed set of branch labels a router may return.
///
/// `ALL` must list every value; graph compilation checks each one has a branch.
pub trait Route: Copy + Send + Sync + std::fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn key(self) -> &'static str;
}
