//! Graph executor: walks a compiled graph from entry to `END`.

use crate::builder::{ConditionalEdges, END};
use crate::node::{Node, RunContext};
use crate::state::GraphState;
use chrono::{DateTime, Utc};
use litgraph_core::{Error, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Executor limits.
#[derive(Clone, Debug)]
pub struct GraphConfig {
    /// Maximum node executions in one run.
    pub recursion_limit: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { recursion_limit: 25 }
    }
}

pub(crate) enum Transition<S> {
    Static(String),
    Conditional(ConditionalEdges<S>),
}

impl<S> Transition<S> {
    pub(crate) fn targets(&self) -> Vec<&str> {
        match self {
            Self::Static(t) => vec![t.as_str()],
            Self::Conditional(c) => c.branches.values().map(|t| t.as_str()).collect(),
        }
    }
}

/// Progress notifications for one run.
#[derive(Clone, Debug)]
pub enum GraphEvent {
    NodeStarted { run_id: Uuid, node: String, step: usize },
    NodeCompleted { run_id: Uuid, node: String, step: usize, fields: Vec<&'static str> },
    Routed { run_id: Uuid, from: String, route: &'static str, to: String },
    Finished { run_id: Uuid, steps: usize },
    Failed { run_id: Uuid, node: String, error: String },
}

/// Terminal state of a run plus bookkeeping.
#[derive(Clone, Debug)]
pub struct RunOutcome<S> {
    pub run_id: Uuid,
    pub state: S,
    /// Executed nodes, in order.
    pub path: Vec<String>,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

impl<S> RunOutcome<S> {
    pub fn wall_ms(&self) -> i64 {
        (self.finished - self.started).num_milliseconds()
    }
}

/// A validated, runnable graph. Holds no run state; every call to
/// [`CompiledGraph::run`] owns its own state instance.
pub struct CompiledGraph<S: GraphState, C: Send + Sync = ()> {
    name: String,
    nodes: HashMap<String, Arc<dyn Node<S, C>>>,
    transitions: HashMap<String, Transition<S>>,
    entry: String,
    config: GraphConfig,
}

impl<S: GraphState, C: Send + Sync + 'static> CompiledGraph<S, C> {
    pub(crate) fn new(
        name: String,
        nodes: HashMap<String, Arc<dyn Node<S, C>>>,
        transitions: HashMap<String, Transition<S>>,
        entry: String,
        config: GraphConfig,
    ) -> Self {
        Self {
            name,
            nodes,
            transitions,
            entry,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Run to completion and return the terminal state.
    pub async fn invoke(&self, initial: S, config: C) -> Result<S> {
        self.run(initial, config).await.map(|outcome| outcome.state)
    }

    pub async fn run(&self, initial: S, config: C) -> Result<RunOutcome<S>> {
        self.run_with_events(initial, config, None).await
    }

    /// Run to completion, reporting progress on `events` when given.
    ///
    /// Events are sent with `try_send`; a slow observer loses events rather
    /// than holding up the run. The first node error aborts the run and is returned unchanged.
    pub async fn run_with_events(
        &self,
        initial: S,
        config: C,
        events: Option<mpsc::Sender<GraphEvent>>,
    ) -> Result<RunOutcome<S>> {
        let mut ctx = RunContext::new(self.name.clone(), config);
        let run_id = ctx.run_id;
        let started = Utc::now();
        let mut state = initial;
        let mut path = Vec::new();
        let mut current = self.entry.clone();

        info!(graph = %self.name, %run_id, entry = %current, "run started");

        loop {
            if ctx.step >= self.config.recursion_limit {
                let err = Error::RecursionLimit { limit: self.config.recursion_limit };
                return Err(self.fail(&events, run_id, &current, err));
            }
            ctx.step += 1;

            let node = self.nodes.get(&current).ok_or_else(|| {
                Error::configuration(format!("graph '{}': unknown node '{}'", self.name, current))
            })?;

            emit(&events, GraphEvent::NodeStarted { run_id, node: current.clone(), step: ctx.step });
            debug!(graph = %self.name, %run_id, node = %current, step = ctx.step, "node started");

            let update = match node.run(&state, &ctx).await {
                Ok(update) => update,
                Err(e) => return Err(self.fail(&events, run_id, &current, e)),
            };
            let fields = match state.merge(update) {
                Ok(fields) => fields,
                Err(e) => return Err(self.fail(&events, run_id, &current, e)),
            };

            debug!(graph = %self.name, %run_id, node = %current, ?fields, "node completed");
            path.push(current.clone());
            emit(&events, GraphEvent::NodeCompleted {
                run_id,
                node: current.clone(),
                step: ctx.step,
                fields,
            });

            let next = match self.transitions.get(&current) {
                Some(Transition::Static(to)) => to.clone(),
                Some(Transition::Conditional(edges)) => {
                    let route = (edges.router)(&state);
                    let to = edges.branches.get(route).cloned().ok_or_else(|| {
                        Error::configuration(format!(
                            "graph '{}': route '{}' from '{}' has no branch",
                            self.name, route, current
                        ))
                    })?;
                    info!(graph = %self.name, %run_id, from = %current, route, to = %to, "routed");
                    emit(&events, GraphEvent::Routed { run_id, from: current.clone(), route, to: to.clone() });
                    to
                }
                None => {
                    return Err(Error::configuration(format!(
                        "graph '{}': node '{}' has no outgoing edge",
                        self.name, current
                    )))
                }
            };

            if next == END {
                let steps = path.len();
                let outcome = RunOutcome {
                    run_id,
                    state,
                    path,
                    started,
                    finished: Utc::now(),
                };
                info!(graph = %self.name, %run_id, steps, wall_ms = outcome.wall_ms(), "run finished");
                emit(&events, GraphEvent::Finished { run_id, steps });
                return Ok(outcome);
            }
            current = next;
        }
    }

    fn fail(
        &self,
        events: &Option<mpsc::Sender<GraphEvent>>,
        run_id: Uuid,
        node: &str,
        error: Error,
    ) -> Error {
        warn!(graph = %self.name, %run_id, node, error = %error, "run failed");
        emit(events, GraphEvent::Failed { run_id, node: node.to_string(), error: error.to_string() });
        error
    }
}

/// Never waits on the observer: a full or closed channel drops the event.
fn emit(events: &Option<mpsc::Sender<GraphEvent>>, event: GraphEvent) {
    if let Some(tx) = events {
        if let Err(e) = tx.try_send(event) {
            debug!(event = ?e.into_inner(), "progress event dropped");
        }
    }
}

/// Drive a future to completion from synchronous code.
///
/// Builds a single-threaded runtime for the call. Calling this from inside
/// an async runtime is a configuration error rather than a panic.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Error::configuration(
            "blocking invocation requested from inside an async runtime; await the async API instead",
        ));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::configuration(format!("failed to start runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}
