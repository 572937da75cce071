//! Graph builder and compile-time validation.

use crate::executor::{CompiledGraph, GraphConfig, Transition};
use crate::node::{Node, Route};
use crate::state::GraphState;
use litgraph_core::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Terminal marker: an edge to `END` finishes the run.
pub const END: &str = "__end__";

type RouterFn<S> = Arc<dyn Fn(&S) -> &'static str + Send + Sync>;

pub(crate) struct ConditionalEdges<S> {
    pub(crate) router: RouterFn<S>,
    /// Every label the route type can produce.
    pub(crate) labels: Vec<&'static str>,
    pub(crate) branches: HashMap<&'static str, String>,
}

impl<S> Clone for ConditionalEdges<S> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            labels: self.labels.clone(),
            branches: self.branches.clone(),
        }
    }
}

/// Mutable graph description. Call [`StateGraph::compile`] to get a runnable graph.
pub struct StateGraph<S: GraphState, C: Send + Sync = ()> {
    name: String,
    nodes: Vec<(String, Arc<dyn Node<S, C>>)>,
    edges: Vec<(String, String)>,
    conditional: Vec<(String, ConditionalEdges<S>)>,
    entry: Option<String>,
    config: GraphConfig,
}

impl<S: GraphState, C: Send + Sync + 'static> StateGraph<S, C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            conditional: Vec::new(),
            entry: None,
            config: GraphConfig::default(),
        }
    }

    pub fn add_node(&mut self, name: impl Into<String>, node: impl Node<S, C> + 'static) -> &mut Self {
        self.nodes.push((name.into(), Arc::new(node)));
        self
    }

    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry = Some(name.into());
        self
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Branch after `from` on the value `router` returns.
    ///
    /// `branches` maps each route value to a node name (or [`END`]).
    pub fn add_conditional_edges<R, F, I, T>(&mut self, from: impl Into<String>, router: F, branches: I) -> &mut Self
    where
        R: Route,
        F: Fn(&S) -> R + Send + Sync + 'static,
        I: IntoIterator<Item = (R, T)>,
        T: Into<String>,
    {
        let edges = ConditionalEdges {
            router: Arc::new(move |state: &S| router(state).key()),
            labels: R::ALL.iter().map(|r| r.key()).collect(),
            branches: branches.into_iter().map(|(r, t)| (r.key(), t.into())).collect(),
        };
        self.conditional.push((from.into(), edges));
        self
    }

    pub fn with_config(&mut self, config: GraphConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Validate the description and produce a runnable graph.
    ///
    /// Rejects: missing/unknown entry, duplicate node names, edges naming unknown
    /// nodes, nodes with zero or several outgoing edge sets, and route values
    /// without a branch.
    pub fn compile(self) -> Result<CompiledGraph<S, C>> {
        let fail = |msg: String| Error::configuration(format!("graph '{}': {}", self.name, msg));

        let mut nodes = HashMap::new();
        for (name, node) in &self.nodes {
            if name == END {
                return Err(fail(format!("'{}' is reserved", END)));
            }
            if nodes.insert(name.clone(), node.clone()).is_some() {
                return Err(fail(format!("duplicate node '{}'", name)));
            }
        }

        let entry = self.entry.clone().ok_or_else(|| fail("no entry point".into()))?;
        if !nodes.contains_key(&entry) {
            return Err(fail(format!("entry point '{}' is not a node", entry)));
        }

        let known = |target: &str| target == END || nodes.contains_key(target);
        let mut transitions: HashMap<String, Transition<S>> = HashMap::new();

        for (from, to) in &self.edges {
            if !nodes.contains_key(from) {
                return Err(fail(format!("edge from unknown node '{}'", from)));
            }
            if !known(to.as_str()) {
                return Err(fail(format!("edge {} -> unknown node '{}'", from, to)));
            }
            if transitions.insert(from.clone(), Transition::Static(to.clone())).is_some() {
                return Err(fail(format!("node '{}' has more than one outgoing edge", from)));
            }
        }

        for (from, edges) in &self.conditional {
            if !nodes.contains_key(from) {
                return Err(fail(format!("conditional edges from unknown node '{}'", from)));
            }
            for label in &edges.labels {
                let target = edges
                    .branches
                    .get(label)
                    .ok_or_else(|| fail(format!("route '{}' from '{}' has no branch", label, from)))?;
                if !known(target.as_str()) {
                    return Err(fail(format!("route '{}' from '{}' -> unknown node '{}'", label, from, target)));
                }
            }
            if transitions.insert(from.clone(), Transition::Conditional(edges.clone())).is_some() {
                return Err(fail(format!("node '{}' has more than one set of outgoing edges", from)));
            }
        }

        for name in nodes.keys() {
            if !transitions.contains_key(name) {
                return Err(fail(format!("node '{}' has no outgoing edge", name)));
            }
        }

        for name in unreachable(&entry, &transitions) {
            warn!(graph = %self.name, node = %name, "node is unreachable from the entry point");
        }

        debug!(graph = %self.name, nodes = nodes.len(), entry = %entry, "graph compiled");

        Ok(CompiledGraph::new(self.name, nodes, transitions, entry, self.config))
    }
}

fn unreachable<S>(entry: &str, transitions: &HashMap<String, Transition<S>>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack = vec![entry];
    while let Some(name) = stack.pop() {
        if name == END || !seen.insert(name) {
            continue;
        }
        if let Some(t) = transitions.get(name) {
            stack.extend(t.targets());
        }
    }
    let mut missing: Vec<String> = transitions
        .keys()
        .filter(|n| !seen.contains(n.as_str()))
        .cloned()
        .collect();
    missing.sort();
    missing
}
