//! Runtime workflow representation using a directed graph.
//!
//! Nodes live in a petgraph arena in declaration order, with an id index on
//! the side. Node indices therefore double as declaration positions, which is
//! what the scheduler uses to break ties between simultaneously ready nodes.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::{
    FlowError, Result, WorkflowModel,
    workflow::node::{Node, NodeId},
};

/// Runtime workflow representation as a directed graph.
///
/// Construction validates node id uniqueness and edge endpoints. Acyclicity
/// is only checked when [`Workflow::schedule`] runs.
#[derive(Debug, Clone)]
pub struct Workflow {
    graph: DiGraph<Node, ()>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Workflow {
    /// Output a human-readable representation of the workflow graph
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Workflow Graph ===".to_string());
        lines.push(format!("Nodes: {}, Edges: {}", self.graph.node_count(), self.graph.edge_count()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            let timeout = node.timeout_sec().map(|t| format!("{}s", t)).unwrap_or_else(|| "none".to_string());
            lines.push(format!("[{}] tool: {}, retry: {}, timeout: {}", node.id, node.tool, node.retry, timeout));
        }
        lines.push(String::new());

        lines.push("--- Graph Structure ---".to_string());
        for idx in self.graph.node_indices() {
            let outgoing: Vec<&str> = self.graph.edges_directed(idx, Direction::Outgoing).map(|e| self.graph[e.target()].id.as_str()).collect();

            if outgoing.is_empty() {
                lines.push(format!("{} -> (end)", self.graph[idx].id));
            } else {
                lines.push(format!("{} -> {}", self.graph[idx].id, outgoing.join(", ")));
            }
        }

        lines.join("\n")
    }

    /// get node by id
    pub fn get_node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    /// all nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Computes a dependency-respecting execution order.
    ///
    /// Kahn's algorithm with a min-heap over node indices: among ready nodes
    /// the earliest declared one always goes first, so the same workflow
    /// always yields the same order.
    pub fn schedule(&self) -> Result<Vec<NodeId>> {
        let mut in_degree: Vec<usize> = self.graph.node_indices().map(|idx| self.graph.edges_directed(idx, Direction::Incoming).count()).collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self.graph.node_indices().filter(|idx| in_degree[idx.index()] == 0).map(Reverse).collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(self.graph[idx].id.clone());

            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                let target = edge.target();
                in_degree[target.index()] -= 1;
                if in_degree[target.index()] == 0 {
                    ready.push(Reverse(target));
                }
            }
        }

        if order.len() < self.graph.node_count() {
            let stuck = self.graph.node_indices().filter(|idx| in_degree[idx.index()] > 0).map(|idx| self.graph[idx].id.clone()).collect();
            return Err(FlowError::Cycle(stuck));
        }

        Ok(order)
    }
}

impl TryFrom<&WorkflowModel> for Workflow {
    type Error = FlowError;

    fn try_from(model: &WorkflowModel) -> Result<Self> {
        let mut graph: DiGraph<Node, ()> = DiGraph::with_capacity(model.nodes.len(), model.edges.len());
        let mut index = HashMap::with_capacity(model.nodes.len());

        for node in model.nodes.iter() {
            if index.contains_key(&node.id) {
                return Err(FlowError::Spec(format!("duplicate node id '{}'", node.id)));
            }
            let node = Node::new(node)?;
            let nid = node.id.clone();
            let node_idx = graph.add_node(node);
            index.insert(nid, node_idx);
        }
        for edge in model.edges.iter() {
            let source = index.get(&edge.source).ok_or_else(|| FlowError::Spec(format!("edge source node '{}' not found", edge.source)))?;
            let target = index.get(&edge.target).ok_or_else(|| FlowError::Spec(format!("edge target node '{}' not found", edge.target)))?;
            graph.add_edge(*source, *target, ());
        }

        Ok(Self {
            graph,
            index,
        })
    }
}

/// Builds the graph for `model` and returns its execution order.
pub fn schedule(model: &WorkflowModel) -> Result<Vec<NodeId>> {
    Workflow::try_from(model)?.schedule()
}
