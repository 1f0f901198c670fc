//! The shared model dependency graph and its emission order.
//!
//! One directed graph per run, shared by reference across every module
//! session. Nodes are class names; an edge `A -> B` means A's declaration
//! references B. The graph accumulates monotonically and is never pruned.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;

#[derive(Debug, Default)]
pub struct ModelGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if it is not present yet. Idempotent.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&ix) = self.nodes.get(name) {
            return ix;
        }
        let ix = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), ix);
        ix
    }

    /// Insert the edge `from -> to`, creating missing endpoints. A
    /// dependency on an undeclared name is allowed to dangle here.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.add_node(from);
        let b = self.add_node(to);
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, ());
        }
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        match (self.nodes.get(from), self.nodes.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Emission order: postorder depth-first traversal started from every
    /// node in insertion order, each node reported once.
    ///
    /// Postorder guarantees a referenced class is visited before the class
    /// referencing it, which the downstream generator requires because it
    /// renders declarations in textual order without forward references.
    pub fn postorder(&self) -> Vec<String> {
        let mut order = Vec::new();
        let mut dfs = DfsPostOrder::empty(&self.graph);
        for start in self.graph.node_indices() {
            dfs.move_to(start);
            while let Some(ix) = dfs.next(&self.graph) {
                order.push(self.graph[ix].clone());
            }
        }
        order
    }
}
