//! The aggregated edge set handed from aggregation to ranking.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::types::Edge;

/// Immutable set of weighted directed edges.
///
/// Edges are kept sorted by (sender, receiver) so that every consumer walks
/// them in the same order and floating-point sums are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSet {
    edges: Vec<Edge>,
}

impl EdgeSet {
    /// Build from pair counts. Zero counts are dropped.
    pub(crate) fn from_counts(counts: HashMap<(Arc<str>, Arc<str>), u64>) -> Self {
        let mut edges: Vec<Edge> = counts
            .into_iter()
            .filter(|(_, weight)| *weight > 0)
            .map(|((sender, receiver), weight)| Edge {
                sender,
                receiver,
                weight,
            })
            .collect();
        edges.sort_by(|a, b| {
            a.sender
                .cmp(&b.sender)
                .then_with(|| a.receiver.cmp(&b.receiver))
        });
        Self { edges }
    }

    /// Number of distinct edges (not messages).
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn get(&self, sender: &str, receiver: &str) -> Option<&Edge> {
        self.edges
            .binary_search_by(|e| {
                e.sender
                    .as_ref()
                    .cmp(sender)
                    .then_with(|| e.receiver.as_ref().cmp(receiver))
            })
            .ok()
            .map(|i| &self.edges[i])
    }

    /// Sum of weights, i.e. the number of messages aggregated.
    pub fn total_weight(&self) -> u64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    pub fn self_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_self_edge()).count()
    }

    /// Every identity that appears as a sender or receiver, sorted.
    pub fn nodes(&self) -> Vec<Arc<str>> {
        let set: BTreeSet<&Arc<str>> = self
            .edges
            .iter()
            .flat_map(|e| [&e.sender, &e.receiver])
            .collect();
        set.into_iter().cloned().collect()
    }

    /// petgraph view: identities as node weights, message counts as edge
    /// weights. Node indices follow sorted identity order.
    pub fn to_digraph(&self) -> DiGraph<Arc<str>, u64> {
        let nodes = self.nodes();
        let mut graph = DiGraph::with_capacity(nodes.len(), self.edges.len());
        let mut index: HashMap<Arc<str>, NodeIndex> = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let idx = graph.add_node(Arc::clone(&node));
            index.insert(node, idx);
        }

        for edge in &self.edges {
            let (Some(&from), Some(&to)) = (index.get(&edge.sender), index.get(&edge.receiver))
            else {
                continue;
            };
            graph.add_edge(from, to, edge.weight);
        }

        graph
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

impl FromIterator<Edge> for EdgeSet {
    /// Edges with the same ordered pair are merged by summing weights.
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        let mut counts: HashMap<(Arc<str>, Arc<str>), u64> = HashMap::new();
        for edge in iter {
            *counts.entry((edge.sender, edge.receiver)).or_insert(0) += edge.weight;
        }
        Self::from_counts(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::visit::EdgeRef;

    fn sample() -> EdgeSet {
        vec![
            Edge::new("b", "c", 1),
            Edge::new("a", "b", 2),
            Edge::new("a", "a", 1),
            Edge::new("a", "b", 1),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_from_iter_merges_and_sorts() {
        let edges = sample();
        let got: Vec<_> = edges
            .iter()
            .map(|e| (e.sender.as_ref(), e.receiver.as_ref(), e.weight))
            .collect();
        assert_eq!(got, vec![("a", "a", 1), ("a", "b", 3), ("b", "c", 1)]);
    }

    #[test]
    fn test_lookup_and_totals() {
        let edges = sample();
        assert_eq!(edges.get("a", "b").map(|e| e.weight), Some(3));
        assert!(edges.get("b", "a").is_none());
        assert_eq!(edges.len(), 3);
        assert_eq!(edges.total_weight(), 5);
        assert_eq!(edges.self_edge_count(), 1);
    }

    #[test]
    fn test_nodes_cover_senders_and_receivers() {
        let nodes: Vec<String> = sample().nodes().iter().map(|n| n.to_string()).collect();
        assert_eq!(nodes, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_digraph_view() {
        let graph = sample().to_digraph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);

        let ab = graph
            .edge_references()
            .find(|e| graph[e.source()].as_ref() == "a" && graph[e.target()].as_ref() == "b")
            .map(|e| *e.weight());
        assert_eq!(ab, Some(3));
    }

    #[test]
    fn test_empty_set() {
        let edges = EdgeSet::default();
        assert!(edges.is_empty());
        assert!(edges.nodes().is_empty());
        assert_eq!(edges.to_digraph().node_count(), 0);
    }
}
