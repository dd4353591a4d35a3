//! Power-iteration rank computation.
//!
//! The engine takes an immutable [`EdgeSet`] and returns a fresh
//! [`RankTable`]; nothing is carried between calls, so ranking the same edge
//! set twice gives identical scores.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::{RankError, Result};
use crate::graph::EdgeSet;
use crate::types::{RankMode, RankTable, RankingConfig};

/// PageRank-style importance calculator over a communication graph.
pub struct RankEngine {
    config: RankingConfig,
}

impl RankEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Rank every identity in the edge set.
    ///
    /// Fails with [`RankError::EmptyGraph`] before any arithmetic when there
    /// are no edges, and with [`RankError::InvalidConfig`] for out-of-range
    /// settings.
    pub fn rank(&self, edges: &EdgeSet) -> Result<RankTable> {
        self.config.validate()?;
        if edges.is_empty() {
            return Err(RankError::EmptyGraph);
        }

        let table = match self.config.mode {
            RankMode::Reference => self.rank_reference(edges),
            RankMode::Weighted => self.rank_weighted(edges),
        };

        tracing::debug!(
            mode = ?self.config.mode,
            rounds = self.config.rounds(),
            nodes = table.len(),
            edges = edges.len(),
            "ranked communication graph"
        );
        Ok(table)
    }

    /// Reference update rule.
    ///
    /// ```text
    /// PR₀(v)   = 1 / |E|                       for every node v
    /// PRₖ₊₁(v) = Σ  d · PRₖ(u) / |E|           over edges u → v
    /// ```
    ///
    /// |E| counts distinct edges, not nodes, and the edge weight does not
    /// scale the contribution. A node with no incoming edge scores 0 after
    /// the first round.
    fn rank_reference(&self, edges: &EdgeSet) -> RankTable {
        let nodes = edges.nodes();
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_ref(), i))
            .collect();

        let links: Vec<(usize, usize)> = edges
            .iter()
            .map(|e| (index[e.sender.as_ref()], index[e.receiver.as_ref()]))
            .collect();

        let edge_count = links.len() as f64;
        let damping = self.config.damping;

        let mut ranks = vec![1.0 / edge_count; nodes.len()];

        for _round in 0..self.config.rounds() {
            let mut next = vec![0.0; nodes.len()];
            for &(sender, receiver) in &links {
                next[receiver] += damping * ranks[sender] / edge_count;
            }
            ranks = next;
        }

        collect_table(nodes, ranks)
    }

    /// Weighted (textbook) update rule on the petgraph view.
    ///
    /// ```text
    /// PR(v) = (1-d)/N + d · Σ PR(u) · w(u,v) / W_out(u) + d · dangling / N
    /// ```
    ///
    /// Scores always sum to 1. Iterates until the L1 change between rounds
    /// drops below `N · tolerance`, capped at the configured round count.
    fn rank_weighted(&self, edges: &EdgeSet) -> RankTable {
        let graph = edges.to_digraph();
        let n = graph.node_count();
        let damping = self.config.damping;
        let teleport = (1.0 - damping) / n as f64;
        let threshold = self.config.tolerance().map(|tol| tol * n as f64);

        let out_weight: Vec<f64> = graph
            .node_indices()
            .map(|node| {
                graph
                    .edges_directed(node, Direction::Outgoing)
                    .map(|e| *e.weight() as f64)
                    .sum()
            })
            .collect();

        let mut ranks = vec![1.0 / n as f64; n];
        let mut new_ranks = vec![0.0; n];

        for round in 0..self.config.rounds() {
            let dangling_sum: f64 = graph
                .node_indices()
                .filter(|node| out_weight[node.index()] == 0.0)
                .map(|node| ranks[node.index()])
                .sum();

            for node in graph.node_indices() {
                let incoming_sum: f64 = graph
                    .edges_directed(node, Direction::Incoming)
                    .map(|e| {
                        let source = e.source().index();
                        ranks[source] * *e.weight() as f64 / out_weight[source]
                    })
                    .sum();

                new_ranks[node.index()] =
                    teleport + damping * incoming_sum + damping * dangling_sum / n as f64;
            }

            let change: f64 = ranks
                .iter()
                .zip(&new_ranks)
                .map(|(old, new)| (new - old).abs())
                .sum();

            std::mem::swap(&mut ranks, &mut new_ranks);

            if let Some(threshold) = threshold {
                if change < threshold {
                    tracing::debug!(round, change, "weighted rank converged");
                    break;
                }
            }
        }

        let nodes: Vec<Arc<str>> = graph.node_weights().cloned().collect();
        collect_table(nodes, ranks)
    }
}

fn collect_table(nodes: Vec<Arc<str>>, ranks: Vec<f64>) -> RankTable {
    RankTable::new(nodes.into_iter().zip(ranks).collect())
}
