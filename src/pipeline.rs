//! End-to-end ranking pipeline over in-memory tables.
//!
//! ```text
//! MessagePair[] ──IdentityResolver──▶ GraphAggregator ──▶ EdgeSet ──RankEngine──▶ RankTable
//! ```
//!
//! The pipeline owns no resources: loaders hand it plain tables and
//! presenters take the report it returns.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::graph::{EdgeSet, GraphAggregator};
use crate::identity::{IdentityResolver, IdentityTables, ResolverConfig};
use crate::ranking::RankEngine;
use crate::types::{MessagePair, RankTable, RankingConfig};

/// Knobs for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub resolver: ResolverConfig,
    pub ranking: RankingConfig,
    /// Check every alias before resolving anything.
    pub strict: bool,
    /// Aggregate with rayon instead of a single sequential pass.
    pub parallel: bool,
}

/// Counters and timings from one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub messages: usize,
    pub aliases: usize,
    pub persons: usize,
    pub nodes: usize,
    pub edges: usize,
    pub total_weight: u64,
    pub self_edges: usize,
    pub aggregate_time: Duration,
    pub rank_time: Duration,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct RankReport {
    pub ranks: RankTable,
    pub edges: EdgeSet,
    pub stats: PipelineStats,
}

/// Resolve, aggregate and rank.
///
/// Any resolution error or an empty graph ends the run; a partially resolved
/// graph is never ranked.
pub fn run(
    messages: &[MessagePair],
    tables: &IdentityTables,
    options: &PipelineOptions,
) -> Result<RankReport> {
    if options.strict {
        tables.validate()?;
    } else {
        let dangling = tables.dangling_aliases();
        if !dangling.is_empty() {
            tracing::warn!(
                count = dangling.len(),
                first = dangling[0].0,
                "aliases reference unknown persons; messages using them will fail to resolve"
            );
        }
    }

    let aggregate_start = Instant::now();
    let resolver = IdentityResolver::new(tables).with_config(options.resolver.clone());
    let aggregator = GraphAggregator::new(resolver);
    let edges = if options.parallel {
        aggregator.aggregate_par(messages)?
    } else {
        aggregator.aggregate(messages)?
    };
    let aggregate_time = aggregate_start.elapsed();

    let rank_start = Instant::now();
    let ranks = RankEngine::new(options.ranking.clone()).rank(&edges)?;
    let rank_time = rank_start.elapsed();

    let stats = PipelineStats {
        messages: messages.len(),
        aliases: tables.alias_count(),
        persons: tables.person_count(),
        nodes: ranks.len(),
        edges: edges.len(),
        total_weight: edges.total_weight(),
        self_edges: edges.self_edge_count(),
        aggregate_time,
        rank_time,
    };

    tracing::debug!(
        messages = stats.messages,
        nodes = stats.nodes,
        edges = stats.edges,
        "pipeline finished"
    );

    Ok(RankReport {
        ranks,
        edges,
        stats,
    })
}
