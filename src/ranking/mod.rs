//! Ranking - from the aggregated edge set to per-identity importance scores.
//!
//! Two update rules share one engine:
//! - Reference: fixed rounds, `1 / edge_count` start, weight-free
//!   contributions, no dangling-mass handling. This is the default and every
//!   output depends on it exactly.
//! - Weighted: textbook PageRank over the petgraph view, with teleportation,
//!   weight-proportional flow and dangling redistribution. Opt-in only.

mod pagerank;

pub use pagerank::RankEngine;
