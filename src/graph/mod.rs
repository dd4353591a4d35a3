//! Communication graph construction.
//!
//! ```text
//! raw pairs ──resolve──▶ (sender, receiver) ──keyed count──▶ EdgeSet
//! ```
//!
//! One edge per distinct ordered pair, weighted by message count. The
//! aggregator never scans existing edges; counts accumulate in a map keyed on
//! the resolved pair, either sequentially or as per-worker partitions merged
//! at the end.

mod aggregator;
mod edge_set;

pub use aggregator::GraphAggregator;
pub use edge_set::EdgeSet;
