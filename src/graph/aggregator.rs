//! Message pairs → weighted edge set.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use super::edge_set::EdgeSet;
use crate::error::{RankError, Result};
use crate::identity::IdentityResolver;
use crate::types::MessagePair;

type PairCounts = HashMap<(Arc<str>, Arc<str>), u64>;

/// Aggregates raw message pairs into an [`EdgeSet`].
///
/// Every pair is resolved end-by-end through the resolver, then counted
/// under its resolved (sender, receiver) key. Self-edges count like any
/// other edge.
pub struct GraphAggregator<'a> {
    resolver: IdentityResolver<'a>,
}

impl<'a> GraphAggregator<'a> {
    pub fn new(resolver: IdentityResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Sequential aggregation. Fails on the first pair (in input order) that
    /// does not resolve.
    pub fn aggregate(&self, pairs: &[MessagePair]) -> Result<EdgeSet> {
        let mut counts = PairCounts::new();
        for pair in pairs {
            let key = self.resolver.resolve_pair(&pair.sender, &pair.receiver)?;
            *counts.entry(key).or_insert(0) += 1;
        }
        tracing::debug!(
            messages = pairs.len(),
            edges = counts.len(),
            strip_commas = self.resolver.config().strip_commas,
            "aggregated message pairs"
        );
        Ok(EdgeSet::from_counts(counts))
    }

    /// Parallel aggregation with rayon.
    ///
    /// Each worker folds its slice of the input into a private map; the maps
    /// are merged pairwise afterwards, so no map is ever shared between
    /// threads. Produces the same edge set as [`aggregate`](Self::aggregate).
    /// When several pairs fail, which error surfaces is unspecified.
    pub fn aggregate_par(&self, pairs: &[MessagePair]) -> Result<EdgeSet> {
        let counts = pairs
            .par_iter()
            .try_fold(PairCounts::new, |mut acc, pair| {
                let key = self.resolver.resolve_pair(&pair.sender, &pair.receiver)?;
                *acc.entry(key).or_insert(0) += 1;
                Ok::<_, RankError>(acc)
            })
            .try_reduce(PairCounts::new, |a, b| Ok(merge_counts(a, b)))?;
        tracing::debug!(
            messages = pairs.len(),
            edges = counts.len(),
            "aggregated message pairs (parallel)"
        );
        Ok(EdgeSet::from_counts(counts))
    }

    /// Aggregate pairs that are already resolved identities. Nothing can fail.
    pub fn aggregate_resolved<I, S, R>(pairs: I) -> EdgeSet
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<Arc<str>>,
        R: Into<Arc<str>>,
    {
        let mut counts = PairCounts::new();
        for (sender, receiver) in pairs {
            *counts.entry((sender.into(), receiver.into())).or_insert(0) += 1;
        }
        EdgeSet::from_counts(counts)
    }
}

/// Fold the smaller map into the larger one.
fn merge_counts(a: PairCounts, b: PairCounts) -> PairCounts {
    let (mut big, small) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (key, count) in small {
        *big.entry(key).or_insert(0) += count;
    }
    big
}
