//! Core types for mailrank.
//!
//! Key design decisions:
//! - `Arc<str>` for resolved identities, shared between edges, graph nodes
//!   and the final rank table without re-allocating per message
//! - Input records are plain owned data handed over by the loader; the core
//!   never sees file handles
//! - Edges are immutable once aggregation finishes

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RankError, Result};

/// Serde helpers for Arc<str> fields
mod arc_str_serde {
    use super::*;

    pub fn serialize<S>(arc: &Arc<str>, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(arc.as_ref())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Arc<str>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.into())
    }
}

/// Person identifier as it appears in the alias and person tables.
pub type PersonId = i64;

/// Reference-mode damping factor.
pub const DEFAULT_DAMPING: f64 = 0.85;

/// Reference-mode round count. Fixed; there is no convergence test.
pub const DEFAULT_ROUNDS: usize = 10;

/// Weighted-mode iteration cap when no round count is configured.
pub const DEFAULT_WEIGHTED_ROUNDS: usize = 100;

/// Weighted-mode per-node tolerance. The run stops once the L1 change
/// between rounds drops below `node_count * tolerance`.
pub const DEFAULT_WEIGHTED_TOLERANCE: f64 = 1e-6;

/// One raw message, reduced to the two fields the core cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessagePair {
    pub sender: String,
    pub receiver: String,
}

impl MessagePair {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
        }
    }
}

/// Maps a raw identity string to a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias: String,
    pub person_id: PersonId,
}

impl AliasEntry {
    pub fn new(alias: impl Into<String>, person_id: PersonId) -> Self {
        Self {
            alias: alias.into(),
            person_id,
        }
    }
}

/// Maps a person to their canonical display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonEntry {
    pub person_id: PersonId,
    pub name: String,
}

impl PersonEntry {
    pub fn new(person_id: PersonId, name: impl Into<String>) -> Self {
        Self {
            person_id,
            name: name.into(),
        }
    }
}

/// Aggregated, weighted, directed connection between two resolved identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    #[serde(with = "arc_str_serde")]
    pub sender: Arc<str>,
    #[serde(with = "arc_str_serde")]
    pub receiver: Arc<str>,
    /// Number of raw messages that resolved to this ordered pair (>= 1)
    pub weight: u64,
}

impl Edge {
    pub fn new(sender: impl Into<Arc<str>>, receiver: impl Into<Arc<str>>, weight: u64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            weight,
        }
    }

    pub fn is_self_edge(&self) -> bool {
        self.sender == self.receiver
    }
}

/// An identity with its score, for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIdentity {
    #[serde(with = "arc_str_serde")]
    pub identity: Arc<str>,
    pub score: f64,
}

/// Final scores keyed by resolved identity.
///
/// Carries no ordering of its own; use [`RankTable::sorted_by_identity`] or
/// [`RankTable::sorted_by_score`] for stable views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankTable {
    scores: HashMap<Arc<str>, f64>,
}

impl RankTable {
    pub fn new(scores: HashMap<Arc<str>, f64>) -> Self {
        Self { scores }
    }

    pub fn get(&self, identity: &str) -> Option<f64> {
        self.scores.get(identity).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, f64)> {
        self.scores.iter().map(|(k, v)| (k, *v))
    }

    pub fn total(&self) -> f64 {
        self.scores.values().sum()
    }

    /// Lexicographic by identity.
    pub fn sorted_by_identity(&self) -> Vec<ScoredIdentity> {
        let mut out: Vec<_> = self
            .scores
            .iter()
            .map(|(identity, &score)| ScoredIdentity {
                identity: Arc::clone(identity),
                score,
            })
            .collect();
        out.sort_by(|a, b| a.identity.cmp(&b.identity));
        out
    }

    /// Highest score first; ties broken by identity.
    pub fn sorted_by_score(&self) -> Vec<ScoredIdentity> {
        let mut out = self.sorted_by_identity();
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.identity.cmp(&b.identity))
        });
        out
    }
}

/// Which update rule the rank engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankMode {
    /// Fixed-round rule: start at 1/edge_count, contribution
    /// `damping * score[sender] / edge_count`, edge weight ignored.
    #[default]
    Reference,
    /// Textbook PageRank: 1/node_count start, teleport term,
    /// weight-proportional contributions, dangling mass redistributed.
    Weighted,
}

impl std::str::FromStr for RankMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" => Ok(RankMode::Reference),
            "weighted" => Ok(RankMode::Weighted),
            other => Err(format!(
                "unknown rank mode '{}' (expected 'reference' or 'weighted')",
                other
            )),
        }
    }
}

/// Configuration for the rank engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    pub damping: f64,
    /// Round count. `None` picks the mode's default, see `rounds()`.
    pub rounds: Option<usize>,
    pub mode: RankMode,
    /// Per-node convergence tolerance. Weighted mode only.
    pub tolerance: Option<f64>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            rounds: None,
            mode: RankMode::Reference,
            tolerance: None,
        }
    }
}

impl RankingConfig {
    pub fn weighted() -> Self {
        Self {
            mode: RankMode::Weighted,
            ..Default::default()
        }
    }

    /// Effective round count: 10 for reference mode, an iteration cap of
    /// 100 for weighted mode, unless set explicitly.
    pub fn rounds(&self) -> usize {
        self.rounds.unwrap_or(match self.mode {
            RankMode::Reference => DEFAULT_ROUNDS,
            RankMode::Weighted => DEFAULT_WEIGHTED_ROUNDS,
        })
    }

    /// Effective convergence tolerance. Reference mode never stops early.
    pub fn tolerance(&self) -> Option<f64> {
        match self.mode {
            RankMode::Reference => None,
            RankMode::Weighted => Some(self.tolerance.unwrap_or(DEFAULT_WEIGHTED_TOLERANCE)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.damping.is_finite() || !(0.0..=1.0).contains(&self.damping) {
            return Err(RankError::InvalidConfig(format!(
                "damping must be within [0, 1], got {}",
                self.damping
            )));
        }
        if let Some(tol) = self.tolerance {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(RankError::InvalidConfig(format!(
                    "tolerance must be a positive finite number, got {}",
                    tol
                )));
            }
        }
        Ok(())
    }
}
