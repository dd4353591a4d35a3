//! Errors raised by the ranking core.
//!
//! The core is pure in-memory computation, so there is no transient failure
//! mode: every error here is fatal to the current run and is returned to the
//! caller. Loading and CLI layers wrap these with `anyhow` context.

use crate::types::PersonId;

/// Errors from identity resolution, aggregation and ranking.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    /// An alias matched, but its person id has no person record.
    #[error("alias '{alias}' (from raw identity '{raw}') references unknown person id {person_id}")]
    DanglingAliasReference {
        raw: String,
        alias: String,
        person_id: PersonId,
    },

    /// Aggregation produced zero edges; there is nothing to rank.
    #[error("cannot rank an empty communication graph (no edges)")]
    EmptyGraph,

    #[error("invalid ranking config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RankError>;
