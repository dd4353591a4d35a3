//! mailrank - influence ranking over message networks
//!
//! Turns raw (sender, receiver) message records into a per-person importance
//! score. Free-form identities are canonicalized, messages are folded into a
//! weighted directed graph, and a fixed-round power iteration ranks it.
//!
//! # Architecture
//!
//! ```text
//! CSV tables → Identity Resolution → Edge Aggregation → Rank Engine → Rendering
//!      ↓                ↓                    ↓                ↓            ↓
//!     csv         lower/strip @/        keyed counts      power        text/json
//!    + serde        alias lookup        (rayon fold)     iteration     + ANSI
//! ```
//!
//! The core (`identity`, `graph`, `ranking`, `pipeline`) never touches files;
//! `loading` and `rendering` sit around it.

pub mod config;
pub mod error;
pub mod graph;
pub mod identity;
pub mod loading;
pub mod pipeline;
pub mod ranking;
pub mod rendering;
pub mod types;

pub use error::RankError;
pub use graph::{EdgeSet, GraphAggregator};
pub use identity::{resolve, IdentityResolver, IdentityTables, ResolverConfig};
pub use pipeline::{PipelineOptions, PipelineStats, RankReport};
pub use ranking::RankEngine;
pub use types::{
    AliasEntry, Edge, MessagePair, PersonEntry, PersonId, RankMode, RankTable, RankingConfig,
    ScoredIdentity,
};
