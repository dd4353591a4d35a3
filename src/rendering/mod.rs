//! Output rendering for rank tables.
//!
//! Three formats:
//! - text: `Node: <identity>, PageRank: <score>` lines, sorted by identity
//! - ranked: position, score bar and identity, best first, optional ANSI color
//! - json: array of `{identity, score}` objects

mod colors;
mod table;

pub use colors::Palette;
pub use table::{OutputFormat, RenderOptions, TableRenderer};
