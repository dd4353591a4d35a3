//! Rank table renderer.
//!
//! ```text
//! text:    Node: Hillary Clinton, PageRank: 2.130000e-4
//!
//! ranked:    1  2.130000e-4  ██████████  Hillary Clinton [hub]
//!            2  4.100000e-5  ██          jake.sullivan [active]
//!
//! json:    [{"identity":"Hillary Clinton","score":0.000213}, ...]
//! ```
//!
//! Scores are printed in scientific notation with seven significant
//! digits. Reference-mode scores shrink geometrically with the round count
//! and would round to zero in fixed-point output.

use std::str::FromStr;

use anyhow::Result;

use super::colors::{Palette, Tier};
use crate::types::{RankTable, ScoredIdentity};

const BAR_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per identity, lexicographic.
    #[default]
    Text,
    /// Best first, with position, bar and tier.
    Ranked,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "ranked" => Ok(OutputFormat::Ranked),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown format '{}' (expected text, ranked or json)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Drop identities scoring strictly below this.
    pub min_score: f64,
    /// Keep only the N best. 0 keeps all.
    pub top: usize,
    pub palette: Palette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            min_score: 0.0,
            top: 0,
            palette: Palette::plain(),
        }
    }
}

pub struct TableRenderer {
    options: RenderOptions,
}

impl TableRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Entries that survive the filters, in the order the format wants.
    ///
    /// `top` always picks the highest scores, even for identity-sorted
    /// output.
    pub fn select(&self, ranks: &RankTable) -> Vec<ScoredIdentity> {
        let mut entries: Vec<ScoredIdentity> = ranks
            .sorted_by_score()
            .into_iter()
            .filter(|e| e.score >= self.options.min_score)
            .collect();

        if self.options.top > 0 {
            entries.truncate(self.options.top);
        }

        if matches!(self.options.format, OutputFormat::Text | OutputFormat::Json) {
            entries.sort_by(|a, b| a.identity.cmp(&b.identity));
        }
        entries
    }

    pub fn render(&self, ranks: &RankTable) -> Result<String> {
        let entries = self.select(ranks);
        match self.options.format {
            OutputFormat::Text => Ok(self.render_text(&entries)),
            OutputFormat::Ranked => Ok(self.render_ranked(&entries)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&entries)?),
        }
    }

    fn render_text(&self, entries: &[ScoredIdentity]) -> String {
        let palette = &self.options.palette;
        let mut output = String::new();
        for entry in entries {
            output.push_str(&format!(
                "Node: {}, PageRank: {}\n",
                palette.identity(&entry.identity),
                palette.score(&format_score(entry.score))
            ));
        }
        output
    }

    fn render_ranked(&self, entries: &[ScoredIdentity]) -> String {
        let palette = &self.options.palette;
        let best = entries.first().map(|e| e.score).unwrap_or(0.0);
        let width = entries.len().to_string().len();

        let mut output = String::new();
        for (i, entry) in entries.iter().enumerate() {
            let filled = if best > 0.0 {
                ((entry.score / best) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let bar = format!(
                "{}{}",
                "█".repeat(filled.min(BAR_WIDTH)),
                " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
            );
            output.push_str(&format!(
                "{:>width$}  {}  {}  {} {}\n",
                i + 1,
                palette.score(&format_score(entry.score)),
                palette.dim(&bar),
                palette.identity(&entry.identity),
                palette.tier(Tier::classify(entry.score, best)),
                width = width
            ));
        }
        output
    }
}

fn format_score(score: f64) -> String {
    format!("{:.6e}", score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn ranks() -> RankTable {
        let scores: HashMap<Arc<str>, f64> = [
            ("carol", 0.02),
            ("alice", 0.4),
            ("bob", 0.1),
            ("dave", 0.0),
        ]
        .into_iter()
        .map(|(k, v)| (Arc::from(k), v))
        .collect();
        RankTable::new(scores)
    }

    fn renderer(format: OutputFormat) -> TableRenderer {
        TableRenderer::new(RenderOptions {
            format,
            ..Default::default()
        })
    }

    #[test]
    fn test_text_is_sorted_by_identity() {
        let out = renderer(OutputFormat::Text).render(&ranks()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Node: alice, PageRank: 4.000000e-1");
        assert_eq!(lines[3], "Node: dave, PageRank: 0.000000e0");
    }

    #[test]
    fn test_ranked_is_best_first_with_tiers() {
        let out = renderer(OutputFormat::Ranked).render(&ranks()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].contains("alice") && lines[0].contains("[hub]"));
        assert!(lines[1].contains("bob") && lines[1].contains("[active]"));
        assert!(lines[2].contains("carol") && lines[2].contains("[peripheral]"));
        assert!(lines[3].contains("dave") && lines[3].contains("[silent]"));
    }

    #[test]
    fn test_min_score_and_top_filters() {
        let filtered = TableRenderer::new(RenderOptions {
            min_score: 0.01,
            ..Default::default()
        });
        let names: Vec<_> = filtered
            .select(&ranks())
            .into_iter()
            .map(|e| e.identity.to_string())
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);

        let top = TableRenderer::new(RenderOptions {
            top: 2,
            ..Default::default()
        });
        let names: Vec<_> = top
            .select(&ranks())
            .into_iter()
            .map(|e| e.identity.to_string())
            .collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_json_output() {
        let out = renderer(OutputFormat::Json).render(&ranks()).unwrap();
        let parsed: Vec<ScoredIdentity> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0].identity.as_ref(), "alice");
        assert_eq!(parsed[0].score, 0.4);
    }

    fn cycle_ranks(n: usize) -> RankTable {
        let edges: crate::graph::EdgeSet = (0..n)
            .map(|i| {
                crate::types::Edge::new(
                    format!("n{:02}", i).as_str(),
                    format!("n{:02}", (i + 1) % n).as_str(),
                    1,
                )
            })
            .collect();
        crate::ranking::RankEngine::new(Default::default())
            .rank(&edges)
            .unwrap()
    }

    fn parse_score(line: &str) -> f64 {
        line.split_whitespace()
            .filter(|token| token.contains('e'))
            .find_map(|token| token.parse::<f64>().ok())
            .unwrap_or_else(|| panic!("no score in {:?}", line))
    }

    #[test]
    fn test_tiny_reference_scores_stay_visible() {
        let ranks = cycle_ranks(20);
        let raw = ranks.get("n00").unwrap();
        assert!(raw > 0.0 && raw < 1e-6);

        for format in [OutputFormat::Text, OutputFormat::Ranked] {
            let out = renderer(format).render(&ranks).unwrap();
            assert_eq!(out.lines().count(), 20);
            for line in out.lines() {
                let printed = parse_score(line);
                assert!(
                    ((printed - raw) / raw).abs() < 1e-6,
                    "{:?} printed {} for raw {}",
                    format,
                    printed,
                    raw
                );
            }
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
