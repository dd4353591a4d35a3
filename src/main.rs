//! mailrank CLI - who matters in a message archive
//!
//! Orchestrates the full pipeline:
//!
//! 1. Config: mailrank.toml in the data directory (or a parent), then flags
//! 2. Loading: Emails.csv, Aliases.csv, Persons.csv
//! 3. Identity resolution + edge aggregation
//! 4. Ranking: fixed-round power iteration
//! 5. Rendering: text, ranked or json on stdout
//!
//! Progress and diagnostics go to stderr through tracing; stdout carries only
//! the ranking so it can be piped.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mailrank::config::Config;
use mailrank::loading::{load_dataset, DatasetPaths};
use mailrank::pipeline;
use mailrank::rendering::{OutputFormat, Palette, RenderOptions, TableRenderer};
use mailrank::types::RankMode;

/// Influence ranking over message networks
///
/// Reads message, alias and person tables, collapses every spelling of a
/// person into one identity, and ranks identities with a PageRank-style
/// power iteration.
///
/// Examples:
///   mailrank ./input                      # Emails.csv etc. in ./input
///   mailrank ./input --format ranked --top 20
///   mailrank ./input --mode weighted      # textbook PageRank instead
#[derive(Parser, Debug)]
#[command(name = "mailrank")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Directory holding the CSV tables
    #[arg(value_name = "DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Message table (default: Emails.csv in DATA_DIR)
    #[arg(long, value_name = "FILE")]
    pub emails: Option<PathBuf>,

    /// Alias table (default: Aliases.csv in DATA_DIR)
    #[arg(long, value_name = "FILE")]
    pub aliases: Option<PathBuf>,

    /// Person table (default: Persons.csv in DATA_DIR)
    #[arg(long, value_name = "FILE")]
    pub persons: Option<PathBuf>,

    /// Explicit config file instead of searching for mailrank.toml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Damping factor
    #[arg(long)]
    pub damping: Option<f64>,

    /// Number of power-iteration rounds
    ///
    /// Defaults to 10 in reference mode. In weighted mode this caps the
    /// iteration, which defaults to 100 and stops once converged.
    #[arg(long)]
    pub rounds: Option<usize>,

    /// Update rule: reference (default) or weighted
    ///
    /// reference: start at 1/edge_count, weight-free contributions.
    /// weighted:  textbook PageRank with teleport and edge weights.
    #[arg(long)]
    pub mode: Option<RankMode>,

    /// Remove commas from identities before alias lookup
    #[arg(long)]
    pub strip_commas: bool,

    /// Fail if any alias references an unknown person, used or not
    #[arg(long)]
    pub strict: bool,

    /// Aggregate messages on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output format: text, ranked or json
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Hide identities scoring below this
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Show only the N highest-scoring identities
    #[arg(long)]
    pub top: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print run statistics to stderr
    #[arg(long)]
    pub stats: bool,

    /// Verbose progress on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = run(&cli)?;
    print!("{}", output);

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Merge file config with CLI flags. Flags win.
fn effective_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_file(path)?,
        None => Config::load(&cli.data_dir)?,
    };

    if let Some(damping) = cli.damping {
        config.ranking.damping = damping;
    }
    if let Some(rounds) = cli.rounds {
        config.ranking.rounds = Some(rounds);
    }
    if let Some(mode) = cli.mode {
        config.ranking.mode = mode;
    }
    if cli.strip_commas {
        config.resolver.strip_commas = true;
    }
    if cli.strict {
        config.strict = true;
    }
    if let Some(ref emails) = cli.emails {
        config.emails = emails.clone();
    }
    if let Some(ref aliases) = cli.aliases {
        config.aliases = aliases.clone();
    }
    if let Some(ref persons) = cli.persons {
        config.persons = persons.clone();
    }
    if let Some(min_score) = cli.min_score {
        config.min_score = min_score;
    }
    if let Some(top) = cli.top {
        config.top = top;
    }

    config.ranking.validate()?;
    Ok(config)
}

/// Execute the full mailrank pipeline and return the rendered ranking.
fn run(cli: &Cli) -> Result<String> {
    let config = effective_config(cli)?;

    tracing::info!("mailrank v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("data directory: {}", cli.data_dir.display());
    tracing::info!("\n{}", config.display_summary());

    let paths = DatasetPaths {
        emails: config.table_path(&cli.data_dir, &config.emails),
        aliases: config.table_path(&cli.data_dir, &config.aliases),
        persons: config.table_path(&cli.data_dir, &config.persons),
    };

    let dataset = load_dataset(&paths)?;
    tracing::info!(
        "loaded {} messages, {} aliases, {} persons",
        dataset.messages.len(),
        dataset.aliases.len(),
        dataset.persons.len()
    );

    let (messages, tables) = dataset.into_parts();
    let report = pipeline::run(&messages, &tables, &config.pipeline_options(cli.parallel))
        .context("Ranking failed")?;

    tracing::info!(
        "ranked {} identities over {} edges",
        report.stats.nodes,
        report.stats.edges
    );

    if cli.stats {
        let s = &report.stats;
        eprintln!(
            "Messages: {}\nAliases: {}\nPersons: {}\nIdentities: {}\nEdges: {} ({} self)\nTotal weight: {}\nAggregate: {:.2?}\nRank: {:.2?}",
            s.messages,
            s.aliases,
            s.persons,
            s.nodes,
            s.edges,
            s.self_edges,
            s.total_weight,
            s.aggregate_time,
            s.rank_time
        );
    }

    let renderer = TableRenderer::new(RenderOptions {
        format: cli.format,
        min_score: config.min_score,
        top: config.top,
        palette: Palette::new(!cli.no_color && cli.format == OutputFormat::Ranked),
    });
    renderer.render(&report.ranks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_minimal() {
        let cli = Cli::parse_from(["mailrank"]);
        assert_eq!(cli.data_dir, PathBuf::from("."));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.mode.is_none());
        assert!(!cli.parallel);
    }

    #[test]
    fn test_cli_parse_ranking_flags() {
        let cli = Cli::parse_from([
            "mailrank",
            "data",
            "--mode",
            "weighted",
            "--damping",
            "0.9",
            "--rounds",
            "30",
            "--format",
            "json",
            "--top",
            "5",
        ]);
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert_eq!(cli.mode, Some(RankMode::Weighted));
        assert_eq!(cli.damping, Some(0.9));
        assert_eq!(cli.rounds, Some(30));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.top, Some(5));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["mailrank", "--mode", "fancy"]).is_err());
    }

    #[test]
    fn test_flags_override_file_config() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("mailrank.toml"),
            "[ranking]\nrounds = 3\n[output]\ntop = 7\n",
        )?;

        let data_dir = dir.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(["mailrank", data_dir.as_str(), "--top", "2", "--strict"]);
        let config = effective_config(&cli)?;
        assert_eq!(config.ranking.rounds(), 3);
        assert_eq!(config.top, 2);
        assert!(config.strict);
        Ok(())
    }

    #[test]
    fn test_run_end_to_end() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("Emails.csv"),
            "Id,MetadataFrom,MetadataTo\n1,a@x.com,B\n2,b,b\n",
        )?;
        std::fs::write(dir.path().join("Aliases.csv"), "Alias,PersonId\n")?;
        std::fs::write(dir.path().join("Persons.csv"), "Id,Name\n")?;

        let data_dir = dir.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(["mailrank", data_dir.as_str()]);
        let output = run(&cli)?;

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Node: a, PageRank: "));
        assert!(lines[1].starts_with("Node: b, PageRank: "));
        Ok(())
    }
}
