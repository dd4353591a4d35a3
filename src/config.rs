//! Configuration loading from mailrank.toml.
//!
//! ## Example
//!
//! ```toml
//! [ranking]
//! damping = 0.85
//! rounds = 10
//! mode = "reference"
//!
//! [identity]
//! strip-commas = false
//! strict = false
//!
//! [input]
//! emails = "Emails.csv"
//! aliases = "Aliases.csv"
//! persons = "Persons.csv"
//!
//! [output]
//! min-score = 0.0
//! top = 0
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::identity::ResolverConfig;
use crate::pipeline::PipelineOptions;
use crate::types::{RankMode, RankingConfig};

pub const CONFIG_FILE_NAME: &str = "mailrank.toml";

pub const DEFAULT_EMAILS_FILE: &str = "Emails.csv";
pub const DEFAULT_ALIASES_FILE: &str = "Aliases.csv";
pub const DEFAULT_PERSONS_FILE: &str = "Persons.csv";

/// Mailrank configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,

    pub ranking: RankingConfig,
    pub resolver: ResolverConfig,

    /// Validate every alias before ranking.
    pub strict: bool,

    /// Table file names, relative to the data directory unless absolute.
    pub emails: PathBuf,
    pub aliases: PathBuf,
    pub persons: PathBuf,

    /// Drop identities scoring below this from the output.
    pub min_score: f64,
    /// Keep only the N best identities. 0 keeps all.
    pub top: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            ranking: RankingConfig::default(),
            resolver: ResolverConfig::default(),
            strict: false,
            emails: PathBuf::from(DEFAULT_EMAILS_FILE),
            aliases: PathBuf::from(DEFAULT_ALIASES_FILE),
            persons: PathBuf::from(DEFAULT_PERSONS_FILE),
            min_score: 0.0,
            top: 0,
        }
    }
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    ranking: Option<RawRanking>,
    identity: Option<RawIdentity>,
    input: Option<RawInput>,
    output: Option<RawOutput>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawRanking {
    damping: Option<f64>,
    rounds: Option<usize>,
    mode: Option<RankMode>,
    tolerance: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawIdentity {
    strip_commas: Option<bool>,
    strict: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawInput {
    emails: Option<String>,
    aliases: Option<String>,
    persons: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawOutput {
    min_score: Option<f64>,
    top: Option<usize>,
}

impl Config {
    /// Load configuration for the given data directory.
    ///
    /// Search order:
    /// 1. mailrank.toml in directory
    /// 2. Walk up parent directories for mailrank.toml
    /// 3. Default config if nothing found
    ///
    /// A config file that exists but does not parse is an error.
    pub fn load(directory: &Path) -> Result<Self> {
        let start = directory
            .canonicalize()
            .unwrap_or_else(|_| directory.to_path_buf());
        let mut current = Some(start.as_path());
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Self::load_file(&candidate);
            }
            current = dir.parent();
        }
        Ok(Self::default())
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content, Some(path.to_path_buf()))
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml_str(content: &str, source: Option<PathBuf>) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let config = Self::from_raw(raw, source);
        config.ranking.validate()?;
        Ok(config)
    }

    fn from_raw(raw: RawConfig, source: Option<PathBuf>) -> Self {
        let defaults = Self::default();
        let ranking = raw.ranking.unwrap_or_default();
        let identity = raw.identity.unwrap_or_default();
        let input = raw.input.unwrap_or_default();
        let output = raw.output.unwrap_or_default();

        Self {
            source,
            ranking: RankingConfig {
                damping: ranking.damping.unwrap_or(defaults.ranking.damping),
                rounds: ranking.rounds,
                mode: ranking.mode.unwrap_or(defaults.ranking.mode),
                tolerance: ranking.tolerance,
            },
            resolver: ResolverConfig {
                strip_commas: identity.strip_commas.unwrap_or(false),
            },
            strict: identity.strict.unwrap_or(false),
            emails: input.emails.map(PathBuf::from).unwrap_or(defaults.emails),
            aliases: input.aliases.map(PathBuf::from).unwrap_or(defaults.aliases),
            persons: input.persons.map(PathBuf::from).unwrap_or(defaults.persons),
            min_score: output.min_score.unwrap_or(defaults.min_score),
            top: output.top.unwrap_or(defaults.top),
        }
    }

    /// Resolve a table path against the data directory.
    pub fn table_path(&self, data_dir: &Path, table: &Path) -> PathBuf {
        if table.is_absolute() {
            table.to_path_buf()
        } else {
            data_dir.join(table)
        }
    }

    pub fn pipeline_options(&self, parallel: bool) -> PipelineOptions {
        PipelineOptions {
            resolver: self.resolver.clone(),
            ranking: self.ranking.clone(),
            strict: self.strict,
            parallel,
        }
    }

    /// Format config for verbose display.
    pub fn display_summary(&self) -> String {
        let mut lines = Vec::new();

        match self.source {
            Some(ref source) => lines.push(format!("   Config: {}", source.display())),
            None => lines.push("   Config: (defaults)".to_string()),
        }

        let mode = match self.ranking.mode {
            RankMode::Reference => "reference",
            RankMode::Weighted => "weighted",
        };
        lines.push(format!(
            "   Ranking: {} (damping {}, {} rounds)",
            mode,
            self.ranking.damping,
            self.ranking.rounds()
        ));

        if self.resolver.strip_commas || self.strict {
            let mut flags = Vec::new();
            if self.resolver.strip_commas {
                flags.push("strip-commas");
            }
            if self.strict {
                flags.push("strict");
            }
            lines.push(format!("   Identity: {}", flags.join(", ")));
        }

        lines.push(format!(
            "   Tables: {}, {}, {}",
            self.emails.display(),
            self.aliases.display(),
            self.persons.display()
        ));

        lines.join("\n")
    }
}
