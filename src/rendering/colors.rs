//! ANSI color utilities and tier badges for ranked output.
//!
//! Tiers tag each identity with where it sits relative to the top score:
//! - [hub]: at least half the best score
//! - [active]: at least a tenth
//! - [peripheral]: anything above zero
//! - [silent]: received nothing in the final round

use owo_colors::{OwoColorize, Style};
use std::fmt;

/// Position of a score relative to the best score in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Hub,
    Active,
    Peripheral,
    Silent,
}

impl Tier {
    pub fn classify(score: f64, best: f64) -> Self {
        if score <= 0.0 || best <= 0.0 {
            Tier::Silent
        } else if score >= best * 0.5 {
            Tier::Hub
        } else if score >= best * 0.1 {
            Tier::Active
        } else {
            Tier::Peripheral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Hub => "hub",
            Tier::Active => "active",
            Tier::Peripheral => "peripheral",
            Tier::Silent => "silent",
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Tier::Hub => Style::new().bright_red().bold(),
            Tier::Active => Style::new().yellow(),
            Tier::Peripheral => Style::new().cyan(),
            Tier::Silent => Style::new().dimmed(),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label())
    }
}

/// Color switch for the renderers. Disabled palettes pass text through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn identity(&self, s: &str) -> String {
        if self.enabled {
            s.bright_blue().bold().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn score(&self, s: &str) -> String {
        if self.enabled {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn tier(&self, tier: Tier) -> String {
        if self.enabled {
            format!("[{}]", tier.label().style(tier.style()))
        } else {
            tier.to_string()
        }
    }

    pub fn dim(&self, s: &str) -> String {
        if self.enabled {
            s.dimmed().to_string()
        } else {
            s.to_string()
        }
    }
}
