//! CLI command implementations

pub mod plan;
pub mod rank;

use anyhow::{bail, Context, Result};
use srvote_core::{Candidate, VoteConfig};
use std::fs;
use std::path::Path;

/// Output format shared by all commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => bail!("Unknown format '{other}' (expected json or human)"),
        }
    }
}

/// Load the config file if given, otherwise read `SRVOTE_*` variables.
pub fn load_config(path: Option<&Path>) -> Result<VoteConfig> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            VoteConfig::from_json_str(&json).context("Invalid config file")
        }
        None => VoteConfig::from_env().context("Invalid SRVOTE_* environment"),
    }
}

pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates file: {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse candidates JSON")
}
