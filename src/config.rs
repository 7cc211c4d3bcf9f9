use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Settings loaded from `lumos.toml`. Every section and field is optional;
/// a missing file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chunker: ChunkerSection,
    #[serde(default)]
    pub search: SearchSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkerSection {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_limit() -> usize {
    5
}

impl Default for ChunkerSection {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config from {}", path.display()))
    }
}
