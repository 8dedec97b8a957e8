use crate::models::SourceKind;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "usdconvert.toml";
pub const DEFAULT_API_URL: &str = "https://api.exchangeratesapi.io/latest?base=USD";
pub const DEFAULT_CACHE_FILE: &str = "rates.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceKind,
    pub api_url: String,
    pub cache_path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::Cached,
            api_url: DEFAULT_API_URL.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Apply `USDCONVERT_*` environment overrides on top of the file values.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(url) = env::var("USDCONVERT_API_URL") {
            self.api_url = url;
        }
        if let Ok(path) = env::var("USDCONVERT_CACHE_PATH") {
            self.cache_path = PathBuf::from(path);
        }
        if let Ok(source) = env::var("USDCONVERT_SOURCE") {
            self.source = parse_source(&source)?;
        }
        Ok(())
    }
}

fn parse_source(value: &str) -> anyhow::Result<SourceKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "static" => Ok(SourceKind::Static),
        "remote" => Ok(SourceKind::Remote),
        "cached" => Ok(SourceKind::Cached),
        other => anyhow::bail!("Unknown rate source '{}' (expected static, remote or cached)", other),
    }
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    let config_str = toml::to_string_pretty(config)?;
    fs::write(path, config_str)?;
    Ok(())
}
