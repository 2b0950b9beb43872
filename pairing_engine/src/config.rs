//! Engine configuration: parsing, defaults, and validation.
//!
//! A TOML file with a top-level `database_url` / `pool_size` and three
//! sections:
//!
//! ```toml
//! database_url = "pairing.db"
//!
//! [flavordb]
//! base_url = "https://cosylab.iiitd.edu.in/flavordb/entities_json"
//! first_entity_id = 0
//! end_entity_id = 1000
//! requests_per_second = 4
//! cache_dir = ".cache/flavordb"
//!
//! [foodb]
//! path = "data/foodb"
//!
//! [ranking]
//! matching = 30
//! contrasting = 10
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Unknown keys are rejected.
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_config_str`]
//! - Parse + validate from a file path: [`load_config_path`]
//! - `DATABASE_URL` override: [`EngineConfig::with_env_overrides`]

use std::{num::NonZeroU32, ops::Range, path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use flavor_ingestor::providers::flavordb_rest::{BASE_URL, FlavorDbRestParams};
use serde::{Deserialize, Serialize};
use toml::from_str;

use crate::ranker::RankingLimits;

/// Environment variable overriding [`EngineConfig::database_url`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// SQLite path or `sqlite:` URL.
    pub database_url: String,
    /// Maximum pooled connections on the read path.
    pub pool_size: u32,
    /// FlavorDB pass settings.
    pub flavordb: FlavorDbCfg,
    /// FooDB pass settings.
    pub foodb: FoodbCfg,
    /// Result list caps.
    pub ranking: RankingLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: "pairing.db".to_string(),
            pool_size: 8,
            flavordb: FlavorDbCfg::default(),
            foodb: FoodbCfg::default(),
            ranking: RankingLimits::default(),
        }
    }
}

/// `[flavordb]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct FlavorDbCfg {
    /// Entity endpoint.
    pub base_url: String,
    /// First entity id to fetch (inclusive).
    pub first_entity_id: u32,
    /// Last entity id to fetch (exclusive).
    pub end_entity_id: u32,
    /// Outgoing request rate cap.
    pub requests_per_second: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Directory of cached entity answers.
    pub cache_dir: PathBuf,
}

impl Default for FlavorDbCfg {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            first_entity_id: 0,
            end_entity_id: 1000,
            requests_per_second: 4,
            timeout_secs: 30,
            cache_dir: PathBuf::from(".cache/flavordb"),
        }
    }
}

impl FlavorDbCfg {
    /// Entity ids walked by one pass.
    pub fn entity_ids(&self) -> Range<u32> {
        self.first_entity_id..self.end_entity_id
    }

    /// Provider parameters for [`flavor_ingestor::providers::flavordb_rest::FlavorDbRestProvider`].
    pub fn rest_params(&self) -> anyhow::Result<FlavorDbRestParams> {
        let requests_per_second = NonZeroU32::new(self.requests_per_second)
            .context("flavordb.requests_per_second must be > 0")?;
        Ok(FlavorDbRestParams {
            base_url: self.base_url.clone(),
            requests_per_second,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// `[foodb]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct FoodbCfg {
    /// Directory holding `Food.json`, `Compound.json` and `Content.json`.
    pub path: PathBuf,
}

impl Default for FoodbCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/foodb"),
        }
    }
}

impl FoodbCfg {
    /// `Food.json` inside the dump directory.
    pub fn food_file(&self) -> PathBuf {
        self.path.join("Food.json")
    }

    /// `Compound.json` inside the dump directory.
    pub fn compound_file(&self) -> PathBuf {
        self.path.join("Compound.json")
    }

    /// `Content.json` inside the dump directory.
    pub fn content_file(&self) -> PathBuf {
        self.path.join("Content.json")
    }
}

impl EngineConfig {
    /// Checks cross-field constraints.
    ///
    /// Errors:
    /// - empty `database_url` or `flavordb.base_url`
    /// - `pool_size`, `requests_per_second`, `timeout_secs` or a ranking limit of zero
    /// - an empty entity id range
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            bail!("database_url cannot be empty");
        }
        if self.pool_size == 0 {
            bail!("pool_size must be > 0");
        }
        let f = &self.flavordb;
        if f.base_url.trim().is_empty() {
            bail!("flavordb.base_url cannot be empty");
        }
        if f.entity_ids().is_empty() {
            bail!(
                "flavordb entity range {}..{} is empty",
                f.first_entity_id,
                f.end_entity_id
            );
        }
        if f.requests_per_second == 0 {
            bail!("flavordb.requests_per_second must be > 0");
        }
        if f.timeout_secs == 0 {
            bail!("flavordb.timeout_secs must be > 0");
        }
        if self.ranking.matching == 0 || self.ranking.contrasting == 0 {
            bail!("ranking limits must be > 0");
        }
        Ok(())
    }

    /// Applies `DATABASE_URL` when it is set and non-blank.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = shared_utils::env::env_override(DATABASE_URL_ENV) {
            self.database_url = url;
        }
        self
    }
}

/// Parse and validate an engine configuration from a TOML string.
///
/// Errors:
/// - TOML parse failures, including unknown keys
/// - Validation errors (see [`EngineConfig::validate`])
pub fn load_config_str(toml_str: &str) -> anyhow::Result<EngineConfig> {
    let cfg: EngineConfig = from_str(toml_str).context("failed to parse engine config TOML")?;
    cfg.validate().context("invalid engine config")?;
    Ok(cfg)
}

/// Read an engine configuration file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<EngineConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
