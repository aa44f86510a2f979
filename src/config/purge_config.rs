// src/config/purge_config.rs

use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};
use std::path::Path;

use crate::core::error::Result;
use crate::filter::CostPolicy;
use crate::memory::compact_allocator::DEFAULT_BLOCK_CAPACITY;

/// Run configuration of the purge stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Number of relations in the input; the scan must see exactly this many
    pub nrels: usize,

    /// Expected number of ideals, sizes the registry. Estimated from the
    /// large prime bounds when absent
    pub expected_ideals: Option<usize>,

    /// Ideal thresholds of the first pass; `rlim`/`alim` when absent
    pub min_rational: Option<u64>,
    pub min_algebraic: Option<u64>,

    /// Factor base bounds
    pub rlim: u64,
    pub alim: u64,

    /// Large prime bounds, in bits
    pub lpbr: u32,
    pub lpba: u32,

    /// Minimum excess required before the final pass prunes anything
    pub min_excess: usize,

    /// Excess above which heavier rows are pruned
    pub keep: usize,

    /// Copy surviving relations instead of writing the matrix
    pub raw: bool,

    /// Component scoring for excess pruning
    pub cost_policy: CostPolicy,

    /// Cells per compact-list block
    pub block_capacity: usize,

    /// Logging level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        PurgeConfig {
            nrels: 0,
            expected_ideals: None,
            min_rational: None,
            min_algebraic: None,
            rlim: 0,
            alim: 0,
            lpbr: 24,
            lpba: 24,
            min_excess: 1,
            keep: 160,
            raw: false,
            cost_policy: CostPolicy::RowFraction,
            block_capacity: DEFAULT_BLOCK_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

impl PurgeConfig {
    fn builder_with_defaults() -> std::result::Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("nrels", 0)?
            .set_default("rlim", 0)?
            .set_default("alim", 0)?
            .set_default("lpbr", 24)?
            .set_default("lpba", 24)?
            .set_default("min_excess", 1)?
            .set_default("keep", 160)?
            .set_default("raw", false)?
            .set_default("cost_policy", "row_fraction")?
            .set_default("block_capacity", DEFAULT_BLOCK_CAPACITY as u64)?
            .set_default("log_level", "info")
    }

    fn environment() -> Environment {
        Environment::with_prefix("PURGE")
            .prefix_separator("_")
            .try_parsing(true)
    }

    /// Load configuration with precedence: defaults → purge.toml → env vars
    pub fn load() -> Result<Self> {
        let mut builder = Self::builder_with_defaults()?;

        if Path::new("purge.toml").exists() {
            builder = builder.add_source(File::with_name("purge.toml"));
        }

        builder = builder.add_source(Self::environment());

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load configuration with a custom file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut builder = Self::builder_with_defaults()?;

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(Self::environment());

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// First-pass rational threshold
    pub fn initial_min_rational(&self) -> u64 {
        self.min_rational.unwrap_or(self.rlim)
    }

    /// First-pass algebraic threshold
    pub fn initial_min_algebraic(&self) -> u64 {
        self.min_algebraic.unwrap_or(self.alim)
    }

    /// Registry capacity for the first pass
    pub fn registry_capacity(&self) -> usize {
        self.expected_ideals.unwrap_or_else(|| {
            crate::registry::ideal_registry::estimate_ideal_count(
                self.lpbr,
                self.lpba,
                self.initial_min_rational(),
                self.initial_min_algebraic(),
            )
        })
    }
}
