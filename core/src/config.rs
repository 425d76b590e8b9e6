//! Workload volume parameters.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::str::FromStr;

/// Volume parameters for one benchmark run. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of rows seeded after the reset
    pub initial_count: u64,

    /// Rows per insert round trip during Seed and Create
    pub batch_size: NonZeroU64,

    /// Number of leading rows renamed by the Update phase
    pub update_count: u64,

    /// Number of rows removed by the Delete phase
    pub delete_count: u64,

    /// Number of rows added by the Create phase
    pub new_count: u64,
}

impl WorkloadConfig {
    pub fn builder() -> WorkloadConfigBuilder { WorkloadConfigBuilder::from(WorkloadConfig::default()) }

    /// Starts a builder from one of the named presets.
    pub fn preset(preset: Preset) -> WorkloadConfigBuilder {
        let (initial_count, batch_size, update_count, delete_count, new_count) = match preset {
            Preset::Small => (1_000, 100, 100, 50, 200),
            Preset::Medium => (10_000, 1_000, 1_000, 500, 2_000),
            Preset::Large => (100_000, 5_000, 10_000, 5_000, 20_000),
            Preset::XLarge => (1_000_000, 10_000, 50_000, 25_000, 100_000),
        };
        WorkloadConfigBuilder { initial_count, batch_size, update_count, delete_count, new_count }
    }

    /// Number of insert round trips the Seed phase will make.
    pub fn seed_batches(&self) -> u64 { self.initial_count.div_ceil(self.batch_size.get()) }

    /// Number of insert round trips the Create phase will make.
    pub fn create_batches(&self) -> u64 { self.new_count.div_ceil(self.batch_size.get()) }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            initial_count: 50_000,
            batch_size: NonZeroU64::new(5_000).unwrap_or(NonZeroU64::MIN),
            update_count: 5_000,
            delete_count: 2_500,
            new_count: 10_000,
        }
    }
}

/// Builder for WorkloadConfig. Accepts raw counts and validates on `build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfigBuilder {
    initial_count: u64,
    batch_size: u64,
    update_count: u64,
    delete_count: u64,
    new_count: u64,
}

impl From<WorkloadConfig> for WorkloadConfigBuilder {
    fn from(config: WorkloadConfig) -> Self {
        Self {
            initial_count: config.initial_count,
            batch_size: config.batch_size.get(),
            update_count: config.update_count,
            delete_count: config.delete_count,
            new_count: config.new_count,
        }
    }
}

impl WorkloadConfigBuilder {
    pub fn initial_count(mut self, count: u64) -> Self {
        self.initial_count = count;
        self
    }

    pub fn batch_size(mut self, size: u64) -> Self {
        self.batch_size = size;
        self
    }

    pub fn update_count(mut self, count: u64) -> Self {
        self.update_count = count;
        self
    }

    pub fn delete_count(mut self, count: u64) -> Self {
        self.delete_count = count;
        self
    }

    pub fn new_count(mut self, count: u64) -> Self {
        self.new_count = count;
        self
    }

    pub fn build(self) -> Result<WorkloadConfig, ConfigError> {
        let batch_size = NonZeroU64::new(self.batch_size).ok_or(ConfigError::ZeroBatchSize)?;
        Ok(WorkloadConfig {
            initial_count: self.initial_count,
            batch_size,
            update_count: self.update_count,
            delete_count: self.delete_count,
            new_count: self.new_count,
        })
    }
}

/// Named volume presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    Small,
    Medium,
    Large,
    XLarge,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Preset::Small),
            "medium" => Ok(Preset::Medium),
            "large" => Ok(Preset::Large),
            "xlarge" => Ok(Preset::XLarge),
            _ => Err(ConfigError::UnknownPreset(s.to_owned())),
        }
    }
}
