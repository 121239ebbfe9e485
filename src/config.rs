use std::str::FromStr;

use clap::ValueEnum;
use rustc_hash::FxHashSet;

use crate::core::{Kilobytes, Ticks};
use crate::error::ConfigError;
use crate::memory::PartitionSpec;

pub const DEFAULT_DEGREE: usize = 5;
pub const DEFAULT_MAX_TICKS: Ticks = 1000;
pub const DEFAULT_OS_RESERVED_KB: Kilobytes = 100;
pub const DEFAULT_MAX_PROCESSES: usize = 10;

/// Built-in partition layouts. Memory below the first partition belongs to
/// the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PartitionLayout {
    /// 250K, 150K and 50K partitions
    #[default]
    Standard,
    /// 60K, 120K and 250K partitions
    Alternative,
}

impl PartitionLayout {
    pub fn partitions(self) -> Vec<PartitionSpec> {
        let raw: [(u32, Kilobytes, Kilobytes); 3] = match self {
            Self::Standard => [(1, 250, 100), (2, 150, 350), (3, 50, 500)],
            Self::Alternative => [(1, 60, 100), (2, 120, 161), (3, 250, 281)],
        };
        raw.into_iter()
            .map(|(id, size, start_address)| PartitionSpec {
                id,
                size,
                start_address,
            })
            .collect()
    }
}

impl FromStr for PartitionSpec {
    type Err = ConfigError;

    /// Parses `id,size,start`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::BadPartitionSpec(s.to_string());
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [id, size, start] = fields.as_slice() else {
            return Err(bad());
        };
        Ok(PartitionSpec {
            id: id.parse().map_err(|_| bad())?,
            size: size.parse().map_err(|_| bad())?,
            start_address: start.parse().map_err(|_| bad())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub partitions: Vec<PartitionSpec>,
    pub degree: usize,
    // Safety bound on simulated time
    pub max_ticks: Ticks,
    // Display only
    pub os_reserved_kb: Kilobytes,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            partitions: PartitionLayout::default().partitions(),
            degree: DEFAULT_DEGREE,
            max_ticks: DEFAULT_MAX_TICKS,
            os_reserved_kb: DEFAULT_OS_RESERVED_KB,
        }
    }
}

impl SimConfig {
    pub fn with_layout(layout: PartitionLayout) -> Self {
        Self {
            partitions: layout.partitions(),
            ..Self::default()
        }
    }

    /// Reject configurations that could never admit a process. The engine
    /// itself tolerates them; this is for callers that want to fail early.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.partitions.is_empty() {
            return Err(ConfigError::NoPartitions);
        }
        if self.degree == 0 {
            return Err(ConfigError::ZeroDegree);
        }
        let mut seen = FxHashSet::default();
        for part in &self.partitions {
            if part.size == 0 {
                return Err(ConfigError::EmptyPartition(part.id));
            }
            if !seen.insert(part.id) {
                return Err(ConfigError::DuplicatePartition(part.id));
            }
        }
        Ok(())
    }
}
