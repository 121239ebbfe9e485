use std::path::PathBuf;

use thiserror::Error;

use crate::core::{PartitionId, ProcessId};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read process file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("process file {0} is empty")]
    Empty(PathBuf),
    #[error("no valid process rows in {0}")]
    NoProcesses(PathBuf),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one memory partition is required")]
    NoPartitions,
    #[error("degree of multiprogramming must be positive")]
    ZeroDegree,
    #[error("partition {0} has zero size")]
    EmptyPartition(PartitionId),
    #[error("partition id {0} is used more than once")]
    DuplicatePartition(PartitionId),
    #[error("invalid partition `{0}`, expected id,size,start")]
    BadPartitionSpec(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("process id {0} is used more than once")]
    DuplicateProcess(ProcessId),
    #[error("process {0} has a zero burst time")]
    ZeroBurst(ProcessId),
}
