pub mod driver;
pub mod job;
pub mod report;
pub mod workload;

pub use driver::{PartitionRow, QueueSnapshot, RunOutcome, Sim};
pub use job::Job;
pub use report::{ProcessStats, Report};
pub use workload::{WorkloadParams, bernoulli_jobs};
