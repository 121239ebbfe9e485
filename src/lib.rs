pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod memory;
pub mod render;
pub mod scheduler;
pub mod sim;

pub use config::{PartitionLayout, SimConfig};
pub use crate::core::{ProcessState, SimEvent};
pub use scheduler::{Scheduler, SrtfScheduler};
pub use sim::{Job, Report, RunOutcome, Sim};
