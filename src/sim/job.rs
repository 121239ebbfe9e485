use crate::core::{Kilobytes, ProcessId, Ticks};

/// One process as it comes from the input, before the simulation owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: ProcessId,
    pub size: Kilobytes,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
}

impl Job {
    pub fn new(id: ProcessId, size: Kilobytes, arrival_time: Ticks, burst_time: Ticks) -> Self {
        Self {
            id,
            size,
            arrival_time,
            burst_time,
        }
    }
}
