use crate::core::{PartitionId, ProcessId, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendReason {
    // Resident count already at the degree of multiprogramming
    DegreeReached,
    NoFreePartition,
    Evicted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Arrived {
        pid: ProcessId,
    },
    Admitted {
        pid: ProcessId,
        partition: PartitionId,
        from_suspended: bool,
    },
    Suspended {
        pid: ProcessId,
        reason: SuspendReason,
    },
    Preempted {
        pid: ProcessId,
    },
    Dispatched {
        pid: ProcessId,
        first_run: bool,
    },
    Terminated {
        pid: ProcessId,
        finish_time: Ticks,
    },
    // No process on the CPU for this tick
    CpuIdle,
}

impl SimEvent {
    /// Arrivals and terminations are the moments worth showing to a user.
    pub fn is_milestone(&self) -> bool {
        matches!(self, Self::Arrived { .. } | Self::Terminated { .. })
    }
}
