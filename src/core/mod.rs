pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SimCore;
pub use event::{SimEvent, SuspendReason};
pub use state::{
    Kilobytes, PartitionId, Process, ProcessId, ProcessState, ProcessTable, QueueKind, Queues,
    SimCtx, Ticks,
};
