pub mod srtf;

use crate::core::state::{ProcessId, ProcessTable};
pub use srtf::SrtfScheduler;

/// CPU scheduling policy for a single CPU. The scheduler only remembers
/// which process is running; every queue belongs to the engine and is
/// passed in by reference.
pub trait Scheduler {
    fn init() -> Self;

    fn name(&self) -> &'static str;

    fn current(&self) -> Option<ProcessId>;

    /// Pick the next process to run from `ready`, without removing it.
    fn select_next(&self, procs: &ProcessTable, ready: &[ProcessId]) -> Option<ProcessId>;

    /// Whether the running process should give up the CPU before the next
    /// unit of work.
    fn should_preempt(&self, procs: &ProcessTable, ready: &[ProcessId]) -> bool;

    fn start_execution(&mut self, procs: &mut ProcessTable, pid: ProcessId);

    /// Run the current process for one tick. Returns it if it just finished.
    fn execute_tick(&mut self, procs: &mut ProcessTable) -> Option<ProcessId>;

    fn preempt_current(&mut self, procs: &mut ProcessTable) -> Option<ProcessId>;
}
