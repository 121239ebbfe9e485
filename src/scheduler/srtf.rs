use log::debug;

use super::{ProcessId, ProcessTable, Scheduler};
use crate::core::state::{ProcessState, Ticks};

/// Preemptive Shortest-Remaining-Time-First.
#[derive(Debug, Default)]
pub struct SrtfScheduler {
    current: Option<ProcessId>,
}

impl SrtfScheduler {
    // First minimum in queue order, so equal remaining times keep FIFO order
    fn shortest(procs: &ProcessTable, ready: &[ProcessId]) -> Option<(ProcessId, Ticks)> {
        let mut best: Option<(ProcessId, Ticks)> = None;
        for &pid in ready {
            let remaining = procs.process(pid).remaining_time;
            if best.is_none_or(|(_, min)| remaining < min) {
                best = Some((pid, remaining));
            }
        }
        best
    }
}

impl Scheduler for SrtfScheduler {
    fn init() -> Self {
        Self::default()
    }

    fn name(&self) -> &'static str {
        "SRTF"
    }

    fn current(&self) -> Option<ProcessId> {
        self.current
    }

    fn select_next(&self, procs: &ProcessTable, ready: &[ProcessId]) -> Option<ProcessId> {
        Self::shortest(procs, ready).map(|(pid, _)| pid)
    }

    fn should_preempt(&self, procs: &ProcessTable, ready: &[ProcessId]) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let running = procs.process(current).remaining_time;
        let Some((_, shortest)) = Self::shortest(procs, ready) else {
            return false;
        };
        shortest < running
    }

    fn start_execution(&mut self, procs: &mut ProcessTable, pid: ProcessId) {
        debug_assert!(
            self.current.is_none(),
            "CPU already running process {:?}",
            self.current
        );
        self.current = Some(pid);
        procs.process_mut(pid).set_state(ProcessState::Executing);
    }

    fn execute_tick(&mut self, procs: &mut ProcessTable) -> Option<ProcessId> {
        let pid = self.current?;
        let process = procs.process_mut(pid);
        process.remaining_time = process.remaining_time.saturating_sub(1);

        if process.remaining_time == 0 {
            process.set_state(ProcessState::Terminated);
            self.current = None;
            return Some(pid);
        }
        None
    }

    fn preempt_current(&mut self, procs: &mut ProcessTable) -> Option<ProcessId> {
        let pid = self.current.take()?;
        let process = procs.process_mut(pid);
        process.set_state(ProcessState::Ready);
        let left = process.remaining_time;
        debug!("preempted process {pid} with {left} ticks left");
        Some(pid)
    }
}
