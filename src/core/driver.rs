use log::{debug, warn};

use super::{
    event::{SimEvent, SuspendReason},
    observer::Observer,
    state::{ProcessId, QueueKind, SimCtx, Ticks},
};
use crate::{
    memory::{AllocError, PartitionTable},
    scheduler::Scheduler,
};

/// The per-tick control loop. Owns the clock, the queues and the memory;
/// drives the allocator and the scheduler, which never see each other.
pub struct SimCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    degree: usize,
    observer: Observer,
    events: Vec<SimEvent>,
}

impl<S: Scheduler> SimCore<S> {
    pub fn new(memory: PartitionTable, degree: usize) -> Self {
        Self {
            ctx: SimCtx::new(memory),
            scheduler: S::init(),
            degree,
            observer: Observer::new(),
            events: Vec::new(),
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Processes in memory: ready plus the one on the CPU.
    pub fn resident_count(&self) -> usize {
        self.ctx.queues.len(QueueKind::Ready) + usize::from(self.scheduler.current().is_some())
    }

    /// Admission rule shared by arrivals and suspended re-admission. `pid`
    /// must not be in the ready queue or on the CPU.
    pub fn admit(&mut self, pid: ProcessId) {
        let from_suspended = self.ctx.queues.contains(QueueKind::Suspended, pid);

        if self.resident_count() >= self.degree {
            if !from_suspended {
                self.suspend(pid, SuspendReason::DegreeReached);
            }
            return;
        }

        match self.ctx.memory.allocate(&mut self.ctx.procs, pid) {
            Ok(placement) => {
                if let Some(victim) = placement.evicted {
                    self.handle_eviction(victim);
                }
                self.ctx.queues.move_to(pid, QueueKind::Ready);
                debug!(
                    "t={} admitted process {pid} into partition {}",
                    self.ctx.now, placement.partition
                );
                self.events.push(SimEvent::Admitted {
                    pid,
                    partition: placement.partition,
                    from_suspended,
                });
            }
            Err(AllocError::NoFit { .. }) => {
                if !from_suspended {
                    self.suspend(pid, SuspendReason::NoFreePartition);
                }
            }
            Err(err) => {
                // Drop any stale placement so the process can queue as suspended
                warn!("t={} cannot admit process {pid}: {err}", self.ctx.now);
                self.ctx.memory.free(&mut self.ctx.procs, pid);
                if !from_suspended {
                    self.suspend(pid, SuspendReason::NoFreePartition);
                }
            }
        }
    }

    fn suspend(&mut self, pid: ProcessId, reason: SuspendReason) {
        self.ctx.mark_suspended(pid);
        debug!("t={} process {pid} suspended ({reason:?})", self.ctx.now);
        self.events.push(SimEvent::Suspended { pid, reason });
    }

    // The allocator already marked the victim Suspended; fix its queue
    fn handle_eviction(&mut self, victim: ProcessId) {
        if self.scheduler.current() == Some(victim) {
            self.scheduler.preempt_current(&mut self.ctx.procs);
        }
        self.ctx.mark_suspended(victim);
        debug!("t={} process {victim} swapped out", self.ctx.now);
        self.events.push(SimEvent::Suspended {
            pid: victim,
            reason: SuspendReason::Evicted,
        });
    }

    fn readmit_suspended(&mut self) {
        if self.resident_count() >= self.degree {
            return;
        }
        let waiting = self.ctx.queues.get(QueueKind::Suspended).to_vec();
        for pid in waiting {
            if self.resident_count() >= self.degree {
                break;
            }
            // An eviction earlier in this pass may have moved it already
            if self.ctx.queues.contains(QueueKind::Suspended, pid) {
                self.admit(pid);
            }
        }
    }

    fn schedule(&mut self) {
        let now = self.ctx.now;

        let ready = self.ctx.queues.get(QueueKind::Ready);
        if self.scheduler.should_preempt(&self.ctx.procs, ready)
            && let Some(pid) = self.scheduler.preempt_current(&mut self.ctx.procs)
        {
            self.ctx.queues.push(QueueKind::Ready, pid);
            self.events.push(SimEvent::Preempted { pid });
        }

        if self.scheduler.current().is_some() {
            return;
        }

        let Some(pid) = self
            .scheduler
            .select_next(&self.ctx.procs, self.ctx.queues.get(QueueKind::Ready))
        else {
            return;
        };

        self.ctx.queues.remove(QueueKind::Ready, pid);
        let process = self.ctx.process_mut(pid);
        let first_run = process.first_execution_time.is_none();
        if first_run {
            process.first_execution_time = Some(now);
        }
        self.scheduler.start_execution(&mut self.ctx.procs, pid);
        debug!("t={now} dispatched process {pid}");
        self.events.push(SimEvent::Dispatched { pid, first_run });
    }

    // Display-only tally; Process::finish replaces it on termination
    fn accrue_wait(&mut self) {
        let current = self.scheduler.current();
        let ctx = &mut self.ctx;
        for kind in [QueueKind::Ready, QueueKind::Suspended] {
            for &pid in ctx.queues.get(kind) {
                if Some(pid) == current {
                    continue;
                }
                let process = ctx.procs.process_mut(pid);
                if process.first_execution_time.is_none() {
                    process.wait_time += 1;
                }
            }
        }
    }

    fn execute(&mut self) {
        let now = self.ctx.now;

        if self.scheduler.current().is_none() {
            self.events.push(SimEvent::CpuIdle);
            return;
        }

        let Some(pid) = self.scheduler.execute_tick(&mut self.ctx.procs) else {
            return;
        };

        self.ctx.process_mut(pid).finish(now);
        self.ctx.memory.free(&mut self.ctx.procs, pid);
        self.ctx.queues.push(QueueKind::Terminated, pid);

        let finish_time = now + 1;
        debug!("t={now} process {pid} terminated at {finish_time}");
        self.events.push(SimEvent::Terminated { pid, finish_time });
    }

    /// Everything after arrivals: re-admission, scheduling, wait accrual,
    /// one unit of execution, clock advance.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        self.readmit_suspended();
        self.schedule();
        self.accrue_wait();
        self.execute();

        self.observer
            .observe(&self.ctx, self.scheduler.current(), self.degree);
        self.ctx.advance_time(1);

        std::mem::take(&mut self.events)
    }

    /// Record an event produced outside `tick` so it is returned with the
    /// rest of the tick's events.
    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
