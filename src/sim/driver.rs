use log::{info, warn};

use super::job::Job;
use crate::{
    config::SimConfig,
    core::{
        driver::SimCore,
        event::SimEvent,
        state::{Kilobytes, PartitionId, Process, ProcessId, QueueKind, Ticks},
    },
    error::SimError,
    memory::PartitionTable,
    scheduler::Scheduler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Complete,
    // Stopped at the safety bound with processes still unfinished
    Incomplete { max_ticks: Ticks },
}

/// Read-only view of one partition, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRow {
    pub id: PartitionId,
    pub size: Kilobytes,
    pub start_address: Kilobytes,
    pub occupant: Option<ProcessId>,
    pub internal_fragmentation: Kilobytes,
}

/// Process ids grouped by where they are right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub executing: Option<ProcessId>,
    pub ready: Vec<ProcessId>,
    pub suspended: Vec<ProcessId>,
    pub arriving: Vec<ProcessId>,
    pub terminated: Vec<ProcessId>,
}

pub struct Sim<S: Scheduler> {
    pub core: SimCore<S>,
    max_ticks: Ticks,
}

impl<S: Scheduler> Sim<S> {
    pub fn new(mut jobs: Vec<Job>, config: &SimConfig) -> Result<Self, SimError> {
        // Stable, so simultaneous arrivals keep their input order
        jobs.sort_by_key(|job| job.arrival_time);

        let mut core = SimCore::<S>::new(PartitionTable::new(&config.partitions), config.degree);
        for job in jobs {
            if job.burst_time == 0 {
                return Err(SimError::ZeroBurst(job.id));
            }
            let process = Process::new(job.id, job.size, job.arrival_time, job.burst_time);
            core.ctx.procs.insert(process)?;
            core.ctx.queues.push(QueueKind::Arriving, job.id);
        }

        Ok(Self {
            core,
            max_ticks: config.max_ticks,
        })
    }

    /// One full tick: arrivals first, then the core loop.
    pub fn step(&mut self) -> Vec<SimEvent> {
        self.handle_arrivals();
        self.core.tick()
    }

    fn handle_arrivals(&mut self) {
        let now = self.core.now();
        // Contiguous at the front, since arriving is sorted by arrival time
        let arrived: Vec<ProcessId> = self
            .core
            .ctx
            .queues
            .get(QueueKind::Arriving)
            .iter()
            .copied()
            .take_while(|&pid| self.core.ctx.process(pid).arrival_time <= now)
            .collect();

        for pid in arrived {
            debug_assert_eq!(self.core.ctx.process(pid).arrival_time, now);
            self.core.ctx.queues.remove(QueueKind::Arriving, pid);
            self.core.emit(SimEvent::Arrived { pid });
            self.core.admit(pid);
        }
    }

    /// Step until every process terminated or the safety bound is hit.
    pub fn run(&mut self) -> RunOutcome {
        self.run_with(|_, _| {})
    }

    /// Like [`Sim::run`], handing each tick's events to `on_tick` together
    /// with the simulation as it stands after the tick.
    pub fn run_with(&mut self, mut on_tick: impl FnMut(&Self, &[SimEvent])) -> RunOutcome {
        info!(
            "starting {} simulation: {} processes, {} partitions, degree {}",
            self.core.scheduler.name(),
            self.core.ctx.procs.len(),
            self.core.ctx.memory.len(),
            self.core.degree()
        );

        while !self.all_processes_terminated() {
            if self.core.now() >= self.max_ticks {
                warn!(
                    "simulation stopped at the {} tick limit with {} of {} processes terminated",
                    self.max_ticks,
                    self.core.ctx.queues.len(QueueKind::Terminated),
                    self.core.ctx.procs.len()
                );
                return RunOutcome::Incomplete {
                    max_ticks: self.max_ticks,
                };
            }
            let events = self.step();
            on_tick(self, &events);
        }

        info!("simulation finished at t={}", self.core.now());
        RunOutcome::Complete
    }

    pub fn all_processes_terminated(&self) -> bool {
        self.core.ctx.all_terminated()
    }

    pub fn now(&self) -> Ticks {
        self.core.now()
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.core.ctx.procs.iter()
    }

    pub fn memory_snapshot(&self) -> Vec<PartitionRow> {
        self.core
            .ctx
            .memory
            .partitions()
            .iter()
            .map(|p| PartitionRow {
                id: p.id,
                size: p.size,
                start_address: p.start_address,
                occupant: p.occupant(),
                internal_fragmentation: p.internal_fragmentation(),
            })
            .collect()
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        let queues = &self.core.ctx.queues;
        QueueSnapshot {
            executing: self.core.scheduler.current(),
            ready: queues.get(QueueKind::Ready).to_vec(),
            suspended: queues.get(QueueKind::Suspended).to_vec(),
            arriving: queues.get(QueueKind::Arriving).to_vec(),
            terminated: queues.get(QueueKind::Terminated).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PartitionSpec;
    use crate::scheduler::SrtfScheduler;

    fn config(parts: &[(u32, u64)], degree: usize) -> SimConfig {
        let partitions = parts
            .iter()
            .map(|&(id, size)| PartitionSpec {
                id,
                size,
                start_address: 0,
            })
            .collect();
        SimConfig {
            partitions,
            degree,
            ..SimConfig::default()
        }
    }

    fn sim(jobs: Vec<Job>, config: &SimConfig) -> Sim<SrtfScheduler> {
        Sim::new(jobs, config).unwrap()
    }

    #[test]
    fn rejects_duplicate_and_empty_jobs() {
        let cfg = SimConfig::default();
        let dup = vec![Job::new(1, 10, 0, 1), Job::new(1, 20, 2, 1)];
        assert!(matches!(
            Sim::<SrtfScheduler>::new(dup, &cfg),
            Err(SimError::DuplicateProcess(1))
        ));

        let zero = vec![Job::new(3, 10, 0, 0)];
        assert!(matches!(
            Sim::<SrtfScheduler>::new(zero, &cfg),
            Err(SimError::ZeroBurst(3))
        ));
    }

    #[test]
    fn arrivals_wait_for_their_tick() {
        let jobs = vec![Job::new(2, 10, 3, 1), Job::new(1, 10, 0, 1)];
        let mut sim = sim(jobs, &config(&[(1, 100)], 5));
        assert_eq!(sim.queue_snapshot().arriving, [1, 2]);

        let events = sim.step();
        assert!(events.contains(&SimEvent::Arrived { pid: 1 }));
        assert_eq!(sim.queue_snapshot().arriving, [2]);

        sim.step();
        sim.step();
        let events = sim.step();
        assert!(events.contains(&SimEvent::Arrived { pid: 2 }));
        assert!(events.contains(&SimEvent::Terminated {
            pid: 2,
            finish_time: 4,
        }));
    }

    #[test]
    fn snapshots_reflect_occupancy() {
        let jobs = vec![Job::new(1, 30, 0, 4), Job::new(2, 90, 0, 4)];
        let mut sim = sim(jobs, &config(&[(1, 100), (2, 40)], 5));
        sim.step();

        let rows = sim.memory_snapshot();
        assert_eq!(rows[0].occupant, Some(2));
        assert_eq!(rows[0].internal_fragmentation, 10);
        assert_eq!(rows[1].occupant, Some(1));
        assert_eq!(rows[1].internal_fragmentation, 10);

        let queues = sim.queue_snapshot();
        assert_eq!(queues.executing, Some(1));
        assert_eq!(queues.ready, [2]);
        assert!(queues.suspended.is_empty());
    }

    #[test]
    fn safety_bound_reports_incomplete() {
        let cfg = SimConfig {
            max_ticks: 20,
            ..config(&[(1, 10)], 5)
        };
        let mut sim = sim(vec![Job::new(1, 50, 0, 1)], &cfg);

        assert_eq!(sim.run(), RunOutcome::Incomplete { max_ticks: 20 });
        assert_eq!(sim.now(), 20);
        assert_eq!(sim.queue_snapshot().suspended, [1]);
    }

    #[test]
    fn empty_workload_completes_immediately() {
        let mut sim = sim(Vec::new(), &SimConfig::default());
        assert_eq!(sim.run(), RunOutcome::Complete);
        assert_eq!(sim.now(), 0);
    }
}
