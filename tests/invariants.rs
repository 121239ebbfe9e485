use proptest::prelude::*;
use rustc_hash::FxHashSet;

use memsched_model::{
    Job, ProcessState, Report, RunOutcome, Sim, SimConfig, SrtfScheduler,
    core::{Process, ProcessTable},
    memory::{PartitionSpec, PartitionTable},
};

const CASES: u32 = 128;

fn job(i: usize, (size, arrival, burst): (u64, u64, u64)) -> Job {
    Job::new(i as u32 + 1, size, arrival, burst)
}

fn partition(i: usize, size: u64) -> PartitionSpec {
    PartitionSpec {
        id: i as u32 + 1,
        size,
        start_address: 100 * (i as u64 + 1),
    }
}

fn jobs() -> impl Strategy<Value = Vec<Job>> {
    let raw = prop::collection::vec((1u64..300, 0u64..20, 1u64..10), 0..12);
    raw.prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, t)| job(i, t))
            .collect()
    })
}

fn partitions() -> impl Strategy<Value = Vec<PartitionSpec>> {
    let sizes = prop::collection::vec(10u64..300, 0..4);
    sizes.prop_map(|sizes| {
        sizes
            .into_iter()
            .enumerate()
            .map(|(i, size)| partition(i, size))
            .collect()
    })
}

fn check_tick(sim: &Sim<SrtfScheduler>, total: usize) -> Result<(), TestCaseError> {
    let executing = sim
        .processes()
        .filter(|p| p.state == ProcessState::Executing)
        .count();
    prop_assert!(executing <= 1);

    let snap = sim.queue_snapshot();
    let mut seen = FxHashSet::default();
    let all = snap
        .ready
        .iter()
        .chain(&snap.suspended)
        .chain(&snap.arriving)
        .chain(&snap.terminated)
        .chain(snap.executing.iter());
    for &pid in all {
        prop_assert!(seen.insert(pid), "process {} in two places", pid);
    }
    prop_assert_eq!(seen.len(), total);

    if let Some(current) = snap.executing {
        let running = sim.core.ctx.process(current).remaining_time;
        for &pid in &snap.ready {
            prop_assert!(
                running <= sim.core.ctx.process(pid).remaining_time,
                "process {} should have been preempted by {}",
                current,
                pid
            );
        }
    }
    Ok(())
}

fn check_terminated(p: &Process) -> Result<(), TestCaseError> {
    prop_assert_eq!(p.remaining_time, 0);
    prop_assert!(p.partition.is_none());
    let finish = p.finish_time.unwrap();
    let turnaround = p.turnaround_time.unwrap();
    let first = p.first_execution_time.unwrap();
    prop_assert_eq!(finish, p.arrival_time + turnaround);
    prop_assert_eq!(p.wait_time, first - p.arrival_time);
    prop_assert!(turnaround >= p.burst_time);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(CASES))]

    #[test]
    fn prop_engine_invariants(jobs in jobs(), parts in partitions(), degree in 0usize..5) {
        let config = SimConfig {
            partitions: parts.clone(),
            degree,
            max_ticks: 300,
            ..SimConfig::default()
        };
        let total = jobs.len();
        let largest = parts.iter().map(|p| p.size).max().unwrap_or(0);
        let all_fit = jobs.iter().all(|j| j.size <= largest);

        let mut sim = Sim::<SrtfScheduler>::new(jobs, &config).unwrap();
        let mut violations = Vec::new();
        let outcome = sim.run_with(|sim, _| {
            if let Err(err) = check_tick(sim, total) {
                violations.push(err);
            }
        });
        prop_assert!(violations.is_empty(), "{:?}", violations);

        if degree > 0 && all_fit {
            prop_assert_eq!(outcome, RunOutcome::Complete);
        }

        for p in sim.processes() {
            if p.is_terminated() {
                check_terminated(p)?;
            } else {
                prop_assert!(p.finish_time.is_none());
            }
        }

        let report = Report::from_sim(&sim);
        let terminated = sim.queue_snapshot().terminated.len();
        prop_assert_eq!(report.terminated, terminated);
        prop_assert!(report.throughput <= 1.0);
    }

    #[test]
    fn prop_best_fit_is_minimal(
        sizes in prop::collection::vec(1u64..200, 1..8),
        occupied in prop::collection::vec(any::<bool>(), 8),
        request in 1u64..200,
    ) {
        let specs: Vec<_> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| partition(i, size))
            .collect();
        let mut table = PartitionTable::new(&specs);
        let mut procs = ProcessTable::new();
        for (i, part) in specs.iter().enumerate() {
            if occupied[i] {
                let pid = 100 + i as u32;
                procs.insert(Process::new(pid, 1, 0, 1)).unwrap();
                table.place(&mut procs, pid, part.id).unwrap();
            }
        }
        procs.insert(Process::new(1, request, 0, 1)).unwrap();

        let expected = specs
            .iter()
            .enumerate()
            .filter(|&(i, p)| !occupied[i] && p.size >= request)
            .min_by_key(|&(i, p)| (p.size - request, i))
            .map(|(_, p)| p.id);

        match table.allocate(&mut procs, 1) {
            Ok(placement) => {
                prop_assert_eq!(Some(placement.partition), expected);
                prop_assert_eq!(placement.evicted, None);
            }
            Err(_) => prop_assert_eq!(expected, None),
        }
    }
}
