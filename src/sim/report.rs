use average::{Estimate, Mean};

use super::driver::Sim;
use crate::core::{ProcessId, Ticks};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStats {
    pub id: ProcessId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    // None for processes that never terminated
    pub finish_time: Option<Ticks>,
    pub turnaround_time: Option<Ticks>,
    pub wait_time: Ticks,
}

/// End-of-run statistics. Averages only cover terminated processes.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<ProcessStats>,
    pub terminated: usize,
    pub total_time: Ticks,
    pub avg_turnaround: f64,
    pub avg_wait: f64,
    // Terminated processes per tick
    pub throughput: f64,
}

impl Report {
    pub fn from_sim<S: Scheduler>(sim: &Sim<S>) -> Self {
        let mut rows: Vec<ProcessStats> = sim
            .processes()
            .map(|p| ProcessStats {
                id: p.id,
                arrival_time: p.arrival_time,
                burst_time: p.burst_time,
                finish_time: p.finish_time,
                turnaround_time: p.turnaround_time,
                wait_time: p.wait_time,
            })
            .collect();
        rows.sort_by_key(|r| r.id);

        let finished = || rows.iter().filter(|r| r.finish_time.is_some());
        let terminated = finished().count();
        let avg_turnaround = avg(finished().filter_map(|r| r.turnaround_time));
        let avg_wait = avg(finished().map(|r| r.wait_time));

        let total_time = sim.now();
        let throughput = if total_time > 0 {
            terminated as f64 / total_time as f64
        } else {
            0.0
        };

        Self {
            rows,
            terminated,
            total_time,
            avg_turnaround,
            avg_wait,
            throughput,
        }
    }
}

fn avg(iter: impl Iterator<Item = Ticks>) -> f64 {
    let mean: Mean = iter.map(|t| t as f64).collect();
    if mean.is_empty() {
        0.0
    } else {
        mean.estimate()
    }
}
